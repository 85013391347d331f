use criterion::{black_box, criterion_group, criterion_main, Criterion};
use timing_estimate::analysis::compare;
use timing_estimate::measurement::extract_minima;
use timing_estimate::statistics::quantile_of_min;
use timing_estimate::{Estimator, SyntheticBenchmark};

fn bench_estimator(c: &mut Criterion) {
    let bench = SyntheticBenchmark::new(5000, 20)
        .true_range(40.0, 61.0)
        .silent_blocks(5);
    let matrix = bench.generate(1).unwrap();

    let mut group = c.benchmark_group("estimator");
    group.sample_size(20);
    group.bench_function("analyze_5000x20", |b| {
        b.iter(|| {
            let summary = Estimator::new().analyze(black_box(&matrix)).unwrap();
            black_box(summary.estimate)
        });
    });
    group.bench_function("analyze_quick_5000x20", |b| {
        b.iter(|| {
            let summary = Estimator::quick().analyze(black_box(&matrix)).unwrap();
            black_box(summary.estimate)
        });
    });
    group.finish();
}

fn bench_building_blocks(c: &mut Criterion) {
    let bench = SyntheticBenchmark::new(5000, 20).true_range(40.0, 61.0);
    let times = bench.true_times(2);
    let before = bench.measure(&times, 3).unwrap();
    let after = bench.measure(&times, 4).unwrap();
    let before_minima = extract_minima(&before).unwrap();
    let after_minima = extract_minima(&after).unwrap();

    // Every positive excess over the block minima
    let noise: Vec<f64> = before
        .rows()
        .zip(before_minima.as_slice())
        .flat_map(|(row, &m)| row.into_iter().map(move |x| x - m))
        .filter(|&e| e > 0.0)
        .collect();

    let mut group = c.benchmark_group("building_blocks");
    group.bench_function("quantile_of_min", |b| {
        b.iter(|| quantile_of_min(black_box(0.95), 20, black_box(&noise)).unwrap());
    });
    group.bench_function("paired_compare", |b| {
        b.iter(|| compare(black_box(&before_minima), black_box(&after_minima)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_estimator, bench_building_blocks);
criterion_main!(benches);
