//! Loading timing matrices from text.
//!
//! The format is what the benchmark harness writes: one line per block, one
//! timing in nanoseconds per iteration, separated by tabs or spaces. Blank
//! lines are ignored.
//!
//! ```text
//! 1043.0	1040.5	1051.2
//! 2210.7	2208.1	2209.9
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{EstimateError, Result};
use crate::types::TimingMatrix;

/// Parse a matrix held in memory.
pub fn parse_matrix(text: &str) -> Result<TimingMatrix> {
    let mut rows = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if let Some(row) = parse_line(line, index + 1)? {
            rows.push(row);
        }
    }
    TimingMatrix::from_rows(rows)
}

/// Parse a matrix from a buffered reader.
///
/// I/O errors are reported against `source`.
pub fn read_matrix<R: BufRead>(reader: R, source: &Path) -> Result<TimingMatrix> {
    let mut rows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| EstimateError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;
        if let Some(row) = parse_line(&line, index + 1)? {
            rows.push(row);
        }
    }
    TimingMatrix::from_rows(rows)
}

/// Load a matrix file.
pub fn load_matrix<P: AsRef<Path>>(path: P) -> Result<TimingMatrix> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| EstimateError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let matrix = read_matrix(BufReader::new(file), path)?;
    tracing::debug!(
        path = %path.display(),
        blocks = matrix.num_blocks(),
        iterations = matrix.num_iters(),
        "loaded timing matrix"
    );
    Ok(matrix)
}

fn parse_line(line: &str, line_no: usize) -> Result<Option<Vec<f64>>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    line.split_whitespace()
        .enumerate()
        .map(|(i, token)| {
            token.parse::<f64>().map_err(|_| EstimateError::Parse {
                line: line_no,
                column: i + 1,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<f64>>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tabs_spaces_and_blank_lines() {
        let m = parse_matrix("1.0\t2.0  3.0\n\n4.0 5.0\t6.0\n   \n").unwrap();
        assert_eq!(m.num_blocks(), 2);
        assert_eq!(m.num_iters(), 3);
        assert_eq!(m.row(1), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_parse_error_location() {
        let err = parse_matrix("1 2\n3 x4\n").unwrap_err();
        match err {
            EstimateError::Parse {
                line,
                column,
                token,
            } => {
                assert_eq!((line, column), (2, 2));
                assert_eq!(token, "x4");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_ragged_rows() {
        assert!(matches!(
            parse_matrix("1 2 3\n4 5\n"),
            Err(EstimateError::Ragged {
                row: 1,
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_empty_text() {
        assert!(matches!(
            parse_matrix("\n\n"),
            Err(EstimateError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_read_matrix_from_bytes() {
        let data: &[u8] = b"10 11\n12 13\n";
        let m = read_matrix(data, Path::new("inline")).unwrap();
        assert_eq!(m.get(1, 0), 12.0);
    }

    #[test]
    fn test_missing_file() {
        let err = load_matrix("/nonexistent/timings.txt").unwrap_err();
        assert!(matches!(err, EstimateError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/timings.txt"));
    }
}
