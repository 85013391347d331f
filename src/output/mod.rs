//! Presentation of results: colored terminal text and JSON.

mod json;
mod terminal;

pub use json::{to_json, to_json_pretty};
pub use terminal::{format_comparison, format_summary};
