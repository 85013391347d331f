//! JSON serialization for estimation results.

use serde::Serialize;

/// Serialize a result to a compact JSON string.
///
/// Non-finite numbers are written as `null`.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for result types).
pub fn to_json<T: Serialize>(result: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(result)
}

/// Serialize a result to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for result types).
pub fn to_json_pretty<T: Serialize>(result: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}
