use std::str::FromStr;

use crate::error::ApiError;

/// Parse an integer path segment, naming the parameter in the 400 message
pub fn parse_path_int<T: FromStr>(raw: &str, name: &str) -> Result<T, ApiError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ApiError::bad_request(format!("Invalid {}: '{}' is not an integer", name, raw)))
}

/// Calendar month, 1 through 12
pub fn parse_month(raw: &str) -> Result<u32, ApiError> {
    let month = parse_path_int::<u32>(raw, "month")?;
    if !(1..=12).contains(&month) {
        return Err(ApiError::bad_request(format!("Invalid month: {} (expected 1-12)", month)));
    }
    Ok(month)
}
