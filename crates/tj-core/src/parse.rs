//! Lenient parsing of the free-text numeric fields on journal entries.
//!
//! Distance, mile markers and elevations are stored as user-editable text.
//! Anything that does not parse counts as zero; these helpers never fail.

/// Parses a distance or mile-marker field.
///
/// Surrounding whitespace is ignored. Empty, non-numeric and non-finite
/// text (`NaN`, `inf`) yields `0.0`.
pub fn parse_distance(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Parses an elevation field.
///
/// Every character other than an ASCII digit or `-` is dropped first, so
/// `"1,204 ft"` reads as `1204`. Whatever remains must be a valid integer,
/// otherwise the result is `0`.
pub fn parse_elevation(text: &str) -> i64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    cleaned.parse::<i64>().unwrap_or(0)
}

/// Net change between two elevation fields, if both parse.
///
/// Unlike [`parse_elevation`], a field with no digits at all is treated as
/// missing rather than zero.
pub fn net_elevation(start: &str, end: &str) -> Option<i64> {
    let has_digits = |s: &str| s.chars().any(|c| c.is_ascii_digit());
    if !has_digits(start) || !has_digits(end) {
        return None;
    }
    parse_elevation(end).checked_sub(parse_elevation(start))
}
