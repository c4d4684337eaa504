//! Per-value text transforms shared by the converters.
//!
//! Markup escaping follows the HTML convention (`&`, `<`, `>`, and both
//! quote characters), so escaped values are safe inside element content
//! and attribute values alike.

/// The reserved value meaning "no value" in tabular input.
///
/// A field whose trimmed value equals this sentinel is dropped entirely
/// when the omit-placeholder option is active, and a parent column equal
/// to it marks a lineage root.
pub const PLACEHOLDER: &str = "-";

/// Escape markup-significant characters in a value.
pub fn escape_markup(value: &str) -> String {
    // Fast path: most tabular values contain nothing to escape.
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return value.to_string();
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// True if the string is non-empty and consists only of ASCII digits.
pub fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_ascii_digit())
}

/// Left-pad an all-digit identifier to 8 characters with zeros.
///
/// Non-numeric identifiers and identifiers longer than 64 characters
/// pass through untouched.
pub fn pad_numeric_id(id: &str) -> String {
    if id.len() > 64 || !is_all_digits(id) {
        return id.to_string();
    }
    format!("{id:0>8}")
}
