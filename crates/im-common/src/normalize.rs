//! Normalization helpers shared by scoring and the snapshot loaders.

/// Normalize a location code for equality comparison.
///
/// Trims, lowercases and collapses inner whitespace. Returns `None`
/// when nothing usable remains, so callers never compare empty codes.
pub fn normalize_location(code: &str) -> Option<String> {
    let collapsed = code
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Extract the leading `len` digits of a postal code.
///
/// Non-digit characters are ignored. Returns `None` when `len` is zero
/// or the code carries fewer digits than requested, so a short or
/// malformed pincode never produces a spurious prefix match.
pub fn pincode_prefix(pincode: &str, len: usize) -> Option<String> {
    if len == 0 {
        return None;
    }

    let digits: String = pincode.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < len {
        return None;
    }

    Some(digits[..len].to_string())
}

/// Canonical form for skill codes so candidate and position tables
/// agree on lookup keys.
pub fn normalize_skill_code(code: &str) -> String {
    code.trim().to_lowercase()
}
