//! Token-set overlap used as a cheap proxy for free-text similarity.

use std::collections::HashSet;

/// Tokenize free text into a lowercase word set.
///
/// Splits on every non-alphanumeric character and drops tokens of
/// length <= 1, so punctuation and stray single letters never count
/// as overlap.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() > 1)
        .map(|token| token.to_lowercase())
        .collect()
}

/// Jaccard similarity of the two token sets: |A ∩ B| / |A ∪ B|.
/// Returns 0.0 when either side tokenizes to nothing.
pub fn jaccard(text_a: &str, text_b: &str) -> f64 {
    let a = tokenize(text_a);
    let b = tokenize(text_b);

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    intersection as f64 / union as f64
}
