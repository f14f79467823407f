//! Text helpers shared by the responder components.

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?[0-9]+(?:\.[0-9]+)?").expect("valid number pattern"));

static NUMERIC_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+(?:\.[0-9]+)?$").expect("valid numeric-only pattern"));

/// Lower-case, turn everything outside `[a-z0-9\s]` into spaces, collapse
/// whitespace runs and trim.
pub fn normalize_for_match(text: &str) -> String {
    let lowered = text.to_lowercase();
    let replaced: String = lowered
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when `phrase` appears in normalized text on word boundaries.
pub fn contains_phrase(normalized: &str, phrase: &str) -> bool {
    if normalized.is_empty() {
        return false;
    }
    format!(" {normalized} ").contains(&format!(" {phrase} "))
}

/// True when any of `words` is a whole word of the normalized text.
pub fn contains_any_word(normalized: &str, words: &[&str]) -> bool {
    normalized.split(' ').any(|token| words.contains(&token))
}

/// Last signed decimal literal appearing in `text`.
pub fn last_number_in(text: &str) -> Option<f64> {
    NUMBER_RE
        .find_iter(text)
        .last()
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// `-?digits(.digits)?` and nothing else, after trimming.
pub fn is_numeric_only(text: &str) -> bool {
    NUMERIC_ONLY_RE.is_match(text.trim())
}

/// Parse a whole reply as a number (surrounding whitespace allowed).
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integral values print without a decimal point, others with their shortest
/// round-trip representation. Non-finite values have no rendering.
pub fn format_number(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    if value == 0.0 {
        return Some("0".to_string());
    }
    Some(value.to_string())
}
