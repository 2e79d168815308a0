//! Case-insensitive string comparison helpers.
//!
//! Provides a single, canonical implementation used by both the predicate
//! evaluator and callers that pre-normalize lookup keys, ensuring identical
//! semantics everywhere string filters appear.
//!
//! Comparison is case-insensitive over Unicode scalar values: both sides are
//! lowercased character by character via [`char::to_lowercase`], so
//! multi-character lowercase expansions compare correctly.

use alloc::vec::Vec;

/// Case-insensitive string equality.
///
/// ```
/// use tabula_core::text::eq_ignore_case;
/// assert!(eq_ignore_case("Electronics", "electronics"));
/// assert!(eq_ignore_case("INDIA", "India"));
/// assert!(!eq_ignore_case("India", "Indiana"));
/// ```
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    let mut ai = a.chars().flat_map(char::to_lowercase);
    let mut bi = b.chars().flat_map(char::to_lowercase);
    loop {
        match (ai.next(), bi.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if x == y => {}
            _ => return false,
        }
    }
}

/// Case-insensitive prefix matching.
///
/// ```
/// use tabula_core::text::starts_with_ignore_case;
/// assert!(starts_with_ignore_case("Monitor", "m"));
/// assert!(starts_with_ignore_case("mouse", "MO"));
/// assert!(!starts_with_ignore_case("Desk", "m"));
/// ```
pub fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    let p: Vec<char> = prefix.chars().flat_map(char::to_lowercase).collect();
    let mut vi = value.chars().flat_map(char::to_lowercase);
    for pc in p {
        match vi.next() {
            Some(vc) if vc == pc => {}
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_ignore_case() {
        assert!(eq_ignore_case("", ""));
        assert!(eq_ignore_case("abc", "ABC"));
        assert!(!eq_ignore_case("abc", "ab"));
        assert!(!eq_ignore_case("ab", "abc"));
    }

    #[test]
    fn test_eq_ignore_case_unicode() {
        assert!(eq_ignore_case("ÉCLAIR", "éclair"));
        assert!(!eq_ignore_case("café", "cafe"));
    }

    #[test]
    fn test_starts_with_ignore_case() {
        assert!(starts_with_ignore_case("Monitor", ""));
        assert!(starts_with_ignore_case("Monitor", "mon"));
        assert!(starts_with_ignore_case("monitor", "MONITOR"));
        assert!(!starts_with_ignore_case("mon", "monitor"));
    }
}
