//! Pure validation predicates used by the form types.
//!
//! Each function returns a bool; callers decide the error message to
//! attach. None of these touch any state.

use std::sync::LazyLock;

use regex::Regex;

/// Validates the format of email addresses according to standard RFC 5322 rules.
pub static EMAIL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email regex must compile")
});

/// True if the string contains at least one non-whitespace character.
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// True if the string contains at least `n` characters (Unicode scalars, not bytes).
pub fn min_chars(value: &str, n: usize) -> bool {
    value.chars().count() >= n
}

/// True if the string contains at most `n` characters (Unicode scalars, not bytes).
pub fn max_chars(value: &str, n: usize) -> bool {
    value.chars().count() <= n
}

/// True if the string matches the given regular expression.
pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

/// True if the string parses as a 64-bit signed integer.
pub fn valid_number(value: &str) -> bool {
    value.parse::<i64>().is_ok()
}

/// True if `value` does not exceed `max`.
pub fn max_number(value: i64, max: i64) -> bool {
    value <= max
}

/// True if `value` is one of the permitted values.
///
/// An empty permitted set rejects everything.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_blank_rejects_whitespace_only() {
        assert!(not_blank("hello"));
        assert!(not_blank("  x  "));
        assert!(!not_blank(""));
        assert!(!not_blank("   "));
        assert!(!not_blank("\t\n "));
    }

    #[test]
    fn char_bounds_count_scalars_not_bytes() {
        // "héllo" is 5 chars, 6 bytes
        assert!(min_chars("héllo", 5));
        assert!(!min_chars("héllo", 6));
        assert!(max_chars("héllo", 5));
        assert!(!max_chars("héllo", 4));
    }

    #[test]
    fn email_pattern() {
        assert!(matches("user@example.com", &EMAIL_RX));
        assert!(matches("a.b+c@sub.domain.org", &EMAIL_RX));
        assert!(!matches("not-an-email", &EMAIL_RX));
        assert!(!matches("user@", &EMAIL_RX));
        assert!(!matches("@example.com", &EMAIL_RX));
    }

    #[test]
    fn valid_number_parses_signed_integers() {
        assert!(valid_number("42"));
        assert!(valid_number("-7"));
        assert!(!valid_number("4.2"));
        assert!(!valid_number("abc"));
    }

    #[test]
    fn max_number_is_inclusive() {
        assert!(max_number(5, 5));
        assert!(max_number(-3, 5));
        assert!(!max_number(6, 5));
    }

    #[test]
    fn permitted_value_on_empty_set_is_always_false() {
        let empty: [&str; 0] = [];
        assert!(!permitted_value(&"anything", &empty));
        assert!(!permitted_value(&"", &empty));

        assert!(permitted_value(&"reading", &["want_to_read", "reading", "finished"]));
        assert!(!permitted_value(&"abandoned", &["want_to_read", "reading", "finished"]));
    }
}
