//! Error codes shared by every relabel error enum.
//!
//! Logs carry `code = err.code()` next to the message, so codes are stable
//! strings prefixed by the owning layer: `API_`, `STORAGE_`, `EVENT_`,
//! `ACTOR_`.
//!
//! ```
//! use relabel_types::ErrorCode;
//!
//! enum FetchError {
//!     Offline,
//!     Corrupt,
//! }
//!
//! impl ErrorCode for FetchError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Offline => "FETCH_OFFLINE",
//!             Self::Corrupt => "FETCH_CORRUPT",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Offline)
//!     }
//! }
//!
//! assert!(FetchError::Offline.is_recoverable());
//! assert!(!FetchError::Corrupt.is_recoverable());
//! ```

/// Machine-readable classification of an error.
pub trait ErrorCode {
    /// Layer-prefixed UPPER_SNAKE_CASE code.
    fn code(&self) -> &'static str;

    /// Whether the same operation may succeed if tried again
    /// (transport failures, timeouts, busy storage).
    fn is_recoverable(&self) -> bool;
}

/// Checks one code against the naming rules.
///
/// # Panics
///
/// Panics if the code is empty, lacks `prefix`, or is not UPPER_SNAKE_CASE.
pub fn assert_error_code<E: ErrorCode>(err: &E, prefix: &str) {
    let code = err.code();
    assert!(
        code.starts_with(prefix),
        "error code `{code}` must start with prefix `{prefix}`"
    );
    assert!(
        is_upper_snake_case(code),
        "error code `{code}` must be UPPER_SNAKE_CASE"
    );
}

/// [`assert_error_code`] over a list of variants.
///
/// # Panics
///
/// Panics on the first offending code.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], prefix: &str) {
    errors.iter().for_each(|e| assert_error_code(e, prefix));
}

fn is_upper_snake_case(s: &str) -> bool {
    !s.is_empty()
        && s.split('_').all(|word| {
            !word.is_empty()
                && word
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Sample {
        Good,
        Lower,
    }

    impl ErrorCode for Sample {
        fn code(&self) -> &'static str {
            match self {
                Self::Good => "SAMPLE_TIMEOUT",
                Self::Lower => "SAMPLE_timeout",
            }
        }

        fn is_recoverable(&self) -> bool {
            true
        }
    }

    #[test]
    fn accepts_prefixed_codes() {
        assert_error_codes(&[Sample::Good], "SAMPLE_");
    }

    #[test]
    #[should_panic(expected = "must start with prefix")]
    fn rejects_foreign_prefix() {
        assert_error_code(&Sample::Good, "STORAGE_");
    }

    #[test]
    #[should_panic(expected = "UPPER_SNAKE_CASE")]
    fn rejects_lowercase() {
        assert_error_code(&Sample::Lower, "SAMPLE_");
    }

    #[test]
    fn snake_case_rules() {
        assert!(is_upper_snake_case("API_REJECTED"));
        assert!(is_upper_snake_case("E2"));
        assert!(!is_upper_snake_case(""));
        assert!(!is_upper_snake_case("_API"));
        assert!(!is_upper_snake_case("API_"));
        assert!(!is_upper_snake_case("API__REJECTED"));
    }
}
