//! Environment variable utilities
//!
//! Generic `env_get<T>` for parsing configuration overrides with defaults.

use std::str::FromStr;

/// Get environment variable parsed as type T, or return default
///
/// Works with any type that implements `FromStr`; a missing variable or a
/// failed parse both yield the default.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Get environment variable as boolean
///
/// Accepts "1", "true", "yes", "on" (case-insensitive) as true. Unset
/// returns the default; any other value is false.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

/// Get environment variable as optional value
///
/// Returns `Some(T)` if the variable is set and parses, `None` otherwise.
#[inline]
pub fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_get_default() {
        let val: usize = env_get("__WQ_TEST_UNSET_VAR__", 42);
        assert_eq!(val, 42);
    }

    #[test]
    fn test_env_get_set() {
        std::env::set_var("__WQ_TEST_NUM__", "123");
        let val: usize = env_get("__WQ_TEST_NUM__", 0);
        assert_eq!(val, 123);
        std::env::remove_var("__WQ_TEST_NUM__");
    }

    #[test]
    fn test_env_get_invalid_parse() {
        std::env::set_var("__WQ_TEST_BAD__", "not_a_number");
        let val: usize = env_get("__WQ_TEST_BAD__", 99);
        assert_eq!(val, 99);
        std::env::remove_var("__WQ_TEST_BAD__");
    }

    #[test]
    fn test_env_get_bool_variants() {
        assert!(env_get_bool("__WQ_TEST_UNSET_VAR__", true));
        assert!(!env_get_bool("__WQ_TEST_UNSET_VAR__", false));

        std::env::set_var("__WQ_TEST_FLAG__", "yes");
        assert!(env_get_bool("__WQ_TEST_FLAG__", false));

        std::env::set_var("__WQ_TEST_FLAG__", "0");
        assert!(!env_get_bool("__WQ_TEST_FLAG__", true));
        std::env::remove_var("__WQ_TEST_FLAG__");
    }

    #[test]
    fn test_env_get_opt() {
        let val: Option<usize> = env_get_opt("__WQ_TEST_UNSET_VAR__");
        assert!(val.is_none());
    }
}
