//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Returns the original string unchanged if no `${}` patterns are present.
/// Bare `$VAR` syntax is not expanded (only `${VAR}` with braces).
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, UnsetVar> {
        std::env::var(var).map(Some).map_err(|_| UnsetVar {
            name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause.name),
    })
}

/// Lookup failure for a referenced variable.
struct UnsetVar {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_plain_string_unchanged() {
        let result = expand_env("https://confluence.example.com", "confluence.base_url").unwrap();
        assert_eq!(result, "https://confluence.example.com");
    }

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("MYSTPUB_TEST_SIMPLE", "hello");
        }
        let result = expand_env("${MYSTPUB_TEST_SIMPLE}", "test.field").unwrap();
        assert_eq!(result, "hello");
        unsafe {
            std::env::remove_var("MYSTPUB_TEST_SIMPLE");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("MYSTPUB_TEST_UNSET_DEFAULT");
        }
        let result = expand_env("${MYSTPUB_TEST_UNSET_DEFAULT:-fallback}", "test.field").unwrap();
        assert_eq!(result, "fallback");
    }

    #[test]
    fn test_expand_unset_var_reports_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("MYSTPUB_TEST_UNSET");
        }
        let err = expand_env("${MYSTPUB_TEST_UNSET}", "confluence.token").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("confluence.token"));
        assert!(message.contains("MYSTPUB_TEST_UNSET"));
    }
}
