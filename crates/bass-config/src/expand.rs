//! Shell-style expansion of configured paths.
//!
//! Supports `~` for the home directory and `$VAR` / `${VAR}` references.

use std::borrow::Cow;

use crate::ConfigError;

/// Expand `~` and environment variable references in `value`.
///
/// `field` names the config key and is only used for error reporting.
pub(crate) fn expand_path(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::full(value)
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_literal_unchanged() {
        assert_eq!(expand_path("content", "paths.input").unwrap(), "content");
    }

    #[test]
    fn test_expand_env_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("BASS_TEST_INPUT_DIR", "/srv/site");
        }

        let expanded = expand_path("${BASS_TEST_INPUT_DIR}/input", "paths.input").unwrap();
        assert_eq!(expanded, "/srv/site/input");

        unsafe {
            std::env::remove_var("BASS_TEST_INPUT_DIR");
        }
    }

    #[test]
    fn test_expand_missing_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("BASS_TEST_MISSING_DIR");
        }

        let err = expand_path("$BASS_TEST_MISSING_DIR/out", "paths.output").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("BASS_TEST_MISSING_DIR"));
        assert!(err.to_string().contains("paths.output"));
    }
}
