//! `${VAR}` expansion for configuration strings.

use std::sync::LazyLock;

use regex::Regex;

use crate::ConfigError;

static ENV_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").unwrap()
});

/// Expand `${VAR}` and `${VAR:-default}` references in a string.
///
/// The default applies when the variable is unset or empty. An unset
/// variable without a default is an error naming `field`. Bare `$VAR` and
/// anything else that is not a braced reference is copied through unchanged.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(value.len());
    let mut last = 0;

    for caps in ENV_REF.captures_iter(value) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        expanded.push_str(&value[last..whole.start()]);

        let name = name.as_str();
        let default = caps.get(2).map(|m| m.as_str());
        let var = std::env::var(name)
            .ok()
            .filter(|var| !var.is_empty() || default.is_none());
        match (var, default) {
            (Some(var), _) => expanded.push_str(&var),
            (None, Some(default)) => expanded.push_str(default),
            (None, None) => {
                return Err(ConfigError::EnvVar {
                    field: field.to_owned(),
                    message: format!("${{{name}}} not set"),
                });
            }
        }
        last = whole.end();
    }

    expanded.push_str(&value[last..]);
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expand_var_in_url() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("SHEAF_TEST_EXPAND_HOST", "docs.example.com");
        }
        let result = expand_env("https://${SHEAF_TEST_EXPAND_HOST}/wiki/", "links.wikilink_base");
        assert_eq!(result.unwrap(), "https://docs.example.com/wiki/");
        unsafe {
            std::env::remove_var("SHEAF_TEST_EXPAND_HOST");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("SHEAF_TEST_EXPAND_UNSET");
        }
        let result = expand_env("${SHEAF_TEST_EXPAND_UNSET:-/tags/}", "links.hashtag_base");
        assert_eq!(result.unwrap(), "/tags/");
    }

    #[test]
    fn test_expand_default_when_empty() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("SHEAF_TEST_EXPAND_EMPTY", "");
        }
        let result = expand_env("${SHEAF_TEST_EXPAND_EMPTY:-/}", "links.wikilink_base");
        assert_eq!(result.unwrap(), "/");
        // Without a default an empty value is used as-is
        let result = expand_env("a${SHEAF_TEST_EXPAND_EMPTY}b", "links.wikilink_base");
        assert_eq!(result.unwrap(), "ab");
        unsafe {
            std::env::remove_var("SHEAF_TEST_EXPAND_EMPTY");
        }
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("SHEAF_TEST_EXPAND_MISSING");
        }
        let err = expand_env("${SHEAF_TEST_EXPAND_MISSING}", "links.wikilink_base").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in links.wikilink_base: ${SHEAF_TEST_EXPAND_MISSING} not set"
        );
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        assert_eq!(expand_env("/price/$5", "field").unwrap(), "/price/$5");
    }

    #[test]
    fn test_bare_var_kept_next_to_braced_var() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::set_var("SHEAF_TEST_EXPAND_SITE", "https://notes.example.com");
            std::env::remove_var("SHEAF_TEST_EXPAND_BARE");
        }
        let result = expand_env(
            "${SHEAF_TEST_EXPAND_SITE}/$SHEAF_TEST_EXPAND_BARE/",
            "links.wikilink_base",
        );
        assert_eq!(
            result.unwrap(),
            "https://notes.example.com/$SHEAF_TEST_EXPAND_BARE/"
        );
        unsafe {
            std::env::remove_var("SHEAF_TEST_EXPAND_SITE");
        }
    }

    #[test]
    fn test_multiple_references() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("SHEAF_TEST_EXPAND_MULTI", "x");
            std::env::remove_var("SHEAF_TEST_EXPAND_MULTI_UNSET");
        }
        let result = expand_env(
            "/${SHEAF_TEST_EXPAND_MULTI}/${SHEAF_TEST_EXPAND_MULTI_UNSET:-y}/${SHEAF_TEST_EXPAND_MULTI}",
            "links.hashtag_base",
        );
        assert_eq!(result.unwrap(), "/x/y/x");
        unsafe {
            std::env::remove_var("SHEAF_TEST_EXPAND_MULTI");
        }
    }
}
