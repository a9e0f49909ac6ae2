use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

const DEFAULT_SCHEME_PREFIX: &str = "https://";
const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

/// An absolute `http`/`https` URL accepted as a redirect target.
///
/// The wrapped string is the user's input with only the scheme filled in
/// when missing. No other canonicalization is applied, so the value is
/// stored and redirected to exactly as written.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Wraps a URL that was normalized before, e.g. one read back from storage.
    pub fn new_unchecked(url: impl Into<String>) -> Self {
        Self(url.into())
    }
}

impl Display for NormalizedUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns true if `input` starts with `scheme://`.
///
/// A `://` further along, e.g. inside a query parameter, does not count.
fn has_scheme(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once("://") else {
        return false;
    };

    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Normalizes raw user input into a redirect target.
///
/// Input without a scheme gets `https://` prepended. The result must then
/// parse as an absolute `http` or `https` URL with a host.
pub fn normalize(raw: &str) -> Result<NormalizedUrl> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidUrl("URL cannot be empty".to_string()));
    }

    // The parser drops tabs and newlines silently; the stored text would keep them.
    if trimmed.chars().any(|c| c.is_ascii_control()) {
        return Err(CoreError::InvalidUrl(
            "URL must not contain control characters".to_string(),
        ));
    }

    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("{DEFAULT_SCHEME_PREFIX}{trimmed}")
    };

    let parsed = ::url::Url::parse(&candidate)
        .map_err(|e| CoreError::InvalidUrl(format!("{candidate}: {e}")))?;

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(CoreError::InvalidUrl(format!(
            "URL scheme must be http or https: {}",
            parsed.scheme()
        )));
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(CoreError::InvalidUrl(format!(
            "URL must have a host: {candidate}"
        )));
    }

    Ok(NormalizedUrl(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_explicit_scheme() {
        let url = normalize("https://example.com/path?q=1").unwrap();
        assert_eq!(url.as_str(), "https://example.com/path?q=1");

        let url = normalize("http://example.com").unwrap();
        assert_eq!(url.as_str(), "http://example.com");
    }

    #[test]
    fn prepends_https_when_scheme_missing() {
        for raw in ["example.com", "www.example.com/a/b", "example.com:8080/x?y=z"] {
            let url = normalize(raw).unwrap();
            assert_eq!(url.as_str(), format!("https://{raw}"));
            assert!(::url::Url::parse(url.as_str()).is_ok());
        }
    }

    #[test]
    fn nested_url_in_query_still_gets_scheme() {
        let url = normalize("example.com/?next=https://other.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/?next=https://other.com");

        let url = normalize("login.example.com/cb#https://app.example.com").unwrap();
        assert_eq!(url.as_str(), "https://login.example.com/cb#https://app.example.com");

        let url = normalize("https://example.com/?next=http://other.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/?next=http://other.com");
    }

    #[test]
    fn scheme_detection_is_case_insensitive() {
        let url = normalize("HTTPS://example.com").unwrap();
        assert_eq!(url.as_str(), "HTTPS://example.com");
    }

    #[test]
    fn rejects_control_characters() {
        for raw in [
            "https://example.com/a\nb",
            "https://example.com/a\tb",
            "https://exam\rple.com",
            "example.com/\u{0}",
            "example.com/\u{7f}",
        ] {
            assert!(
                matches!(normalize(raw), Err(CoreError::InvalidUrl(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn no_further_canonicalization() {
        let url = normalize("https://Example.com/a/?b=2&a=1").unwrap();
        assert_eq!(url.as_str(), "https://Example.com/a/?b=2&a=1");

        // Url's own serialization would append a trailing slash.
        let url = normalize("example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let url = normalize("  example.com \n").unwrap();
        assert_eq!(url.as_str(), "https://example.com");
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(normalize(""), Err(CoreError::InvalidUrl(_))));
        assert!(matches!(normalize("   "), Err(CoreError::InvalidUrl(_))));
    }

    #[test]
    fn rejects_malformed() {
        assert!(normalize("https://").is_err());
        assert!(normalize("not a url").is_err());
        assert!(normalize("http://exa mple.com").is_err());
    }

    #[test]
    fn rejects_non_web_schemes() {
        assert!(normalize("ftp://example.com").is_err());
        assert!(normalize("javascript://alert(1)").is_err());
    }
}
