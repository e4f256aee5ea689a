//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Longest token still sent as a `PRIVATE-TOKEN` header.
///
/// GitLab personal access tokens are 20 characters; anything longer is
/// treated as an OAuth bearer token.
pub const PRIVATE_TOKEN_MAX_LEN: usize = 20;

/// A validated GitLab API token.
///
/// This newtype ensures the token is non-empty and masks its value in debug
/// output to prevent accidental exposure in logs.
///
/// # Example
///
/// ```rust
/// use gitlab_api::PrivateToken;
///
/// let token = PrivateToken::new("glpat-abcdefghij").unwrap();
/// assert_eq!(format!("{:?}", token), "PrivateToken(*****)");
/// assert!(!token.is_bearer());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateToken(String);

impl PrivateToken {
    /// Creates a new validated token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyPrivateToken`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ConfigError::EmptyPrivateToken);
        }
        Ok(Self(token))
    }

    /// Returns `true` if the token must be sent as `Authorization: Bearer`.
    #[must_use]
    pub fn is_bearer(&self) -> bool {
        self.0.chars().count() > PRIVATE_TOKEN_MAX_LEN
    }
}

impl AsRef<str> for PrivateToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PrivateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateToken(*****)")
    }
}

/// A validated API endpoint URL (e.g. `https://gitlab.example.com/api/v4`).
///
/// Trailing slashes are removed so that request paths can be appended
/// directly. The path portion is kept separately because pagination links
/// are matched against it rather than against the full authority.
///
/// # Example
///
/// ```rust
/// use gitlab_api::Endpoint;
///
/// let endpoint = Endpoint::new("https://gitlab.example.com/api/v4/").unwrap();
/// assert_eq!(endpoint.as_ref(), "https://gitlab.example.com/api/v4");
/// assert_eq!(endpoint.scheme(), "https");
/// assert_eq!(endpoint.host_name(), "gitlab.example.com");
/// assert_eq!(endpoint.path(), "/api/v4");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
    scheme_end: usize,
    host_start: usize,
    host_end: usize,
    path_start: usize,
}

impl Endpoint {
    /// Creates a new validated endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] if the URL has no scheme or host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim().trim_end_matches('/').to_string();
        let invalid = || ConfigError::InvalidEndpoint { url: url.clone() };

        let scheme_end = url.find("://").ok_or_else(invalid)?;
        let scheme = &url[..scheme_end];
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let host_start = scheme_end + 3;
        if host_start >= url.len() {
            return Err(invalid());
        }

        let remainder = &url[host_start..];
        let host_end = remainder
            .find([':', '/', '?', '#'])
            .map_or(url.len(), |i| host_start + i);
        if host_end == host_start {
            return Err(invalid());
        }

        let path_start = remainder
            .find(['/', '?', '#'])
            .map_or(url.len(), |i| host_start + i);

        Ok(Self {
            url,
            scheme_end,
            host_start,
            host_end,
            path_start,
        })
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.url[..self.scheme_end]
    }

    /// Returns the host name portion of the URL.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.url[self.host_start..self.host_end]
    }

    /// Returns the request path of the endpoint, without query or fragment.
    ///
    /// Empty when the endpoint is a bare host.
    #[must_use]
    pub fn path(&self) -> &str {
        let rest = &self.url[self.path_start..];
        let end = rest.find(['?', '#']).unwrap_or(rest.len());
        &rest[..end]
    }

    /// Joins a request path onto the endpoint.
    ///
    /// ```rust
    /// use gitlab_api::Endpoint;
    ///
    /// let endpoint = Endpoint::new("https://gitlab.example.com/api/v4").unwrap();
    /// assert_eq!(endpoint.join("/projects"), "https://gitlab.example.com/api/v4/projects");
    /// ```
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}{path}", self.url)
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl Serialize for Endpoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.url)
    }
}

impl<'de> Deserialize<'de> for Endpoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_token_rejects_empty_string() {
        let result = PrivateToken::new("");
        assert!(matches!(result, Err(ConfigError::EmptyPrivateToken)));
    }

    #[test]
    fn test_private_token_masks_value_in_debug() {
        let token = PrivateToken::new("super-secret-token").unwrap();
        let debug_output = format!("{:?}", token);
        assert_eq!(debug_output, "PrivateToken(*****)");
        assert!(!debug_output.contains("super-secret-token"));
    }

    #[test]
    fn test_private_token_bearer_threshold() {
        assert!(!PrivateToken::new("a".repeat(20)).unwrap().is_bearer());
        assert!(PrivateToken::new("a".repeat(21)).unwrap().is_bearer());
    }

    #[test]
    fn test_endpoint_validates_format() {
        let endpoint = Endpoint::new("https://gitlab.example.com/api/v4").unwrap();
        assert_eq!(endpoint.scheme(), "https");
        assert_eq!(endpoint.host_name(), "gitlab.example.com");
        assert_eq!(endpoint.path(), "/api/v4");

        // With port
        let endpoint = Endpoint::new("http://localhost:8080/api/v3").unwrap();
        assert_eq!(endpoint.host_name(), "localhost");
        assert_eq!(endpoint.path(), "/api/v3");

        // Bare host
        let endpoint = Endpoint::new("http://127.0.0.1:3000").unwrap();
        assert_eq!(endpoint.host_name(), "127.0.0.1");
        assert_eq!(endpoint.path(), "");
    }

    #[test]
    fn test_endpoint_strips_trailing_slashes() {
        let endpoint = Endpoint::new("https://gitlab.example.com/api/v4//").unwrap();
        assert_eq!(endpoint.as_ref(), "https://gitlab.example.com/api/v4");
        assert_eq!(endpoint.join("/user"), "https://gitlab.example.com/api/v4/user");
    }

    #[test]
    fn test_endpoint_rejects_invalid() {
        assert!(Endpoint::new("gitlab.example.com").is_err());
        assert!(Endpoint::new("https://").is_err());
        assert!(Endpoint::new("://example.com").is_err());
        assert!(Endpoint::new("https:///api/v4").is_err());
    }

    #[test]
    fn test_endpoint_deserializes_from_string() {
        let endpoint: Endpoint = serde_json::from_str(r#""https://gitlab.com/api/v4/""#).unwrap();
        assert_eq!(endpoint.as_ref(), "https://gitlab.com/api/v4");

        let invalid: Result<Endpoint, _> = serde_json::from_str(r#""gitlab.com""#);
        assert!(invalid.is_err());
    }
}
