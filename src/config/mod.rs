//! Configuration types for the GitLab API client.
//!
//! This module provides the configuration passed explicitly to
//! [`Client::new`](crate::Client::new). There is no process-wide default
//! configuration; every client owns the values it was built with.
//!
//! # Overview
//!
//! - [`GitlabConfig`]: endpoint, token, user agent, sudo identity and transport options
//! - [`GitlabConfigBuilder`]: A builder for constructing [`GitlabConfig`] instances
//! - [`TransportOptions`]: Pass-through settings for the underlying HTTP transport
//! - [`Endpoint`]: A validated API endpoint URL
//! - [`PrivateToken`]: A validated token with masked debug output
//!
//! # Example
//!
//! ```rust
//! use gitlab_api::{Endpoint, GitlabConfig, PrivateToken};
//!
//! let config = GitlabConfig::builder()
//!     .endpoint(Endpoint::new("https://gitlab.example.com/api/v4").unwrap())
//!     .private_token(PrivateToken::new("glpat-abcdefghijklmn").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.endpoint().unwrap().path(), "/api/v4");
//! ```

mod newtypes;

pub use newtypes::{Endpoint, PrivateToken, PRIVATE_TOKEN_MAX_LEN};

use std::collections::HashMap;
use std::time::Duration;

use crate::error::ConfigError;

/// Default `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("Gitlab Rust Client v", env!("CARGO_PKG_VERSION"));

/// Environment variable holding the API endpoint.
pub const ENV_ENDPOINT: &str = "GITLAB_API_ENDPOINT";
/// Fallback endpoint variable set by GitLab CI jobs.
pub const ENV_CI_ENDPOINT: &str = "CI_API_V4_URL";
/// Environment variable holding the private or OAuth token.
pub const ENV_PRIVATE_TOKEN: &str = "GITLAB_API_PRIVATE_TOKEN";
/// Environment variable overriding the user agent.
pub const ENV_USER_AGENT: &str = "GITLAB_API_USER_AGENT";
/// Environment variable holding the sudo identity.
pub const ENV_SUDO: &str = "GITLAB_API_SUDO";

/// Settings passed through to the HTTP transport.
///
/// The client core defines no timeouts of its own; a timeout set here is
/// applied by `reqwest` to every request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Per-request timeout applied by the transport.
    pub timeout: Option<Duration>,
    /// Headers merged into every request before per-request headers.
    pub extra_headers: HashMap<String, String>,
}

/// Configuration for the GitLab API client.
///
/// Both `endpoint` and `private_token` are optional here: a missing endpoint
/// is reported when the client is constructed, a missing token when a request
/// that needs one is made.
#[derive(Clone, Debug)]
pub struct GitlabConfig {
    endpoint: Option<Endpoint>,
    private_token: Option<PrivateToken>,
    user_agent: String,
    sudo: Option<String>,
    transport: TransportOptions,
}

impl GitlabConfig {
    /// Creates a new builder for constructing a `GitlabConfig`.
    #[must_use]
    pub fn builder() -> GitlabConfigBuilder {
        GitlabConfigBuilder::new()
    }

    /// Builds a configuration from process environment variables.
    ///
    /// Reads `GITLAB_API_ENDPOINT` (falling back to `CI_API_V4_URL`),
    /// `GITLAB_API_PRIVATE_TOKEN`, `GITLAB_API_USER_AGENT` and
    /// `GITLAB_API_SUDO`. Unset or empty variables are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a looked-up value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut builder = Self::builder();
        if let Some(endpoint) = non_empty(ENV_ENDPOINT).or_else(|| non_empty(ENV_CI_ENDPOINT)) {
            builder = builder.endpoint(Endpoint::new(endpoint)?);
        }
        if let Some(token) = non_empty(ENV_PRIVATE_TOKEN) {
            builder = builder.private_token(PrivateToken::new(token)?);
        }
        if let Some(user_agent) = non_empty(ENV_USER_AGENT) {
            builder = builder.user_agent(user_agent);
        }
        if let Some(sudo) = non_empty(ENV_SUDO) {
            builder = builder.sudo(sudo);
        }
        builder.build()
    }

    /// Returns the API endpoint, if configured.
    #[must_use]
    pub const fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    /// Returns the private token, if configured.
    #[must_use]
    pub const fn private_token(&self) -> Option<&PrivateToken> {
        self.private_token.as_ref()
    }

    /// Returns the user agent.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the sudo identity, if configured.
    #[must_use]
    pub fn sudo(&self) -> Option<&str> {
        self.sudo.as_deref()
    }

    /// Returns the transport options.
    #[must_use]
    pub const fn transport(&self) -> &TransportOptions {
        &self.transport
    }
}

// Verify GitlabConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GitlabConfig>();
};

/// Builder for constructing [`GitlabConfig`] instances.
///
/// # Defaults
///
/// - `endpoint`: `None`
/// - `private_token`: `None`
/// - `user_agent`: [`DEFAULT_USER_AGENT`]
/// - `sudo`: `None`
/// - `transport`: no timeout, no extra headers
#[derive(Debug, Default)]
pub struct GitlabConfigBuilder {
    endpoint: Option<Endpoint>,
    private_token: Option<PrivateToken>,
    user_agent: Option<String>,
    sudo: Option<String>,
    transport: TransportOptions,
}

impl GitlabConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Sets the private or OAuth token.
    #[must_use]
    pub fn private_token(mut self, token: PrivateToken) -> Self {
        self.private_token = Some(token);
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets the sudo identity sent with every request.
    #[must_use]
    pub fn sudo(mut self, sudo: impl Into<String>) -> Self {
        self.sudo = Some(sudo.into());
        self
    }

    /// Sets the transport request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout = Some(timeout);
        self
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.transport
            .extra_headers
            .insert(name.into(), value.into());
        self
    }

    /// Builds the [`GitlabConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyUserAgent`] if the user agent was set to an
    /// empty string, or [`ConfigError::InvalidHeader`] if an extra header is
    /// not visible ASCII.
    pub fn build(self) -> Result<GitlabConfig, ConfigError> {
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        if user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }

        for (name, value) in &self.transport.extra_headers {
            let visible = |s: &str| s.chars().all(|c| c.is_ascii_graphic() || c == ' ');
            if name.is_empty() || name.contains(' ') || !visible(name) || !visible(value) {
                return Err(ConfigError::InvalidHeader { name: name.clone() });
            }
        }

        Ok(GitlabConfig {
            endpoint: self.endpoint,
            private_token: self.private_token,
            user_agent,
            sudo: self.sudo,
            transport: self.transport,
        })
    }
}
