//! Configuration error types for the GitLab API client.
//!
//! This module contains error types used when building or validating
//! client configuration.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use gitlab_api::{ConfigError, PrivateToken};
//!
//! let result = PrivateToken::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyPrivateToken)));
//! ```

use thiserror::Error;

/// Errors that can occur during client configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Private token cannot be empty.
    #[error("Private token cannot be empty. Please provide a valid GitLab private or OAuth token.")]
    EmptyPrivateToken,

    /// Endpoint URL is invalid.
    #[error("Invalid endpoint URL '{url}'. Please provide a URL with scheme (e.g., 'https://gitlab.example.com/api/v4').")]
    InvalidEndpoint {
        /// The invalid URL that was provided.
        url: String,
    },

    /// User agent cannot be empty.
    #[error("User agent cannot be empty.")]
    EmptyUserAgent,

    /// An extra transport header has an invalid name or value.
    #[error("Invalid header '{name}': header names and values must be visible ASCII.")]
    InvalidHeader {
        /// The name of the offending header.
        name: String,
    },
}
