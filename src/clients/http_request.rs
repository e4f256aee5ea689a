//! HTTP request types for the GitLab API client.
//!
//! This module provides [`HttpMethod`] and [`RequestOptions`], the per-call
//! parameters passed to [`Client`](crate::Client) verb methods.

use std::collections::HashMap;
use std::fmt;

/// HTTP methods supported by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating resources.
    Post,
    /// HTTP PUT method for updating resources.
    Put,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl HttpMethod {
    /// Returns the matching `reqwest` method.
    #[must_use]
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Post => write!(f, "post"),
            Self::Put => write!(f, "put"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Parameters for a single request.
///
/// Query parameters keep their insertion order. The body is an opaque JSON
/// value sent as `application/json`. Headers set here override the
/// transport-level extra headers from the configuration.
///
/// # Example
///
/// ```rust
/// use gitlab_api::RequestOptions;
/// use serde_json::json;
///
/// let options = RequestOptions::new()
///     .query_param("per_page", "50")
///     .query_param("order_by", "id")
///     .header("X-Request-Tag", "sync")
///     .body(json!({"name": "demo"}));
///
/// assert_eq!(options.query[0], ("per_page".to_string(), "50".to_string()));
/// assert!(options.body.is_some());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
    /// Query parameters, in insertion order.
    pub query: Vec<(String, String)>,
    /// The request body, if any.
    pub body: Option<serde_json::Value>,
    /// Per-request header overlay.
    pub headers: HashMap<String, String>,
}

impl RequestOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets the JSON request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds a single header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Merges transport-level headers underneath this request's headers.
    ///
    /// Headers already set on the request win over the defaults.
    #[must_use]
    pub fn with_default_headers(mut self, defaults: &HashMap<String, String>) -> Self {
        for (key, value) in defaults {
            let overridden = self
                .headers
                .keys()
                .any(|existing| existing.eq_ignore_ascii_case(key));
            if !overridden {
                self.headers.insert(key.clone(), value.clone());
            }
        }
        self
    }

    /// Adds a query parameter unless one with the same key is already set.
    #[must_use]
    pub fn with_default_param(mut self, key: &str, value: &str) -> Self {
        if !self.query.iter().any(|(existing, _)| existing == key) {
            self.query.push((key.to_string(), value.to_string()));
        }
        self
    }
}
