//! Error types for GitLab API requests.
//!
//! # Error Handling
//!
//! - [`ResponseErrorKind`]: The fixed mapping from HTTP status codes to error kinds
//! - [`HttpResponseError`]: A mapped failure status, carrying the full response
//! - [`HttpError`]: Unified error type for every client operation
//!
//! # Example
//!
//! ```rust,ignore
//! use gitlab_api::{HttpError, ResponseErrorKind};
//!
//! match client.get("/projects/42", RequestOptions::new()).await {
//!     Ok(body) => println!("{:?}", body),
//!     Err(HttpError::Response(e)) if e.kind == ResponseErrorKind::NotFound => {
//!         println!("no such project");
//!     }
//!     Err(HttpError::MissingCredentials { reason }) => println!("{reason}"),
//!     Err(e) => println!("request failed: {e}"),
//! }
//! ```

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::clients::http_request::HttpMethod;
use crate::clients::http_response::HttpResponse;
use crate::error::ConfigError;

/// Body keys inspected, in order, when building a response error message.
const MESSAGE_KEYS: [&str; 3] = ["message", "error_description", "error"];

/// The kind of failure signalled by an HTTP status code.
///
/// Only the codes listed here are failures; every other status, including
/// all 2xx and 3xx codes, is treated as success.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResponseErrorKind {
    /// 400 Bad Request.
    BadRequest,
    /// 401 Unauthorized.
    Unauthorized,
    /// 403 Forbidden.
    Forbidden,
    /// 404 Not Found.
    NotFound,
    /// 405 Method Not Allowed.
    MethodNotAllowed,
    /// 409 Conflict.
    Conflict,
    /// 422 Unprocessable Entity.
    Unprocessable,
    /// 500 Internal Server Error.
    InternalServerError,
    /// 502 Bad Gateway.
    BadGateway,
    /// 503 Service Unavailable.
    ServiceUnavailable,
}

impl ResponseErrorKind {
    /// Maps a status code to its error kind, or `None` if the code is not a failure.
    ///
    /// ```rust
    /// use gitlab_api::ResponseErrorKind;
    ///
    /// assert_eq!(ResponseErrorKind::from_status(404), Some(ResponseErrorKind::NotFound));
    /// assert_eq!(ResponseErrorKind::from_status(200), None);
    /// assert_eq!(ResponseErrorKind::from_status(429), None);
    /// ```
    #[must_use]
    pub const fn from_status(code: u16) -> Option<Self> {
        match code {
            400 => Some(Self::BadRequest),
            401 => Some(Self::Unauthorized),
            403 => Some(Self::Forbidden),
            404 => Some(Self::NotFound),
            405 => Some(Self::MethodNotAllowed),
            409 => Some(Self::Conflict),
            422 => Some(Self::Unprocessable),
            500 => Some(Self::InternalServerError),
            502 => Some(Self::BadGateway),
            503 => Some(Self::ServiceUnavailable),
            _ => None,
        }
    }

    /// Returns the status code this kind is mapped from.
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::Conflict => 409,
            Self::Unprocessable => 422,
            Self::InternalServerError => 500,
            Self::BadGateway => 502,
            Self::ServiceUnavailable => 503,
        }
    }

    /// Returns the name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BadRequest => "BadRequest",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "NotFound",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::Conflict => "Conflict",
            Self::Unprocessable => "Unprocessable",
            Self::InternalServerError => "InternalServerError",
            Self::BadGateway => "BadGateway",
            Self::ServiceUnavailable => "ServiceUnavailable",
        }
    }
}

impl fmt::Display for ResponseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when the server answers with a mapped failure status.
///
/// The original response is kept whole so presentation layers can render
/// their own messages from the structured error body.
#[derive(Debug, Error)]
#[error("Server responded with code {}, message: {message}. Request URI: {request_uri}", .response.code)]
pub struct HttpResponseError {
    /// The failure kind derived from the status code.
    pub kind: ResponseErrorKind,
    /// The method of the failed request.
    pub method: HttpMethod,
    /// The absolute URI of the failed request.
    pub request_uri: String,
    /// The response as received.
    pub response: HttpResponse,
    /// Human-readable message extracted from the response body.
    pub message: String,
}

impl HttpResponseError {
    /// Creates a new response error, deriving its message from the body.
    #[must_use]
    pub fn new(
        kind: ResponseErrorKind,
        method: HttpMethod,
        request_uri: impl Into<String>,
        response: HttpResponse,
    ) -> Self {
        let message = error_message(&response.body);
        Self {
            kind,
            method,
            request_uri: request_uri.into(),
            response,
            message,
        }
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.response.code
    }

    /// Returns the raw response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.response.body
    }

    /// Returns the response headers, keyed by lower-cased name.
    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, Vec<String>> {
        &self.response.headers
    }

    /// Returns the absolute URI of the failed request.
    #[must_use]
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    /// Returns the message extracted from the response body.
    #[must_use]
    pub fn error_message(&self) -> &str {
        &self.message
    }

    /// Returns the `X-Request-Id` header value, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.response.request_id()
    }
}

/// Unified error type for all client operations.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Endpoint or token missing; raised before any network call.
    #[error("Please set an endpoint and a private token to make API requests: {reason}")]
    MissingCredentials {
        /// Which credential is missing.
        reason: &'static str,
    },

    /// The response body is not valid JSON.
    #[error("The response is not a valid JSON: {0}")]
    Parsing(#[from] serde_json::Error),

    /// The server answered with a mapped failure status.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// A followed pagination link returned something other than a JSON array.
    #[error("Expected a JSON array when fetching page {path}")]
    UnexpectedPageBody {
        /// The request path of the page.
        path: String,
    },

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The client configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl HttpError {
    /// Returns the response error kind, if this is a status-mapped failure.
    #[must_use]
    pub const fn kind(&self) -> Option<ResponseErrorKind> {
        match self {
            Self::Response(e) => Some(e.kind),
            _ => None,
        }
    }
}

/// Builds a readable message from a JSON error body.
///
/// Looks for `message`, then `error_description`, then `error`. Strings are
/// used as-is, arrays are joined with spaces and objects are flattened into
/// sorted `'key' value` pairs. Falls back to the raw body.
fn error_message(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    let message = MESSAGE_KEYS
        .iter()
        .find_map(|key| parsed.get(*key))
        .unwrap_or(&parsed);

    match message {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("'{key}' {}", flatten_field(value)))
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_text(other),
    }
}

fn flatten_field(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(key, inner)| format!("({key}: {})", scalar_text(inner)))
            .collect::<Vec<_>>()
            .join(" "),
        other => scalar_text(other),
    }
}

fn scalar_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}
