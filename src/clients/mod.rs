//! HTTP client types for GitLab API communication.
//!
//! This module provides the request layer: it authenticates requests, sends
//! them through `reqwest` and maps responses to decoded bodies or errors.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`Client`]: The async client for API communication
//! - [`RequestOptions`]: Query parameters, body and headers of one request
//! - [`HttpResponse`]: A raw response, before validation
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, DELETE)
//! - [`HttpError`]: Unified error type for client operations
//! - [`HttpResponseError`] and [`ResponseErrorKind`]: Status-mapped failures
//!
//! # Example
//!
//! ```rust,ignore
//! use gitlab_api::{Client, GitlabConfig, RequestOptions};
//!
//! let client = Client::new(&GitlabConfig::from_env()?)?;
//!
//! let issue = client
//!     .post(
//!         "/projects/42/issues",
//!         RequestOptions::new().body(serde_json::json!({"title": "Broken build"})),
//!     )
//!     .await?;
//! ```
//!
//! # Status Handling
//!
//! Only the statuses listed in [`ResponseErrorKind`] are failures. Every
//! other status, 2xx or not, is decoded as a successful body. The client
//! never retries.

mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{HttpError, HttpResponseError, ResponseErrorKind};
pub use http_client::{Client, PRIVATE_TOKEN_HEADER, SESSION_PATH};
pub use http_request::{HttpMethod, RequestOptions};
pub use http_response::HttpResponse;
