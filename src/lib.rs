//! # GitLab API Rust Client
//!
//! The request and response core of a GitLab REST API client.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`GitlabConfig`] and [`GitlabConfigBuilder`]
//! - Validated newtypes for the endpoint and the access token
//! - An async [`Client`] with `PRIVATE-TOKEN` / bearer authentication
//! - A fixed mapping from failure statuses to [`ResponseErrorKind`]
//! - Decoded responses: [`Record`] objects, paginated collections, booleans
//! - Automatic base64 decoding of repository file content
//! - Lazy, bounded and visitor-based pagination over `Link` headers
//!
//! ## Quick Start
//!
//! ```rust
//! use gitlab_api::{Client, Endpoint, GitlabConfig, PrivateToken};
//!
//! let config = GitlabConfig::builder()
//!     .endpoint(Endpoint::new("https://gitlab.example.com/api/v4").unwrap())
//!     .private_token(PrivateToken::new("glpat-abcdefghijklmn").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let client = Client::new(&config).unwrap();
//! ```
//!
//! ## Making API Requests
//!
//! ```rust,ignore
//! use gitlab_api::{Client, GitlabConfig, RequestOptions};
//!
//! let client = Client::new(&GitlabConfig::from_env()?)?;
//!
//! let project = client.get("/projects/42", RequestOptions::new()).await?;
//! let project = project.into_record().unwrap();
//! println!("{}", project.attr("name")?.as_str().unwrap_or_default());
//! ```
//!
//! ## Pagination
//!
//! List endpoints return a [`PaginatedResponse`] that knows how to fetch the
//! pages around it:
//!
//! ```rust,ignore
//! let issues = client
//!     .get("/issues", RequestOptions::new().query_param("per_page", "100"))
//!     .await?
//!     .into_collection()
//!     .unwrap();
//!
//! // At most 250 issues; later pages are never requested
//! let issues = issues.paginate_with_limit(250).await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: Newtypes validate on construction, credentials are checked before I/O
//! - **Thread-safe**: All types are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime

pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use config::{
    Endpoint, GitlabConfig, GitlabConfigBuilder, PrivateToken, TransportOptions,
};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    Client, HttpError, HttpMethod, HttpResponse, HttpResponseError, RequestOptions,
    ResponseErrorKind,
};

// Re-export response types
pub use rest::{PageFetcher, PageLinks, PaginatedResponse, Record, RecordError, ResponseBody, Value};
