//! Decoded GitLab API responses.
//!
//! This module turns JSON response bodies into navigable values:
//!
//! - **[`Record`]**: A decoded JSON object with attribute-style access
//! - **[`Value`]**: Any decoded JSON value, plus raw bytes for decoded file content
//! - **[`PaginatedResponse`]**: One page of a JSON array, able to fetch the others
//! - **[`PageLinks`]**: The `first`/`prev`/`next`/`last` links of a page
//! - **[`ResponseBody`]**: What a successful request decodes to
//! - **[`PageFetcher`]**: The client seam used to follow page links
//!
//! # Example
//!
//! ```rust
//! use gitlab_api::rest::{Record, Value};
//! use serde_json::json;
//!
//! let file = Record::from_json(json!({
//!     "file_name": "README.md",
//!     "encoding": "base64",
//!     "content": "SGVsbG8=",
//! }))
//! .unwrap();
//!
//! assert_eq!(file["file_name"].as_str(), Some("README.md"));
//! assert_eq!(file["decodedContent"].as_bytes(), Some(&b"Hello"[..]));
//! assert!(file.attr("missing").is_err());
//! assert!(matches!(file["missing"], Value::Null));
//! ```

mod body;
mod errors;
mod links;
mod paginated;
mod record;

pub use body::ResponseBody;
pub use errors::RecordError;
pub use links::PageLinks;
pub use paginated::{PageFetcher, PaginatedResponse};
pub use record::{Record, Value, CONTENT_KEY, DECODED_CONTENT_KEY, ENCODING_KEY};
