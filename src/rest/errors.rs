//! Error types for accessing decoded response objects.

use thiserror::Error;

/// Error returned by attribute-style access on a [`Record`](crate::rest::Record).
///
/// Indexed access (`record.get(..)`, `record["key"]`) never produces this
/// error; only [`Record::attr`](crate::rest::Record::attr) does.
///
/// # Example
///
/// ```rust
/// use gitlab_api::rest::{Record, RecordError};
/// use serde_json::json;
///
/// let record = Record::from_json(json!({"id": 1})).unwrap();
/// let error = record.attr("name").unwrap_err();
/// assert_eq!(error, RecordError::NoSuchAttribute { name: "name".to_string() });
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The record has no key with this name.
    #[error("undefined attribute '{name}' for record")]
    NoSuchAttribute {
        /// The attribute that was requested.
        name: String,
    },
}
