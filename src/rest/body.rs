//! The decoded body of a successful response.

use crate::rest::{PaginatedResponse, Record, Value};

/// What a successful request decodes to.
///
/// JSON objects become a [`Record`], arrays a [`PaginatedResponse`], and
/// every other body a boolean: `false` for `false`, `null` or an empty body,
/// `true` for anything else.
#[derive(Clone, Debug)]
pub enum ResponseBody {
    /// A JSON object.
    Record(Record),
    /// A JSON array, possibly one page of many.
    Collection(PaginatedResponse),
    /// Any other body, reduced to its truthiness.
    Bool(bool),
}

impl ResponseBody {
    /// Classifies a decoded body. `None` stands for an empty body.
    #[must_use]
    pub fn from_decoded(decoded: Option<serde_json::Value>) -> Self {
        match decoded {
            Some(serde_json::Value::Object(map)) => Self::Record(Record::from_map(map)),
            Some(serde_json::Value::Array(items)) => Self::Collection(PaginatedResponse::new(
                items.into_iter().map(Value::from).collect(),
            )),
            Some(serde_json::Value::Null | serde_json::Value::Bool(false)) | None => Self::Bool(false),
            Some(_) => Self::Bool(true),
        }
    }

    /// Returns the record, if the body was an object.
    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Takes the record, if the body was an object.
    #[must_use]
    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Returns the collection, if the body was an array.
    #[must_use]
    pub const fn as_collection(&self) -> Option<&PaginatedResponse> {
        match self {
            Self::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Takes the collection, if the body was an array.
    #[must_use]
    pub fn into_collection(self) -> Option<PaginatedResponse> {
        match self {
            Self::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the boolean, if the body was neither object nor array.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}
