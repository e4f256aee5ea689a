//! Immutable objects built from decoded JSON responses.
//!
//! Every JSON object in a response body becomes a [`Record`] and every value
//! a [`Value`]. Conversion is recursive: nested objects become nested
//! records and arrays are converted element by element.
//!
//! # Content decoding
//!
//! GitLab returns file contents as `{"encoding": "base64", "content": "..."}`.
//! A record holding both keys with that encoding also exposes the decoded
//! bytes under `decodedContent`. The derivation happens once, when the
//! record is built. Any other encoding is logged and left alone.
//!
//! # Access
//!
//! ```rust
//! use gitlab_api::rest::{Record, Value};
//! use serde_json::json;
//!
//! let record = Record::from_json(json!({
//!     "id": 7,
//!     "owner": {"username": "root"},
//!     "encoding": "base64",
//!     "content": "aGVsbG8=",
//! }))
//! .unwrap();
//!
//! // Attribute access fails on unknown keys
//! assert_eq!(record.attr("id").unwrap().as_i64(), Some(7));
//! assert!(record.attr("missing").is_err());
//!
//! // Indexed access never fails
//! assert_eq!(record["owner"]["username"].as_str(), Some("root"));
//! assert!(record["missing"].is_null());
//! assert!(record.get("missing").is_none());
//!
//! // Presence query
//! assert!(record.has("owner"));
//! assert!(!record.has("missing"));
//!
//! assert_eq!(record["decodedContent"].as_bytes(), Some(&b"hello"[..]));
//! ```

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::ops::Index;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::rest::RecordError;

/// Key holding the content encoding.
pub const ENCODING_KEY: &str = "encoding";
/// Key holding the encoded content.
pub const CONTENT_KEY: &str = "content";
/// Key under which decoded content bytes are exposed.
pub const DECODED_CONTENT_KEY: &str = "decodedContent";

static NULL: Value = Value::Null;

/// A converted response value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// JSON `null`, also the absent sentinel of indexed access.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(serde_json::Number),
    /// A string.
    String(String),
    /// Raw bytes; only produced for `decodedContent`.
    Bytes(Vec<u8>),
    /// An array of converted values.
    Array(Vec<Value>),
    /// A nested record.
    Record(Record),
}

impl Value {
    /// Converts a decoded value into its object-model form.
    ///
    /// Raw JSON is converted recursively. Values that are already converted
    /// are returned as they are, so applying this twice yields the same
    /// result as applying it once.
    #[must_use]
    pub fn from_decoded(value: impl Into<Self>) -> Self {
        match value.into() {
            Self::Array(items) => Self::Array(items.into_iter().map(Self::from_decoded).collect()),
            other => other,
        }
    }

    /// Returns `true` unless the value is `null` or `false`.
    #[must_use]
    pub const fn is_truthy(&self) -> bool {
        !matches!(self, Self::Null | Self::Bool(false))
    }

    /// Returns `true` if the value is `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number as `i64`, if representable.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Returns the number as `u64`, if representable.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    /// Returns the number as `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Returns the string slice, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the bytes, if this is a byte value.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the elements, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the record, if this is one.
    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Converts back into plain JSON.
    ///
    /// Bytes become a string, with invalid UTF-8 replaced.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Bytes(b) => serde_json::Value::String(String::from_utf8_lossy(b).into_owned()),
            Self::Array(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Record(r) => r.to_json(),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Record(Record::from_map(map)),
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl Index<&str> for Value {
    type Output = Self;

    /// Indexes into a record value; anything else yields `Null`.
    fn index(&self, key: &str) -> &Self {
        match self {
            Self::Record(r) => &r[key],
            _ => &NULL,
        }
    }
}

impl Index<usize> for Value {
    type Output = Self;

    fn index(&self, index: usize) -> &Self {
        match self {
            Self::Array(items) => items.get(index).unwrap_or(&NULL),
            _ => &NULL,
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Bytes(b) => serializer.serialize_str(&String::from_utf8_lossy(b)),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Record(r) => r.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

/// An immutable, key-ordered record built from a JSON object.
///
/// Keys iterate in sorted order. There is no way to mutate a record once
/// it is built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Builds a record from already-converted fields.
    ///
    /// Nested arrays are normalized and `decodedContent` is derived.
    #[must_use]
    pub fn new<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(key, value)| (key.into(), Value::from_decoded(value)))
            .collect();
        Self::build(fields)
    }

    /// Builds a record from a decoded JSON object, converting every value.
    #[must_use]
    pub fn from_map(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let fields = map
            .into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect();
        Self::build(fields)
    }

    /// Builds a record from a JSON value, or `None` if it is not an object.
    #[must_use]
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(map) => Some(Self::from_map(map)),
            _ => None,
        }
    }

    fn build(mut fields: BTreeMap<String, Value>) -> Self {
        match decode_content(&fields) {
            Ok(Some(decoded)) => {
                fields.insert(DECODED_CONTENT_KEY.to_string(), Value::Bytes(decoded));
            }
            Ok(None) => {}
            Err(Undecoded::UnknownEncoding(encoding)) => {
                tracing::warn!(%encoding, "Unknown content encoding, leaving content undecoded");
            }
            Err(Undecoded::NonStringContent) => {
                tracing::warn!("Base64 content is not a string, leaving it undecoded");
            }
            Err(Undecoded::InvalidBase64(e)) => {
                tracing::warn!(error = %e, "Content is not valid base64, leaving it undecoded");
            }
        }
        Self { fields }
    }

    /// Attribute-style access.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NoSuchAttribute`] if the key is absent.
    pub fn attr(&self, name: &str) -> Result<&Value, RecordError> {
        self.fields
            .get(name)
            .ok_or_else(|| RecordError::NoSuchAttribute {
                name: name.to_string(),
            })
    }

    /// Returns `true` if the key is present and its value is truthy.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(Value::is_truthy)
    }

    /// Indexed access; `None` when the key is absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns `true` if the key is present, whatever its value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Iterates over keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterates over key/value pairs in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Converts back into a plain JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl Index<&str> for Record {
    type Output = Value;

    /// Returns `Value::Null` for absent keys.
    fn index(&self, key: &str) -> &Value {
        self.fields.get(key).unwrap_or(&NULL)
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Map::deserialize(deserializer).map(Self::from_map)
    }
}

/// Why content was left undecoded.
#[derive(Debug, PartialEq)]
enum Undecoded {
    UnknownEncoding(serde_json::Value),
    NonStringContent,
    InvalidBase64(base64::DecodeError),
}

/// Decodes `content` when `encoding` is `base64`.
///
/// `Ok(None)` means there is nothing to decode: no `encoding` key, or a
/// `base64` encoding without `content`. Any other encoding is reported
/// whether or not `content` is present.
fn decode_content(fields: &BTreeMap<String, Value>) -> Result<Option<Vec<u8>>, Undecoded> {
    let Some(encoding) = fields.get(ENCODING_KEY) else {
        return Ok(None);
    };
    if encoding.as_str() != Some("base64") {
        return Err(Undecoded::UnknownEncoding(encoding.to_json()));
    }

    let Some(content) = fields.get(CONTENT_KEY) else {
        return Ok(None);
    };
    let content = content.as_str().ok_or(Undecoded::NonStringContent)?;

    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map(Some)
        .map_err(Undecoded::InvalidBase64)
}
