//! Serialization Codec
//!
//! Best-effort conversion between structured values and the strings the
//! store accepts. Neither direction fails: a value that cannot be serialized
//! is passed through as text, and text that cannot be parsed is returned raw.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

// == Encoded ==
/// Result of encoding a value for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    /// Clean JSON serialization
    Json(String),
    /// Serialization failed; holds the value's debug rendering instead
    Fallback(String),
}

impl Encoded {
    /// Returns the text that will be written to the store.
    pub fn as_str(&self) -> &str {
        match self {
            Encoded::Json(s) | Encoded::Fallback(s) => s,
        }
    }

    /// Consumes the result, returning the stored text.
    pub fn into_string(self) -> String {
        match self {
            Encoded::Json(s) | Encoded::Fallback(s) => s,
        }
    }

    /// True if serialization degraded to the fallback text.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Encoded::Fallback(_))
    }
}

// == Decoded ==
/// Result of decoding text read from the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// The text parsed as `T`
    Json(T),
    /// The text did not parse; returned as stored
    Raw(String),
}

impl<T> Decoded<T> {
    /// Returns the parsed value, discarding raw text.
    pub fn into_value(self) -> Option<T> {
        match self {
            Decoded::Json(value) => Some(value),
            Decoded::Raw(_) => None,
        }
    }

    /// True if the text was returned unparsed.
    pub fn is_raw(&self) -> bool {
        matches!(self, Decoded::Raw(_))
    }
}

// == Encode ==
/// Serializes `value` to JSON, falling back to its debug rendering.
pub fn encode<T>(value: &T) -> Encoded
where
    T: Serialize + fmt::Debug + ?Sized,
{
    match serde_json::to_string(value) {
        Ok(json) => Encoded::Json(json),
        Err(e) => {
            warn!("Value could not be serialized, storing as text: {}", e);
            Encoded::Fallback(format!("{:?}", value))
        }
    }
}

// == Decode ==
/// Parses `raw` as JSON into `T`, returning the text itself on failure.
pub fn decode<T: DeserializeOwned>(raw: String) -> Decoded<T> {
    match serde_json::from_str(&raw) {
        Ok(value) => Decoded::Json(value),
        Err(_) => Decoded::Raw(raw),
    }
}
