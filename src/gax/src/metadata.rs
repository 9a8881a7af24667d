// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Ordered request and response metadata.
//!
//! Metadata is a sequence of `(key, value)` pairs. Keys are lowercase ASCII.
//! Keys ending in `-bin` carry arbitrary bytes, all other keys carry ASCII
//! text. The order of the entries is preserved, and the same key may appear
//! more than once.
//!
//! # Example
//! ```
//! # use aiplatform_gax::metadata::{Metadata, MetadataValue};
//! let metadata = Metadata::new()
//!     .with_ascii("x-goog-user-project", "my-project")
//!     .with_binary("trace-bin", vec![0x01_u8, 0xff]);
//! assert_eq!(metadata.get("x-goog-user-project").and_then(MetadataValue::as_str), Some("my-project"));
//! assert_eq!(metadata.len(), 2);
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue};

/// The suffix identifying binary metadata keys.
pub const BINARY_SUFFIX: &str = "-bin";

/// A metadata value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetadataValue {
    /// A text value, used for all keys not ending in `-bin`.
    Ascii(String),
    /// A binary value, used for keys ending in `-bin`.
    Binary(Bytes),
}

impl MetadataValue {
    /// Returns the value as text, if it is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Ascii(s) => Some(s.as_str()),
            Self::Binary(_) => None,
        }
    }

    /// Returns the value as bytes, if it is a binary value.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Ascii(_) => None,
            Self::Binary(b) => Some(b),
        }
    }

    /// Encodes the value for the wire.
    ///
    /// Binary values are base64 encoded. Text values must be valid header
    /// values.
    pub fn to_header_value(&self) -> Result<HeaderValue, http::header::InvalidHeaderValue> {
        match self {
            Self::Ascii(s) => HeaderValue::from_str(s),
            Self::Binary(b) => HeaderValue::from_str(&STANDARD_NO_PAD.encode(b)),
        }
    }
}

impl std::fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ascii(s) => write!(f, "{s}"),
            Self::Binary(b) => write!(f, "{}", STANDARD.encode(b)),
        }
    }
}

impl serde::Serialize for MetadataValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// An ordered sequence of metadata entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, MetadataValue)>,
}

impl Metadata {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a text entry.
    ///
    /// If the key ends in `-bin` the bytes of `value` are stored as a binary
    /// value.
    pub fn with_ascii<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.push_ascii(key, value);
        self
    }

    /// Appends a binary entry.
    ///
    /// Binary values always use keys ending in `-bin`, the suffix is added if
    /// missing.
    pub fn with_binary<K: Into<String>, V: Into<Bytes>>(mut self, key: K, value: V) -> Self {
        self.push_binary(key, value);
        self
    }

    /// Appends a text entry, see [with_ascii][Metadata::with_ascii].
    pub fn push_ascii<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into().to_ascii_lowercase();
        let value = value.into();
        let value = if key.ends_with(BINARY_SUFFIX) {
            MetadataValue::Binary(Bytes::from(value.into_bytes()))
        } else {
            MetadataValue::Ascii(value)
        };
        self.entries.push((key, value));
    }

    /// Appends a binary entry, see [with_binary][Metadata::with_binary].
    pub fn push_binary<K: Into<String>, V: Into<Bytes>>(&mut self, key: K, value: V) {
        let mut key = key.into().to_ascii_lowercase();
        if !key.ends_with(BINARY_SUFFIX) {
            key.push_str(BINARY_SUFFIX);
        }
        self.entries.push((key, MetadataValue::Binary(value.into())));
    }

    /// Appends an entry.
    pub fn push(&mut self, key: String, value: MetadataValue) {
        self.entries.push((key.to_ascii_lowercase(), value));
    }

    /// Appends all the entries in `other`, preserving their order.
    pub fn extend(&mut self, other: Metadata) {
        self.entries.extend(other.entries);
    }

    /// The first value associated with `key`.
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.get_all(key).next()
    }

    /// All the values associated with `key`, in insertion order.
    pub fn get_all<'a, 'k>(
        &'a self,
        key: &'k str,
    ) -> impl Iterator<Item = &'a MetadataValue> + use<'a, 'k> {
        self.entries
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    /// Removes every entry for `key`, returning how many were removed.
    pub fn remove(&mut self, key: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
        before - self.entries.len()
    }

    /// Returns true if there is at least one value for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts the metadata to HTTP headers.
    ///
    /// The order of entries with the same key is preserved.
    pub fn to_header_map(&self) -> Result<HeaderMap, InvalidMetadata> {
        let mut headers = HeaderMap::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| InvalidMetadata::Key(key.clone()))?;
            let value = value
                .to_header_value()
                .map_err(|_| InvalidMetadata::Value(key.clone()))?;
            headers.append(name, value);
        }
        Ok(headers)
    }

    /// Converts HTTP headers (or gRPC metadata) to [Metadata].
    ///
    /// Values for `-bin` keys are base64-decoded, with or without padding.
    /// Values that cannot be decoded are kept as raw bytes. Text values that
    /// are not valid UTF-8 are skipped.
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let entries = headers
            .iter()
            .filter_map(|(name, value)| {
                let key = name.as_str().to_string();
                if key.ends_with(BINARY_SUFFIX) {
                    let raw = value.as_bytes();
                    let decoded = STANDARD_NO_PAD
                        .decode(raw)
                        .or_else(|_| STANDARD.decode(raw))
                        .map(Bytes::from)
                        .unwrap_or_else(|_| Bytes::copy_from_slice(raw));
                    return Some((key, MetadataValue::Binary(decoded)));
                }
                value
                    .to_str()
                    .ok()
                    .map(|v| (key, MetadataValue::Ascii(v.to_string())))
            })
            .collect();
        Self { entries }
    }
}

impl IntoIterator for Metadata {
    type Item = (String, MetadataValue);
    type IntoIter = std::vec::IntoIter<(String, MetadataValue)>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Metadata
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut metadata = Metadata::new();
        iter.into_iter()
            .for_each(|(k, v)| metadata.push_ascii(k, v));
        metadata
    }
}

impl serde::Serialize for Metadata {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for entry in &self.entries {
            seq.serialize_element(entry)?;
        }
        seq.end()
    }
}

/// The error returned when metadata cannot be sent on the wire.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InvalidMetadata {
    #[error("invalid metadata key: {0}")]
    Key(String),
    #[error("invalid metadata value for key {0}")]
    Value(String),
}
