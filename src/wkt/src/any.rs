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

use crate::message::{Map, Message};
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use bytes::Bytes;
use serde_json::Value;

/// `Any` contains an arbitrary serialized protocol buffer message along with a
/// URL that describes the type of the serialized message.
///
/// Messages arrive in an `Any` from either transport. The gRPC transport
/// delivers the binary encoding, the REST transport delivers the JSON
/// encoding. `Any` keeps whichever form it received and decodes it on
/// demand with [to_msg()][Any::to_msg].
///
/// # JSON
///
/// The JSON representation of an `Any` value uses the regular
/// representation of the deserialized, embedded message, with an
/// additional field `@type` which contains the type URL:
///
/// ```norust
///     {
///       "@type": "type.googleapis.com/google.cloud.aiplatform.v1beta1.Dataset",
///       "name": "projects/p/locations/l/datasets/d",
///       "displayName": "my dataset"
///     }
/// ```
///
/// If the embedded message has a custom JSON representation, that
/// representation is embedded in a field named `value`:
///
/// ```norust
///     {
///       "@type": "type.googleapis.com/google.protobuf.Duration",
///       "value": "1.212s"
///     }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Any {
    type_url: String,
    binary: Option<Bytes>,
    json: Option<Map>,
}

/// Indicates a problem trying to use an [Any].
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum AnyError {
    /// Problem serializing an object into an [Any].
    #[error("cannot serialize object into an Any, source={0}")]
    Serialization(#[source] BoxedError),

    /// Problem deserializing an object from an [Any].
    #[error("cannot deserialize from an Any, source={0}")]
    Deserialization(#[source] BoxedError),

    /// Mismatched type, the [Any] does not contain the desired type.
    #[error("expected type mismatch in Any deserialization, got={got}, want={want}")]
    TypeMismatch {
        /// The type URL contained in the [Any].
        got: String,
        /// The type URL of the requested message.
        want: String,
    },
}

type BoxedError = Box<dyn std::error::Error + Send + Sync>;
type Error = AnyError;

impl AnyError {
    pub(crate) fn ser<T: Into<BoxedError>>(v: T) -> Self {
        Self::Serialization(v.into())
    }

    pub(crate) fn deser<T: Into<BoxedError>>(v: T) -> Self {
        Self::Deserialization(v.into())
    }
}

impl Any {
    /// Creates a new [Any] from a message.
    ///
    /// The `Any` stores both the binary and the JSON encoding, so it can be
    /// sent over either transport.
    ///
    /// # Example
    /// ```
    /// # use aiplatform_wkt::{Any, Duration};
    /// let any = Any::from_msg(&Duration::clamp(123, 0))?;
    /// assert_eq!(any.type_url(), "type.googleapis.com/google.protobuf.Duration");
    /// # Ok::<(), aiplatform_wkt::AnyError>(())
    /// ```
    pub fn from_msg<T>(message: &T) -> Result<Self, Error>
    where
        T: Message,
    {
        let binary = Bytes::from(prost::Message::encode_to_vec(message));
        let json = match serde_json::to_value(message).map_err(Error::ser)? {
            Value::Object(map) => map,
            Value::Null | Value::Array(_) => {
                return Err(Error::ser("unexpected JSON type for message"));
            }
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        Ok(Self {
            type_url: T::typename().to_string(),
            binary: Some(binary),
            json: Some(json),
        })
    }

    /// Creates an [Any] from the binary encoding of a message.
    pub fn from_binary<S: Into<String>>(type_url: S, value: Bytes) -> Self {
        Self {
            type_url: type_url.into(),
            binary: Some(value),
            json: None,
        }
    }

    /// The type URL of the contained message.
    pub fn type_url(&self) -> &str {
        &self.type_url
    }

    /// Extracts (if possible) a `T` value from the [Any].
    ///
    /// # Example
    /// ```
    /// # use aiplatform_wkt::{Any, Duration};
    /// let any = Any::from_msg(&Duration::clamp(123, 0))?;
    /// let d = any.to_msg::<Duration>()?;
    /// assert_eq!(d, Duration::clamp(123, 0));
    /// # Ok::<(), aiplatform_wkt::AnyError>(())
    /// ```
    pub fn to_msg<T>(&self) -> Result<T, Error>
    where
        T: Message,
    {
        if self.type_url != T::typename() {
            return Err(Error::TypeMismatch {
                got: self.type_url.clone(),
                want: T::typename().to_string(),
            });
        }
        if let Some(binary) = &self.binary {
            return crate::message::from_binary::<T>(binary.clone());
        }
        let map = self
            .json
            .as_ref()
            .ok_or_else(|| Error::deser("the Any has no payload"))?;
        let object = serde_json::from_value::<T>(Value::Object(map.clone()));
        match (object, map.get("value")) {
            (Ok(msg), _) => Ok(msg),
            (Err(e), None) => Err(Error::deser(e)),
            (Err(_), Some(value)) => Self::from_value_field::<T>(value),
        }
    }

    fn from_value_field<T: Message>(value: &Value) -> Result<T, Error> {
        if let Ok(msg) = serde_json::from_value::<T>(value.clone()) {
            return Ok(msg);
        }
        // Binary payloads without a JSON form are written as base64.
        let encoded = value
            .as_str()
            .ok_or_else(|| Error::deser("the `value` field is not a string"))?;
        let bytes = BASE64_STANDARD.decode(encoded).map_err(Error::deser)?;
        crate::message::from_binary::<T>(Bytes::from(bytes))
    }
}

impl prost::Message for Any {
    fn encode_raw(&self, buf: &mut impl bytes::BufMut) {
        if !self.type_url.is_empty() {
            prost::encoding::string::encode(1, &self.type_url, buf);
        }
        if let Some(binary) = self.binary.as_ref().filter(|b| !b.is_empty()) {
            prost::encoding::bytes::encode(2, binary, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: prost::encoding::WireType,
        buf: &mut impl bytes::Buf,
        ctx: prost::encoding::DecodeContext,
    ) -> Result<(), prost::DecodeError> {
        match tag {
            1 => prost::encoding::string::merge(wire_type, &mut self.type_url, buf, ctx),
            2 => {
                let mut value = self.binary.take().unwrap_or_default();
                let result = prost::encoding::bytes::merge(wire_type, &mut value, buf, ctx);
                self.binary = Some(value);
                result
            }
            _ => prost::encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let type_url = if self.type_url.is_empty() {
            0
        } else {
            prost::encoding::string::encoded_len(1, &self.type_url)
        };
        let value = self
            .binary
            .as_ref()
            .filter(|b| !b.is_empty())
            .map(|b| prost::encoding::bytes::encoded_len(2, b))
            .unwrap_or(0);
        type_url + value
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

impl serde::ser::Serialize for Any {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        let mut map = Map::new();
        map.insert("@type".to_string(), Value::String(self.type_url.clone()));
        match (&self.json, &self.binary) {
            (Some(json), _) => map.extend(json.clone()),
            (None, Some(binary)) => {
                map.insert(
                    "value".to_string(),
                    Value::String(BASE64_STANDARD.encode(binary)),
                );
            }
            (None, None) => {}
        }
        map.serialize(serializer)
    }
}

impl<'de> serde::de::Deserialize<'de> for Any {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;
        let mut map = Map::deserialize(deserializer)?;
        let type_url = match map.remove("@type") {
            Some(Value::String(s)) => s,
            Some(_) => return Err(D::Error::custom("@type field is not a string")),
            None => return Err(D::Error::missing_field("@type")),
        };
        Ok(Self {
            type_url,
            binary: None,
            json: Some(map),
        })
    }
}
