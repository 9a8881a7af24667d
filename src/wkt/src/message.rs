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

//! Define traits required of all messages.

use bytes::Bytes;

pub(crate) type Map = serde_json::Map<String, serde_json::Value>;

/// A trait that must be implemented by all messages.
///
/// Messages are sent over two different encodings. The gRPC transport uses
/// the protobuf binary encoding, provided by [prost::Message]. The REST
/// transport uses the protobuf JSON encoding, provided by `serde`.
///
/// Messages sent to and received from the service may be wrapped in
/// [Any][crate::Any]. `Any` uses the type URL returned by [typename] to
/// validate extraction and insertion.
///
/// [typename]: Message::typename
pub trait Message:
    prost::Message
    + Default
    + Clone
    + std::fmt::Debug
    + serde::ser::Serialize
    + serde::de::DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// The type URL of this message.
    fn typename() -> &'static str;
}

/// A type-erased [Message].
///
/// The transports and interceptors in the client runtime operate on a single
/// callable shape for all RPCs. They receive requests as `&dyn DynMessage`
/// and can encode them without knowing their concrete type.
pub trait DynMessage: std::fmt::Debug + Send + Sync {
    /// The type URL of the underlying message.
    fn message_type(&self) -> &'static str;

    /// Encodes the message using the protobuf binary encoding.
    fn encode_binary(&self) -> Bytes;

    /// Encodes the message using the protobuf JSON encoding.
    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>;

    /// Supports downcasting to the concrete message type.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Supports in-place mutation of the concrete message type.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;

    /// Clones the message into a new box.
    fn clone_box(&self) -> Box<dyn DynMessage>;
}

impl<T> DynMessage for T
where
    T: Message,
{
    fn message_type(&self) -> &'static str {
        <T as Message>::typename()
    }

    fn encode_binary(&self) -> Bytes {
        Bytes::from(prost::Message::encode_to_vec(self))
    }

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn clone_box(&self) -> Box<dyn DynMessage> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn DynMessage> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl dyn DynMessage {
    /// Returns a reference to the concrete message, if it is a `T`.
    pub fn downcast_ref<T: Message>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Returns a mutable reference to the concrete message, if it is a `T`.
    pub fn downcast_mut<T: Message>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Decodes a message from its protobuf binary encoding.
pub fn from_binary<T: Message>(bytes: Bytes) -> Result<T, crate::AnyError> {
    <T as prost::Message>::decode(bytes).map_err(crate::AnyError::deser)
}

/// Decodes a message from its protobuf JSON encoding.
pub fn from_json<T: Message>(value: serde_json::Value) -> Result<T, crate::AnyError> {
    serde_json::from_value::<T>(value).map_err(crate::AnyError::deser)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Duration;
    use serde_json::json;

    #[test]
    fn erased_encodings() -> anyhow::Result<()> {
        let d = Duration::clamp(12, 500_000_000);
        let erased: Box<dyn DynMessage> = Box::new(d);
        assert_eq!(erased.message_type(), <Duration as Message>::typename());
        assert_eq!(erased.to_json()?, json!("12.5s"));

        let bytes = erased.encode_binary();
        let got = from_binary::<Duration>(bytes)?;
        assert_eq!(got, d);
        Ok(())
    }

    #[test]
    fn downcast() {
        let mut erased: Box<dyn DynMessage> = Box::new(Duration::clamp(1, 0));
        assert!(erased.downcast_ref::<crate::Empty>().is_none());
        match erased.downcast_mut::<Duration>() {
            Some(d) => *d = Duration::clamp(2, 0),
            None => panic!("expected a Duration"),
        }
        assert_eq!(erased.downcast_ref::<Duration>(), Some(&Duration::clamp(2, 0)));
    }

    #[test]
    fn clone_box() {
        let erased: Box<dyn DynMessage> = Box::new(Duration::clamp(3, 0));
        let clone = erased.clone();
        assert_eq!(clone.downcast_ref::<Duration>(), Some(&Duration::clamp(3, 0)));
    }

    #[test]
    fn from_json_error() {
        let got = from_json::<Duration>(json!({"not": "a duration"}));
        assert!(matches!(got, Err(crate::AnyError::Deserialization(_))), "{got:?}");
    }
}
