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

//! The client information headers.
//!
//! Every request carries an `x-goog-api-client` header identifying the
//! language runtime, the client runtime, the transport, and the generated
//! client. Requests also carry a `user-agent` header, which applications may
//! prefix with their own identifier.

/// The name of the client information header.
pub const API_CLIENT_HEADER: &str = "x-goog-api-client";

pub const GAPIC: &str = "gapic";
pub const GCCL: &str = "gccl";

mod build_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/build_env.rs"));

    pub(crate) const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// The wire protocol of a request, as reported in the client information.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    Grpc,
    Rest,
}

/// Identifies a generated client.
///
/// Generated libraries create one static instance of this struct and compute
/// the header values from it.
#[derive(Clone, Debug, PartialEq)]
pub struct XGoogApiClient {
    pub name: &'static str,
    pub library_type: &'static str,
    pub version: &'static str,
}

impl XGoogApiClient {
    /// Formats the value of the `x-goog-api-client` header.
    pub fn header_value(&self, protocol: Protocol) -> String {
        let rustc_version = rustc_version();
        let gax_version = build_info::PKG_VERSION;
        let transport = match protocol {
            Protocol::Grpc => format!("grpc/{gax_version}-tonic"),
            Protocol::Rest => format!("rest/{gax_version}-reqwest"),
        };
        format!(
            "gl-rust/{rustc_version} gax/{gax_version} {transport} {}/{}",
            self.library_type, self.version
        )
    }

    /// Formats the value of the `user-agent` header.
    ///
    /// The `prefix`, if any, comes first so the service can attribute the
    /// request to the application.
    pub fn user_agent(&self, prefix: Option<&str>) -> String {
        let base = format!("{}/{} gl-rust/{}", self.name, self.version, rustc_version());
        match prefix {
            Some(p) if !p.is_empty() => format!("{p} {base}"),
            _ => base,
        }
    }
}

// Strips the initial "rustc " string from `RUSTC_VERSION`, if present.
fn rustc_version() -> &'static str {
    build_info::RUSTC_VERSION
        .strip_prefix("rustc ")
        .unwrap_or(build_info::RUSTC_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    const CLIENT: XGoogApiClient = XGoogApiClient {
        name: "aiplatform-v1beta1",
        version: "1.2.3",
        library_type: GAPIC,
    };

    fn breakdown(formatted: &str) -> HashMap<String, String> {
        formatted
            .split(" ")
            .filter_map(|v| v.find('/').map(|i| v.split_at(i)))
            .map(|(k, v)| (k, &v[1..]))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test_case(Protocol::Rest, "rest", "grpc")]
    #[test_case(Protocol::Grpc, "grpc", "rest")]
    fn header_value(protocol: Protocol, present: &str, absent: &str) {
        let fields = breakdown(CLIENT.header_value(protocol).as_str());

        let got = fields.get(GAPIC).map(String::to_owned);
        assert_eq!(got.as_deref(), Some("1.2.3"));

        let got = fields.get("gax").map(String::to_owned);
        assert_eq!(got.as_deref(), Some(build_info::PKG_VERSION));

        assert!(fields.contains_key(present), "{fields:?}");
        assert!(!fields.contains_key(absent), "{fields:?}");

        let got = fields.get("gl-rust").map(String::to_owned);
        let want = build_info::RUSTC_VERSION;
        assert!(
            got.as_ref()
                .map(|s| want.contains(s) && !s.is_empty())
                .unwrap_or(false),
            "mismatched rustc version {want} and {got:?}"
        );
    }

    #[test]
    fn user_agent() {
        let got = CLIENT.user_agent(None);
        assert!(got.starts_with("aiplatform-v1beta1/1.2.3 gl-rust/"), "{got}");

        let got = CLIENT.user_agent(Some("my-app/2.0"));
        assert!(got.starts_with("my-app/2.0 aiplatform-v1beta1/1.2.3 "), "{got}");

        let got = CLIENT.user_agent(Some(""));
        assert!(got.starts_with("aiplatform-v1beta1/"), "{got}");
    }
}
