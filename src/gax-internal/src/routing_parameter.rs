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

//! Computes the `x-goog-request-params` routing header.
//!
//! The service uses this header to route requests without parsing their
//! payload. The header value is a `&` separated list of `field=value` pairs,
//! with the values percent-encoded. The `/` character is left unescaped, as
//! the values are typically resource names.

use crate::fields;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// The name of the routing header.
pub const REQUEST_PARAMS_HEADER: &str = "x-goog-request-params";

const ROUTING_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Returns the routing header value for `request`.
///
/// Returns `None` if the method has no routing fields. A routing field missing
/// from the request produces an empty value, e.g. `name=`.
pub fn request_params(routing_fields: &[&str], request: &serde_json::Value) -> Option<String> {
    if routing_fields.is_empty() {
        return None;
    }
    let value = routing_fields
        .iter()
        .map(|&field| {
            let value = fields::lookup(request, field)
                .and_then(fields::scalar)
                .unwrap_or_default();
            format((field, value.as_str()))
        })
        .collect::<Vec<_>>()
        .join("&");
    Some(value)
}

/// Formats a single `key=value` pair.
pub fn format((k, v): (&str, &str)) -> String {
    format!("{k}={}", utf8_percent_encode(v, ROUTING_VALUE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn resource_name() {
        let request = json!({"name": "projects/p/locations/l/datasets/d"});
        let got = request_params(&["name"], &request);
        assert_eq!(
            got.as_deref(),
            Some("name=projects/p/locations/l/datasets/d")
        );
    }

    #[test]
    fn missing_field_is_empty() {
        let got = request_params(&["parent"], &json!({}));
        assert_eq!(got.as_deref(), Some("parent="));
    }

    #[test]
    fn no_routing_fields() {
        let got = request_params(&[], &json!({"name": "abc"}));
        assert_eq!(got, None);
    }

    #[test]
    fn nested_and_multiple() {
        let request = json!({"dataset": {"name": "projects/p/datasets/d"}, "parent": "projects/p"});
        let got = request_params(&["dataset.name", "parent"], &request);
        assert_eq!(
            got.as_deref(),
            Some("dataset.name=projects/p/datasets/d&parent=projects/p")
        );
    }

    #[test_case("projects/p", "name=projects/p")]
    #[test_case("a b", "name=a%20b")]
    #[test_case("a&b=c", "name=a%26b%3Dc")]
    #[test_case("x-y_z.w~", "name=x-y_z.w~")]
    fn encoding(input: &str, want: &str) {
        assert_eq!(format(("name", input)), want);
    }
}
