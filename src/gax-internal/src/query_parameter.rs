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

//! Flattens request fields into query parameters.
//!
//! Fields that are not bound to the path or the body are sent as query
//! parameters. Nested messages use dotted names (`a.b.c=v`), repeated fields
//! repeat the parameter (`a=1&a=2`), and `null` values are omitted.

use serde_json::{Map, Value};

/// Flattens `value` into `(name, value)` pairs, appending them to `out`.
pub fn flatten(name: &str, value: Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(object) => object
            .into_iter()
            .for_each(|(k, v)| flatten(&format!("{name}.{k}"), v, out)),
        Value::Array(array) => array.into_iter().for_each(|v| flatten(name, v, out)),
        Value::Null => {}
        Value::String(s) => out.push((name.to_string(), s)),
        Value::Number(n) => out.push((name.to_string(), n.to_string())),
        Value::Bool(b) => out.push((name.to_string(), b.to_string())),
    }
}

/// Flattens all the fields of `object` into query parameters.
pub fn from_object(object: Map<String, Value>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    object
        .into_iter()
        .for_each(|(k, v)| flatten(&k, v, &mut out));
    out
}
