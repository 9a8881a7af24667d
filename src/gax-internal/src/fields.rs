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

//! Helpers to navigate request fields in their JSON representation.
//!
//! Bindings and routing rules name request fields using their proto names,
//! in `snake_case`, and may reference nested fields with dotted paths. The
//! JSON encoding of the messages uses `lowerCamelCase` names.

use serde_json::Value;

/// Converts a proto field name to its JSON name.
pub(crate) fn json_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        match c {
            '_' => upper = true,
            c if upper => {
                out.extend(c.to_uppercase());
                upper = false;
            }
            c => out.push(c),
        }
    }
    out
}

/// Finds the value of a (possibly nested) field.
pub(crate) fn lookup<'a>(message: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(message, |v, name| v.as_object()?.get(&json_name(name)))
}

/// Removes a (possibly nested) field, returning its value.
pub(crate) fn remove(message: &mut Value, path: &str) -> Option<Value> {
    let (parent, name) = match path.rsplit_once('.') {
        None => (message, path),
        Some((head, name)) => (
            head.split('.').try_fold(message, |v, n| {
                v.as_object_mut()?.get_mut(&json_name(n))
            })?,
            name,
        ),
    };
    parent.as_object_mut()?.remove(&json_name(name))
}

/// Formats a scalar field for use in a path, header, or query parameter.
pub(crate) fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
