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

//! Resource names used by the `DatasetService`.
//!
//! Each resource type is described by a [ResourceTemplate]. Use
//! [ResourceTemplate::path] to build a well-formed name, and
//! [ResourceTemplate::parse] to extract its components.
//!
//! # Example
//! ```
//! # use aiplatform_v1beta1::resources::DATASET;
//! let name = DATASET.path(&[
//!     ("project", "my-project"),
//!     ("location", "us-central1"),
//!     ("dataset", "123"),
//! ])?;
//! assert_eq!(name, "projects/my-project/locations/us-central1/datasets/123");
//! let components = DATASET.parse(&name);
//! assert_eq!(components.get("dataset").map(String::as_str), Some("123"));
//! # Ok::<(), aiplatform_v1beta1::Error>(())
//! ```

use gax::error::Error;
use gaxi::path_template::PathTemplate;
use std::collections::HashMap;

/// A project, e.g. `projects/my-project`.
pub const PROJECT: ResourceTemplate = ResourceTemplate::new("projects/{project}");

/// A location, e.g. `projects/my-project/locations/us-central1`.
pub const LOCATION: ResourceTemplate =
    ResourceTemplate::new("projects/{project}/locations/{location}");

/// A dataset.
pub const DATASET: ResourceTemplate =
    ResourceTemplate::new("projects/{project}/locations/{location}/datasets/{dataset}");

/// An operation owned by a location.
pub const OPERATION: ResourceTemplate =
    ResourceTemplate::new("projects/{project}/locations/{location}/operations/{operation}");

/// An operation owned by a dataset.
pub const DATASET_OPERATION: ResourceTemplate = ResourceTemplate::new(
    "projects/{project}/locations/{location}/datasets/{dataset}/operations/{operation}",
);

/// Builds and parses the names of one resource type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceTemplate(&'static str);

impl ResourceTemplate {
    pub const fn new(template: &'static str) -> Self {
        Self(template)
    }

    /// The template, e.g. `projects/{project}/locations/{location}`.
    pub fn template(&self) -> &'static str {
        self.0
    }

    /// The names of the components, in order.
    pub fn components(&self) -> Vec<String> {
        self.parsed()
            .map(|t| t.fields().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Builds a resource name from its components.
    ///
    /// Returns an [invalid argument][Error::is_invalid_argument] error if a
    /// component is missing, empty, or contains a `/`.
    pub fn path(&self, values: &[(&str, &str)]) -> gax::Result<String> {
        let template = self.parsed().map_err(Error::invalid_argument)?;
        for field in template.fields() {
            let value = values
                .iter()
                .find(|(k, _)| *k == field)
                .map(|(_, v)| *v)
                .ok_or_else(|| {
                    Error::invalid_argument(ResourceNameError::Missing {
                        template: self.0,
                        component: field.to_string(),
                    })
                })?;
            if value.is_empty() || value.contains('/') {
                return Err(Error::invalid_argument(ResourceNameError::Malformed {
                    template: self.0,
                    component: field.to_string(),
                    value: value.to_string(),
                }));
            }
        }
        Ok(template.render(values))
    }

    /// Parses a resource name into its components.
    ///
    /// Returns an empty map if `name` does not match the template.
    pub fn parse(&self, name: &str) -> HashMap<String, String> {
        self.parsed()
            .map(|t| t.parse_components(name))
            .unwrap_or_default()
    }

    /// Returns true if `name` is a well-formed name for this resource type.
    pub fn matches(&self, name: &str) -> bool {
        self.parsed()
            .ok()
            .and_then(|t| t.match_path(name))
            .is_some()
    }

    fn parsed(&self) -> Result<PathTemplate, gaxi::path_template::PathTemplateError> {
        PathTemplate::parse(self.0)
    }
}

impl std::fmt::Display for ResourceTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, thiserror::Error)]
enum ResourceNameError {
    #[error("missing component `{component}` for resource template `{template}`")]
    Missing {
        template: &'static str,
        component: String,
    },
    #[error(
        "the value `{value}` of component `{component}` is not valid for resource template `{template}`"
    )]
    Malformed {
        template: &'static str,
        component: String,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn build() -> anyhow::Result<()> {
        let got = DATASET.path(&[("project", "p"), ("location", "l"), ("dataset", "d")])?;
        assert_eq!(got, "projects/p/locations/l/datasets/d");
        // The order of the values is irrelevant.
        let got = LOCATION.path(&[("location", "l"), ("project", "p")])?;
        assert_eq!(got, "projects/p/locations/l");
        Ok(())
    }

    #[test_case(&[("project", "p"), ("location", "l")]; "missing")]
    #[test_case(&[("project", "p"), ("location", "l"), ("dataset", "")]; "empty")]
    #[test_case(&[("project", "p"), ("location", "l"), ("dataset", "a/b")]; "slash")]
    fn build_invalid(values: &[(&str, &str)]) {
        let got = DATASET.path(values);
        assert!(matches!(&got, Err(e) if e.is_invalid_argument()), "{got:?}");
    }

    #[test]
    fn parse() {
        let got = DATASET.parse("projects/p/locations/l/datasets/d");
        let want = HashMap::from([
            ("project".to_string(), "p".to_string()),
            ("location".to_string(), "l".to_string()),
            ("dataset".to_string(), "d".to_string()),
        ]);
        assert_eq!(got, want);
        assert!(DATASET.matches("projects/p/locations/l/datasets/d"));
    }

    #[test_case("projects/p/locations/l")]
    #[test_case("projects/p/locations/l/datasets/d/extra")]
    #[test_case("folders/p/locations/l/datasets/d")]
    #[test_case("")]
    fn parse_mismatch(name: &str) {
        assert!(DATASET.parse(name).is_empty(), "{name}");
        assert!(!DATASET.matches(name), "{name}");
    }

    #[test]
    fn components() {
        assert_eq!(
            DATASET_OPERATION.components(),
            vec!["project", "location", "dataset", "operation"]
        );
        assert_eq!(OPERATION.to_string(), OPERATION.template());
        assert_eq!(PROJECT.components(), vec!["project"]);
    }
}
