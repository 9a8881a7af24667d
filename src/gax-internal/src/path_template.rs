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

//! Path templates for resource names and HTTP bindings.
//!
//! A template is a sequence of `/` separated segments, optionally followed by
//! a `:verb`. Each segment is a literal, a single segment wildcard (`*`), a
//! multi-segment wildcard (`**`), or a variable. Variables name a (possibly
//! dotted) request field and the pattern its value must match, e.g.
//! `{name=projects/*/locations/*}`. A variable without a pattern, e.g.
//! `{project}`, matches a single segment.
//!
//! The same templates describe resource names
//! (`projects/{project}/locations/{location}`) and HTTP URI templates
//! (`/v1beta1/{parent=projects/*/locations/*}/datasets`).

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::collections::HashMap;

// Only the RFC 3986 unreserved characters are left unencoded.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Single,
    Multi,
    Variable { field: String, pattern: Vec<Segment> },
}

/// A parsed path template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathTemplate {
    leading_slash: bool,
    segments: Vec<Segment>,
    verb: Option<String>,
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum PathTemplateError {
    #[error("cannot parse path template `{template}`: {reason}")]
    Parse {
        template: String,
        reason: &'static str,
    },
    #[error("missing value for path field `{0}`")]
    MissingField(String),
    #[error("the value `{value}` of field `{field}` does not match the pattern `{pattern}`")]
    Mismatch {
        field: String,
        value: String,
        pattern: String,
    },
    #[error("the template contains wildcards outside variables")]
    UnboundWildcard,
}

type Result<T> = std::result::Result<T, PathTemplateError>;

impl PathTemplate {
    /// Parses a template.
    ///
    /// # Example
    /// ```
    /// # use aiplatform_gax_internal::path_template::PathTemplate;
    /// let t = PathTemplate::parse("/v1beta1/{name=projects/*/locations/*/datasets/*}")?;
    /// assert_eq!(t.fields(), vec!["name"]);
    /// # Ok::<(), aiplatform_gax_internal::path_template::PathTemplateError>(())
    /// ```
    pub fn parse(template: &str) -> Result<Self> {
        let error = |reason| PathTemplateError::Parse {
            template: template.to_string(),
            reason,
        };
        let (leading_slash, body) = match template.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, template),
        };
        let mut parts = split_top_level(body, '/').map_err(error)?;
        let mut verb = None;
        if let Some(last) = parts.pop() {
            let mut pieces = split_top_level(&last, ':').map_err(error)?;
            match pieces.len() {
                1 => parts.push(last),
                2 => {
                    verb = pieces.pop();
                    parts.extend(pieces);
                }
                _ => return Err(error("too many `:` in the last segment")),
            }
        }
        let segments = parts
            .iter()
            .map(|p| parse_segment(p, true))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(error)?;
        if segments.is_empty() {
            return Err(error("empty template"));
        }
        Ok(Self {
            leading_slash,
            segments,
            verb,
        })
    }

    /// The request fields referenced by the template, in order.
    pub fn fields(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Variable { field, .. } => Some(field.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Expands the template for an HTTP request path.
    ///
    /// Each variable is replaced by the value returned by `lookup`. The value
    /// must match the variable pattern. Each `/` separated piece of the value
    /// is percent-encoded.
    pub fn expand<F>(&self, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut pieces = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(l) => pieces.push(l.clone()),
                Segment::Single | Segment::Multi => {
                    return Err(PathTemplateError::UnboundWildcard);
                }
                Segment::Variable { field, pattern } => {
                    let value =
                        lookup(field).ok_or_else(|| PathTemplateError::MissingField(field.clone()))?;
                    let parts = value.split('/').collect::<Vec<_>>();
                    if match_segments(pattern, &parts).is_none() {
                        return Err(PathTemplateError::Mismatch {
                            field: field.clone(),
                            value,
                            pattern: render_pattern(pattern),
                        });
                    }
                    let encoded = parts
                        .iter()
                        .map(|p| utf8_percent_encode(p, SEGMENT).to_string())
                        .collect::<Vec<_>>()
                        .join("/");
                    pieces.push(encoded);
                }
            }
        }
        Ok(self.assemble(pieces))
    }

    /// Renders the template replacing each variable with its value.
    ///
    /// Values are inserted verbatim, missing values are rendered as empty
    /// strings. Use this to build resource names.
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        let pieces = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(l) => l.clone(),
                Segment::Single => "*".to_string(),
                Segment::Multi => "**".to_string(),
                Segment::Variable { field, .. } => values
                    .iter()
                    .find(|(k, _)| k == field)
                    .map(|(_, v)| v.to_string())
                    .unwrap_or_default(),
            })
            .collect();
        self.assemble(pieces)
    }

    /// Matches `path` against the template, returning the variable values in
    /// template order.
    pub fn match_path(&self, path: &str) -> Option<Vec<(String, String)>> {
        let path = match (&self.verb, path.rsplit_once(':')) {
            (None, _) => path,
            (Some(verb), Some((head, v))) if v == verb => head,
            (Some(_), _) => return None,
        };
        let path = match (self.leading_slash, path.strip_prefix('/')) {
            (true, Some(rest)) => rest,
            (true, None) => return None,
            (false, _) => path,
        };
        let parts = path.split('/').collect::<Vec<_>>();

        // Flatten the variables into atoms, remembering which variable (if
        // any) owns each atom.
        let mut atoms = Vec::new();
        let mut owners = Vec::new();
        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Variable { pattern, .. } => {
                    for p in pattern {
                        atoms.push(p.clone());
                        owners.push(Some(index));
                    }
                }
                s => {
                    atoms.push(s.clone());
                    owners.push(None);
                }
            }
        }
        let counts = match_segments(&atoms, &parts)?;

        let mut values: Vec<(String, Vec<&str>)> = Vec::new();
        let mut offset = 0;
        let mut current = None;
        for (count, owner) in counts.into_iter().zip(owners) {
            let consumed = &parts[offset..offset + count];
            offset += count;
            let Some(index) = owner else {
                current = None;
                continue;
            };
            if current != Some(index) {
                if let Segment::Variable { field, .. } = &self.segments[index] {
                    values.push((field.clone(), Vec::new()));
                }
                current = Some(index);
            }
            if let Some((_, v)) = values.last_mut() {
                v.extend_from_slice(consumed);
            }
        }
        Some(
            values
                .into_iter()
                .map(|(field, parts)| (field, parts.join("/")))
                .collect(),
        )
    }

    /// Parses a resource name into its named components.
    ///
    /// Returns an empty map if `path` does not match the template.
    pub fn parse_components(&self, path: &str) -> HashMap<String, String> {
        self.match_path(path)
            .map(|v| v.into_iter().collect())
            .unwrap_or_default()
    }

    fn assemble(&self, pieces: Vec<String>) -> String {
        let mut path = pieces.join("/");
        if self.leading_slash {
            path.insert(0, '/');
        }
        if let Some(verb) = &self.verb {
            path.push(':');
            path.push_str(verb);
        }
        path
    }
}

impl std::str::FromStr for PathTemplate {
    type Err = PathTemplateError;
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn split_top_level(input: &str, separator: char) -> std::result::Result<Vec<String>, &'static str> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0_usize;
    for c in input.chars() {
        match c {
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth = depth.checked_sub(1).ok_or("unbalanced `}`")?;
                current.push(c);
            }
            c if c == separator && depth == 0 => parts.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    if depth != 0 {
        return Err("unbalanced `{`");
    }
    parts.push(current);
    Ok(parts)
}

fn parse_segment(input: &str, allow_variable: bool) -> std::result::Result<Segment, &'static str> {
    match input {
        "" => Err("empty segment"),
        "*" => Ok(Segment::Single),
        "**" => Ok(Segment::Multi),
        s if s.starts_with('{') => {
            if !allow_variable {
                return Err("nested variables are not supported");
            }
            let inner = s
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .ok_or("variables must span a full segment")?;
            let (field, pattern) = match inner.split_once('=') {
                Some((f, p)) => (f, p),
                None => (inner, "*"),
            };
            if field.is_empty() {
                return Err("empty variable name");
            }
            let pattern = pattern
                .split('/')
                .map(|p| parse_segment(p, false))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(Segment::Variable {
                field: field.to_string(),
                pattern,
            })
        }
        s if s.contains(['{', '}', '*']) => Err("invalid literal"),
        s => Ok(Segment::Literal(s.to_string())),
    }
}

// Returns the number of parts consumed by each segment, if the parts match.
fn match_segments(segments: &[Segment], parts: &[&str]) -> Option<Vec<usize>> {
    let Some((head, tail)) = segments.split_first() else {
        return parts.is_empty().then(Vec::new);
    };
    let prepend = |n: usize, mut rest: Vec<usize>| {
        rest.insert(0, n);
        rest
    };
    match head {
        Segment::Literal(l) => {
            let first = parts.first()?;
            if first != l {
                return None;
            }
            match_segments(tail, &parts[1..]).map(|r| prepend(1, r))
        }
        Segment::Single => {
            let first = parts.first()?;
            if first.is_empty() {
                return None;
            }
            match_segments(tail, &parts[1..]).map(|r| prepend(1, r))
        }
        Segment::Multi => (1..=parts.len()).rev().find_map(|n| {
            if parts[..n].iter().any(|p| p.is_empty()) {
                return None;
            }
            match_segments(tail, &parts[n..]).map(|r| prepend(n, r))
        }),
        // Variables are flattened before matching.
        Segment::Variable { .. } => None,
    }
}

fn render_pattern(pattern: &[Segment]) -> String {
    pattern
        .iter()
        .map(|s| match s {
            Segment::Literal(l) => l.as_str(),
            Segment::Single => "*",
            Segment::Multi => "**",
            Segment::Variable { .. } => "{}",
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const DATASET: &str = "projects/{project}/locations/{location}/datasets/{dataset}";

    fn lookup<'a>(values: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |field| {
            values
                .iter()
                .find(|(k, _)| *k == field)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn parse_http_template() -> anyhow::Result<()> {
        let t = PathTemplate::parse("/v1beta1/{name=projects/*/locations/*/operations/*}:cancel")?;
        assert_eq!(t.fields(), vec!["name"]);
        assert_eq!(t.verb.as_deref(), Some("cancel"));
        assert!(t.leading_slash);
        Ok(())
    }

    #[test_case(""; "empty")]
    #[test_case("/v1/{name"; "unbalanced open")]
    #[test_case("/v1/name}"; "unbalanced close")]
    #[test_case("/v1//x"; "empty segment")]
    #[test_case("/v1/{=projects/*}"; "empty field")]
    #[test_case("/v1/a:b:c"; "double verb")]
    #[test_case("/v1/pre{name}"; "partial variable")]
    fn parse_errors(input: &str) {
        let got = PathTemplate::parse(input);
        assert!(
            matches!(got, Err(PathTemplateError::Parse { .. })),
            "{got:?}"
        );
    }

    #[test]
    fn expand() -> anyhow::Result<()> {
        let t = PathTemplate::parse("/v1beta1/{name=projects/*/locations/*/datasets/*}")?;
        let got = t.expand(lookup(&[("name", "projects/p/locations/l/datasets/d")]))?;
        assert_eq!(got, "/v1beta1/projects/p/locations/l/datasets/d");

        let t = PathTemplate::parse("/v1beta1/{parent=projects/*/locations/*}/datasets")?;
        let got = t.expand(lookup(&[("parent", "projects/my project/locations/l")]))?;
        assert_eq!(got, "/v1beta1/projects/my%20project/locations/l/datasets");
        Ok(())
    }

    #[test]
    fn expand_multi_segment() -> anyhow::Result<()> {
        let t = PathTemplate::parse("/v1/{name=projects/*/**}:wait")?;
        let got = t.expand(lookup(&[("name", "projects/p/a/b/c")]))?;
        assert_eq!(got, "/v1/projects/p/a/b/c:wait");
        Ok(())
    }

    #[test]
    fn expand_errors() -> anyhow::Result<()> {
        let t = PathTemplate::parse("/v1beta1/{name=projects/*/locations/*}")?;
        let got = t.expand(lookup(&[]));
        assert_eq!(got, Err(PathTemplateError::MissingField("name".into())));

        let got = t.expand(lookup(&[("name", "projects/p")]));
        assert!(matches!(got, Err(PathTemplateError::Mismatch { .. })), "{got:?}");

        let got = t.expand(lookup(&[("name", "projects//locations/l")]));
        assert!(matches!(got, Err(PathTemplateError::Mismatch { .. })), "{got:?}");

        let t = PathTemplate::parse("/v1/*/x")?;
        let got = t.expand(lookup(&[]));
        assert_eq!(got, Err(PathTemplateError::UnboundWildcard));
        Ok(())
    }

    #[test]
    fn render_and_parse_resource() -> anyhow::Result<()> {
        let t = PathTemplate::parse(DATASET)?;
        let name = t.render(&[("project", "p"), ("location", "l"), ("dataset", "d")]);
        assert_eq!(name, "projects/p/locations/l/datasets/d");

        let got = t.parse_components(&name);
        let want = HashMap::from([
            ("project".to_string(), "p".to_string()),
            ("location".to_string(), "l".to_string()),
            ("dataset".to_string(), "d".to_string()),
        ]);
        assert_eq!(got, want);
        Ok(())
    }

    #[test_case("projects/p/locations/l"; "too short")]
    #[test_case("projects/p/locations/l/datasets/d/extra"; "too long")]
    #[test_case("projects/p/regions/l/datasets/d"; "wrong literal")]
    #[test_case("projects//locations/l/datasets/d"; "empty segment")]
    fn parse_mismatch(input: &str) -> anyhow::Result<()> {
        let t = PathTemplate::parse(DATASET)?;
        assert!(t.parse_components(input).is_empty());
        Ok(())
    }

    #[test]
    fn match_http_path() -> anyhow::Result<()> {
        let t = PathTemplate::parse("/ui/{name=projects/*/locations/*/operations/*}:cancel")?;
        let got = t.match_path("/ui/projects/p/locations/l/operations/o:cancel");
        assert_eq!(
            got,
            Some(vec![(
                "name".to_string(),
                "projects/p/locations/l/operations/o".to_string()
            )])
        );
        assert_eq!(t.match_path("/ui/projects/p/locations/l/operations/o"), None);
        assert_eq!(t.match_path("ui/projects/p/locations/l/operations/o:cancel"), None);
        Ok(())
    }

    #[test]
    fn match_multi() -> anyhow::Result<()> {
        let t = PathTemplate::parse("/v1/{name=projects/**}/tail")?;
        let got = t.match_path("/v1/projects/a/b/tail");
        assert_eq!(
            got,
            Some(vec![("name".to_string(), "projects/a/b".to_string())])
        );
        Ok(())
    }
}
