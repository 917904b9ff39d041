//! # Path Templates
//!
//! Parser for the route template grammar:
//!
//! - segments are delimited by `/` and the template must start with `/`
//! - `{name}` is a string parameter, `{name:type rule(args)}` a typed one
//! - `{name:path}` (or the `*name` shorthand) is a greedy wildcard and may
//!   only appear as the last segment
//!
//! A segment is either fully static or exactly one parameter. Everything
//! else is rejected with `Error::InvalidPathTemplate`.

use crate::error::{Error, Result};
use crate::types::{Constraint, ParamTypes};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

/// One `/`-delimited unit of a parsed template
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Matched by exact string equality
    Static(String),
    /// Single-segment parameter with a constraint
    Param {
        /// Parameter name
        name: String,
        /// Type and rules
        constraint: Constraint,
    },
    /// Greedy remainder of the path
    Wildcard {
        /// Parameter name
        name: String,
    },
}

impl Segment {
    /// Parameter name, if this segment binds one
    #[must_use]
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Self::Static(_) => None,
            Self::Param { name, .. } | Self::Wildcard { name } => Some(name),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(s) => f.write_str(s),
            Self::Param { name, constraint } if constraint.is_typed() => {
                write!(f, "{{{name}:{constraint}}}")
            }
            Self::Param { name, .. } => write!(f, "{{{name}}}"),
            Self::Wildcard { name } => write!(f, "{{{name}:path}}"),
        }
    }
}

/// A parsed route template
#[derive(Debug, Clone)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template such as `/users/{id:uint}/files/{rest:path}`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPathTemplate` describing the first problem found.
    pub fn parse(template: &str, types: &ParamTypes) -> Result<Self> {
        if !template.starts_with('/') {
            return Err(Error::invalid_template(template, "must start with '/'"));
        }

        let body = template[1..].strip_suffix('/').unwrap_or(&template[1..]);
        let mut segments = Vec::new();
        let mut names = HashSet::new();

        if !body.is_empty() {
            let parts: Vec<&str> = body.split('/').collect();
            let last = parts.len() - 1;

            for (i, part) in parts.into_iter().enumerate() {
                let segment = parse_segment(template, part, types)?;
                if let Some(name) = segment.param_name() {
                    if !names.insert(name.to_string()) {
                        return Err(Error::invalid_template(
                            template,
                            format!("duplicate parameter name {name:?}"),
                        ));
                    }
                }
                if matches!(segment, Segment::Wildcard { .. }) && i != last {
                    return Err(Error::invalid_template(
                        template,
                        "a path wildcard must be the last segment",
                    ));
                }
                segments.push(segment);
            }
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    /// The template text as registered
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed segments; empty for the root `/`
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the template has no parameters at all
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, Segment::Static(_)))
    }

    /// Names of all bound parameters, in path order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::param_name)
    }

    /// Normalized form used for display (`/user/{id:uint}`)
    #[must_use]
    pub fn normalized(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        self.segments
            .iter()
            .fold(String::new(), |acc, s| format!("{acc}/{s}"))
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_segment(template: &str, part: &str, types: &ParamTypes) -> Result<Segment> {
    if part.is_empty() {
        return Err(Error::invalid_template(template, "empty path segment"));
    }

    if let Some(name) = part.strip_prefix('*') {
        check_name(template, name)?;
        return Ok(Segment::Wildcard {
            name: name.to_string(),
        });
    }

    if !part.starts_with('{') {
        if part.contains(['{', '}']) {
            return Err(Error::invalid_template(
                template,
                format!("segment {part:?} mixes static text and a parameter"),
            ));
        }
        return Ok(Segment::Static(part.to_string()));
    }

    let inner = part
        .strip_suffix('}')
        .map(|p| &p[1..])
        .ok_or_else(|| Error::invalid_template(template, format!("unclosed parameter {part:?}")))?;

    let (name, spec) = inner.split_once(':').unwrap_or((inner, ""));
    let name = name.trim();
    check_name(template, name)?;

    let constraint = Constraint::parse(spec, types).map_err(|reason| {
        Error::invalid_template(template, format!("parameter {name:?}: {reason}"))
    })?;

    if constraint.is_wildcard() {
        Ok(Segment::Wildcard {
            name: name.to_string(),
        })
    } else {
        Ok(Segment::Param {
            name: name.to_string(),
            constraint,
        })
    }
}

fn check_name(template: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::invalid_template(
            template,
            format!("invalid parameter name {name:?}"),
        ))
    }
}

/// Join a group prefix and a relative template
///
/// `("/api", "/users")` -> `/api/users`, `("/api", "/")` -> `/api`,
/// `("", "/")` -> `/`.
#[must_use]
pub fn join_path(prefix: &str, relative: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let relative = relative.trim_start_matches('/');

    match (prefix.is_empty(), relative.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{relative}"),
        (false, true) => ensure_leading_slash(prefix),
        (false, false) => format!("{}/{relative}", ensure_leading_slash(prefix)),
    }
}

fn ensure_leading_slash(s: &str) -> String {
    if s.starts_with('/') {
        s.to_string()
    } else {
        format!("/{s}")
    }
}

/// Collapse repeated slashes and drop a trailing slash from a request path
#[must_use]
pub fn correct_path(path: &str) -> Cow<'_, str> {
    let needs_fix = path.contains("//") || (path.len() > 1 && path.ends_with('/'));
    if !needs_fix {
        return Cow::Borrowed(path);
    }

    let mut out = String::with_capacity(path.len());
    for part in path.split('/').filter(|p| !p.is_empty()) {
        out.push('/');
        out.push_str(part);
    }
    if out.is_empty() {
        out.push('/');
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParamType;

    fn parse(t: &str) -> Result<PathTemplate> {
        PathTemplate::parse(t, &ParamTypes::new())
    }

    #[test]
    fn test_parse_root() {
        let t = parse("/").unwrap();
        assert!(t.segments().is_empty());
        assert!(t.is_static());
        assert_eq!(t.normalized(), "/");
    }

    #[test]
    fn test_parse_mixed_template() {
        let t = parse("/user/{id:uint}/files/{rest:path}").unwrap();
        assert_eq!(t.segments().len(), 4);
        assert_eq!(t.segments()[0], Segment::Static("user".into()));
        match &t.segments()[1] {
            Segment::Param { name, constraint } => {
                assert_eq!(name, "id");
                assert_eq!(constraint.param_type(), &ParamType::Uint);
            }
            other => panic!("unexpected segment {other:?}"),
        }
        assert_eq!(
            t.segments()[3],
            Segment::Wildcard {
                name: "rest".into()
            }
        );
        assert_eq!(t.param_names().collect::<Vec<_>>(), vec!["id", "rest"]);
    }

    #[test]
    fn test_untyped_param_is_string() {
        let t = parse("/user/{name}").unwrap();
        assert_eq!(t.normalized(), "/user/{name}");
        assert!(!t.is_static());
    }

    #[test]
    fn test_star_wildcard_shorthand() {
        let t = parse("/static/*file").unwrap();
        assert_eq!(
            t.segments()[1],
            Segment::Wildcard {
                name: "file".into()
            }
        );
    }

    #[test]
    fn test_trailing_slash_ignored() {
        assert_eq!(parse("/about/").unwrap().segments().len(), 1);
    }

    #[test]
    fn test_invalid_templates() {
        for bad in [
            "about",
            "/a//b",
            "/users/{id",
            "/users/id}",
            "/users/x{id}",
            "/users/{}",
            "/users/{1id}",
            "/users/{id}/{id}",
            "/files/{rest:path}/more",
            "/users/{id:nosuchtype}",
        ] {
            let err = parse(bad).unwrap_err();
            assert!(
                matches!(err, Error::InvalidPathTemplate { .. }),
                "{bad} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/api", "/users"), "/api/users");
        assert_eq!(join_path("/api/", "users"), "/api/users");
        assert_eq!(join_path("/api", "/"), "/api");
        assert_eq!(join_path("", "/"), "/");
        assert_eq!(join_path("/", "/home"), "/home");
    }

    #[test]
    fn test_correct_path() {
        assert_eq!(correct_path("/a/b"), "/a/b");
        assert_eq!(correct_path("//a///b/"), "/a/b");
        assert_eq!(correct_path("/"), "/");
        assert_eq!(correct_path("//"), "/");
    }
}
