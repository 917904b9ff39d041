//! # Segment Matcher
//!
//! Typed constraints for path parameters.
//!
//! A parameter segment is declared as `{name:type rule(args) ...}`. The type
//! decides how the raw segment is parsed into a [`ParamValue`]; rules narrow
//! the accepted values further (`min`, `max`, `range`, `regexp`, `prefix`,
//! `suffix`). Everything here is pure: the trie calls [`Constraint::check`]
//! per candidate branch and treats a [`Error::ConstraintViolation`] as "try
//! the next branch".

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Predicate used by custom parameter types
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A user-registered parameter type (e.g. `{slug:slug}`)
#[derive(Clone)]
pub struct CustomType {
    name: Arc<str>,
    predicate: Predicate,
}

impl CustomType {
    /// Name used in templates
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomType").field("name", &self.name).finish()
    }
}

/// Supported path parameter types
///
/// Default is `String`, which accepts any single non-empty segment.
#[derive(Debug, Clone, Default)]
pub enum ParamType {
    /// Any non-empty segment
    #[default]
    String,
    /// Signed base-10 integer (`i64`)
    Int,
    /// Unsigned base-10 integer (`u64`)
    Uint,
    /// `true`/`false`/`1`/`0`/`t`/`f`
    Bool,
    /// ASCII letters only
    Alphabetical,
    /// File-name characters: letters, digits, `_`, `-`, `.`
    File,
    /// RFC 4122 UUID
    Uuid,
    /// Greedy remainder of the path; only valid as the last segment
    Path,
    /// Named predicate registered through [`ParamTypes`]
    Custom(CustomType),
}

impl ParamType {
    /// Resolve a type specifier (`"uint"` in `{id:uint}`)
    ///
    /// Built-in names always win over custom registrations.
    #[must_use]
    pub fn from_specifier(s: &str, custom: &ParamTypes) -> Option<Self> {
        let builtin = match s.to_ascii_lowercase().as_str() {
            "string" | "str" => Self::String,
            "int" | "integer" | "int64" | "long" | "number" => Self::Int,
            "uint" | "uint64" | "unsigned" => Self::Uint,
            "bool" | "boolean" => Self::Bool,
            "alphabetical" | "alpha" => Self::Alphabetical,
            "file" => Self::File,
            "uuid" | "uuidv4" => Self::Uuid,
            "path" => Self::Path,
            _ => return custom.get(s).cloned().map(Self::Custom),
        };
        Some(builtin)
    }

    /// Get the type name for error messages and normalized sources
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Bool => "bool",
            Self::Alphabetical => "alphabetical",
            Self::File => "file",
            Self::Uuid => "uuid",
            Self::Path => "path",
            Self::Custom(c) => c.name(),
        }
    }

    /// Whether the type captures the rest of the path
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Path)
    }

    /// Parse a raw segment into a typed value
    ///
    /// # Errors
    ///
    /// Returns `Error::ConstraintViolation` if the segment is not a valid
    /// value of this type.
    pub fn parse_value(&self, raw: &str) -> Result<ParamValue> {
        let violation = || Error::ConstraintViolation {
            value: raw.to_string(),
            constraint: self.type_name().to_string(),
        };

        // Only `path` may capture the empty remainder (e.g. `/files/`).
        if raw.is_empty() && !self.is_wildcard() {
            return Err(violation());
        }

        match self {
            Self::String => Ok(ParamValue::String(raw.to_string())),
            Self::Int => raw.parse::<i64>().map(ParamValue::Int).map_err(|_| violation()),
            Self::Uint => {
                // `u64::from_str` accepts a leading '+', which is not a uint literal.
                if !raw.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(violation());
                }
                raw.parse::<u64>().map(ParamValue::Uint).map_err(|_| violation())
            }
            Self::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "t" => Ok(ParamValue::Bool(true)),
                "false" | "0" | "f" => Ok(ParamValue::Bool(false)),
                _ => Err(violation()),
            },
            Self::Alphabetical => {
                if raw.bytes().all(|b| b.is_ascii_alphabetic()) {
                    Ok(ParamValue::String(raw.to_string()))
                } else {
                    Err(violation())
                }
            }
            Self::File => {
                if raw
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
                {
                    Ok(ParamValue::String(raw.to_string()))
                } else {
                    Err(violation())
                }
            }
            Self::Uuid => Uuid::parse_str(raw).map(ParamValue::Uuid).map_err(|_| violation()),
            Self::Path => Ok(ParamValue::Path(raw.to_string())),
            Self::Custom(c) => {
                if (c.predicate)(raw) {
                    Ok(ParamValue::String(raw.to_string()))
                } else {
                    Err(violation())
                }
            }
        }
    }
}

impl PartialEq for ParamType {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name()
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Registry of custom parameter types
///
/// Custom types must be registered before the templates that use them.
#[derive(Debug, Clone, Default)]
pub struct ParamTypes {
    custom: HashMap<String, CustomType>,
}

impl ParamTypes {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named predicate usable as `{name:<type_name>}`
    ///
    /// Registering under a built-in name has no effect on templates.
    pub fn register<F>(&mut self, type_name: impl Into<String>, predicate: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        if ParamType::from_specifier(&type_name, &Self::default()).is_some() {
            warn!(type_name = %type_name, "Custom parameter type shadows a built-in type and will be ignored");
        }
        let custom = CustomType {
            name: Arc::from(type_name.as_str()),
            predicate: Arc::new(predicate),
        };
        self.custom.insert(type_name, custom);
    }

    /// Look up a custom type by name
    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&CustomType> {
        self.custom.get(type_name)
    }
}

/// Converted parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// String value (string, alphabetical, file, custom types)
    String(String),
    /// Signed integer value
    Int(i64),
    /// Unsigned integer value
    Uint(u64),
    /// Boolean value
    Bool(bool),
    /// UUID value
    Uuid(Uuid),
    /// Remainder of the path captured by a wildcard
    Path(String),
}

impl ParamValue {
    /// Borrow the value as text for string-like variants
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Path(s) => Some(s),
            _ => None,
        }
    }

    /// Get as i64 if Int variant
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as u64 if Uint variant
    #[must_use]
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(u) => Some(*u),
            _ => None,
        }
    }

    /// Get as bool if Bool variant
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as UUID if Uuid variant
    #[must_use]
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(u) => Some(*u),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::Path(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Uint(u) => write!(f, "{u}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Uuid(u) => write!(f, "{u}"),
        }
    }
}

/// Extra check applied after the type parse
#[derive(Debug, Clone)]
pub enum Rule {
    /// Numeric value (or string length) must be >= n
    Min(i64),
    /// Numeric value (or string length) must be <= n
    Max(i64),
    /// Numeric value (or string length) must be within [a, b]
    Range(i64, i64),
    /// Whole segment must match the expression
    Regexp(Regex),
    /// Segment must start with the text
    Prefix(String),
    /// Segment must end with the text
    Suffix(String),
}

impl Rule {
    fn parse(name: &str, args: &str, param_type: &ParamType) -> std::result::Result<Self, String> {
        let int_arg = |s: &str| {
            s.trim()
                .parse::<i64>()
                .map_err(|_| format!("{name}() expects an integer argument, got {s:?}"))
        };
        let sized = !matches!(param_type, ParamType::Bool | ParamType::Uuid);

        let rule = match name {
            "min" if sized => Self::Min(int_arg(args)?),
            "max" if sized => Self::Max(int_arg(args)?),
            "range" if sized => {
                let (lo, hi) = args
                    .split_once(',')
                    .ok_or_else(|| "range() expects two arguments".to_string())?;
                let (lo, hi) = (int_arg(lo)?, int_arg(hi)?);
                if lo > hi {
                    return Err(format!("range({lo}, {hi}) is empty"));
                }
                Self::Range(lo, hi)
            }
            "regexp" => {
                let anchored = format!("^(?:{args})$");
                Self::Regexp(Regex::new(&anchored).map_err(|e| format!("bad regexp: {e}"))?)
            }
            "prefix" => Self::Prefix(args.to_string()),
            "suffix" => Self::Suffix(args.to_string()),
            "min" | "max" | "range" => {
                return Err(format!("{name}() is not applicable to type {param_type}"))
            }
            other => return Err(format!("unknown rule function {other:?}")),
        };
        Ok(rule)
    }

    fn check(&self, raw: &str, value: &ParamValue) -> bool {
        let measure = || -> i128 {
            match value {
                ParamValue::Int(i) => i128::from(*i),
                ParamValue::Uint(u) => i128::from(*u),
                _ => raw.chars().count() as i128,
            }
        };
        match self {
            Self::Min(n) => measure() >= i128::from(*n),
            Self::Max(n) => measure() <= i128::from(*n),
            Self::Range(lo, hi) => (i128::from(*lo)..=i128::from(*hi)).contains(&measure()),
            Self::Regexp(re) => re.is_match(raw),
            Self::Prefix(p) => raw.starts_with(p.as_str()),
            Self::Suffix(s) => raw.ends_with(s.as_str()),
        }
    }
}

/// A parameter type plus its rules
///
/// Two constraints are equivalent when their normalized sources are equal,
/// which is what the trie uses to share parameter nodes.
#[derive(Debug, Clone, Default)]
pub struct Constraint {
    param_type: ParamType,
    rules: Vec<Rule>,
    source: String,
}

impl Constraint {
    /// The default `string` constraint
    #[must_use]
    pub fn string() -> Self {
        Self {
            param_type: ParamType::String,
            rules: Vec::new(),
            source: "string".to_string(),
        }
    }

    /// Parse the part after `:` in `{name:spec}`
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason; the template parser wraps it into
    /// `Error::InvalidPathTemplate`.
    pub fn parse(spec: &str, custom: &ParamTypes) -> std::result::Result<Self, String> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Ok(Self::string());
        }

        let type_end = spec
            .find(|c: char| c.is_whitespace() || c == '(')
            .unwrap_or(spec.len());
        let type_name = &spec[..type_end];
        if spec[type_end..].starts_with('(') {
            return Err(format!("expected a type name before {type_name}()"));
        }
        let param_type = ParamType::from_specifier(type_name, custom)
            .ok_or_else(|| format!("unknown parameter type {type_name:?}"))?;

        let mut rules = Vec::new();
        let mut source = param_type.type_name().to_string();
        let mut rest = spec[type_end..].trim_start();

        while !rest.is_empty() {
            let open = rest
                .find('(')
                .ok_or_else(|| format!("expected rule(args), found {rest:?}"))?;
            let name = rest[..open].trim();
            if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
                return Err(format!("invalid rule name {name:?}"));
            }
            let close = matching_paren(rest, open)
                .ok_or_else(|| format!("unbalanced parentheses in {name}()"))?;
            let args = rest[open + 1..close].trim();

            if param_type.is_wildcard() {
                return Err("the path type does not accept rules".to_string());
            }
            rules.push(Rule::parse(name, args, &param_type)?);
            source.push_str(&format!(" {name}({args})"));
            rest = rest[close + 1..].trim_start();
        }

        Ok(Self {
            param_type,
            rules,
            source,
        })
    }

    /// The parameter type
    #[must_use]
    pub fn param_type(&self) -> &ParamType {
        &self.param_type
    }

    /// Normalized source text, e.g. `uint min(1)`
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether this constraint captures the rest of the path
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.param_type.is_wildcard()
    }

    /// Whether the constraint is a typed one (anything but plain `string`)
    #[must_use]
    pub fn is_typed(&self) -> bool {
        !matches!(self.param_type, ParamType::String) || !self.rules.is_empty()
    }

    /// Validate a raw segment and produce its typed value
    ///
    /// # Errors
    ///
    /// Returns `Error::ConstraintViolation` when the type parse or any rule
    /// fails.
    pub fn check(&self, raw: &str) -> Result<ParamValue> {
        let value = self.param_type.parse_value(raw)?;
        if self.rules.iter().all(|rule| rule.check(raw, &value)) {
            Ok(value)
        } else {
            Err(Error::ConstraintViolation {
                value: raw.to_string(),
                constraint: self.source.clone(),
            })
        }
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Index of the `)` closing the `(` at `open`
fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in s.char_indices().skip_while(|(i, _)| *i < open) {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
