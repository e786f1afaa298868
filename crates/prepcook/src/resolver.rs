//! Scope-relative resolution of literals and dotted variable paths.
//!
//! Resolution never raises: anything that cannot produce a value yields an
//! [`ExprFailure`] describing why, which callers treat as the failure marker.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::value::is_scalar;

/// Why an expression did not produce a value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprFailure {
    #[error("empty expression")]
    Empty,

    #[error("malformed expression `{0}`")]
    Malformed(String),

    #[error("scope `{0}` does not resolve")]
    Scope(String),

    #[error("`{offset}` levels up from `{scope}` climbs above the root scope")]
    AboveRoot { offset: usize, scope: String },

    #[error("`{path}` has no segment `{segment}`")]
    MissingSegment { path: String, segment: String },

    #[error("`.` refers to the non-scalar scope `{0}`")]
    NonScalarScope(String),

    #[error("chained filters are not supported in `{0}`")]
    ChainedFilter(String),
}

/// Outcome of resolving an expression
pub type Resolution = Result<Value, ExprFailure>;

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?(\d+(\.\d*)?|\.\d+)$").unwrap());

/// Dot-separated location of the current object inside the data context
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScopePath {
    segments: Vec<String>,
}

impl ScopePath {
    /// The root scope (the data context itself)
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse `a.b.0`; empty segments are ignored
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Drop `offset` trailing segments, or `None` if that climbs above the root
    pub fn ancestor(&self, offset: usize) -> Option<Self> {
        let keep = self.segments.len().checked_sub(offset)?;
        Some(Self {
            segments: self.segments[..keep].to_vec(),
        })
    }

    /// Scope of one loop pass: `<scope>.<name>.<index>`.
    ///
    /// `name` may carry leading `../` operators and dots.
    pub fn descend(&self, name: &str, index: usize) -> Option<Self> {
        let (path, offset) = resolve_expression_operators(name.trim());
        let mut scope = self.ancestor(offset)?;
        scope
            .segments
            .extend(path.split('.').filter(|s| !s.is_empty()).map(str::to_string));
        scope.segments.push(index.to_string());
        Some(scope)
    }

    /// The value this scope points at
    pub fn resolve<'v>(&self, data: &'v Value) -> Option<&'v Value> {
        lookup_segments(data, self.segments.iter().map(String::as_str))
    }
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl From<&str> for ScopePath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

fn lookup_segments<'v, 's>(
    data: &'v Value,
    segments: impl IntoIterator<Item = &'s str>,
) -> Option<&'v Value> {
    segments.into_iter().try_fold(data, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Strip leading `../` groups, returning the cleaned path and the group count
pub fn resolve_expression_operators(exp: &str) -> (&str, usize) {
    let mut path = exp;
    let mut offset = 0;
    while let Some(rest) = path.strip_prefix("../") {
        path = rest;
        offset += 1;
    }
    (path, offset)
}

/// Resolve a dotted variable path relative to `scope`, borrowing from `data`
pub fn resolve_ref<'v>(
    data: &'v Value,
    scope: &ScopePath,
    exp: &str,
) -> Result<&'v Value, ExprFailure> {
    let exp = exp.trim();
    let (path, offset) = resolve_expression_operators(exp);

    let base = scope.ancestor(offset).ok_or_else(|| ExprFailure::AboveRoot {
        offset,
        scope: scope.to_string(),
    })?;
    let mut current = base
        .resolve(data)
        .ok_or_else(|| ExprFailure::Scope(base.to_string()))?;

    if path.is_empty() {
        return Err(ExprFailure::Malformed(exp.to_string()));
    }

    for segment in path.split('.') {
        if segment.is_empty() {
            return Err(ExprFailure::Malformed(exp.to_string()));
        }
        current = lookup_segments(current, [segment]).ok_or_else(|| {
            ExprFailure::MissingSegment {
                path: exp.to_string(),
                segment: segment.to_string(),
            }
        })?;
    }

    Ok(current)
}

/// Resolve a dotted variable path relative to `scope`
pub fn resolve_var_path(data: &Value, scope: &ScopePath, exp: &str) -> Resolution {
    resolve_ref(data, scope, exp).cloned()
}

/// Turn one operand into a value.
///
/// Recognizes `true`/`false`, numeric literals, quoted strings and the scope
/// token `.`; anything else resolves as a variable path.
pub fn normalize_expression(exp: &str, data: &Value, scope: &ScopePath) -> Resolution {
    let exp = exp.trim();

    match exp {
        "" => Err(ExprFailure::Empty),
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        "." => match scope.resolve(data) {
            Some(value) if is_scalar(value) => Ok(value.clone()),
            Some(_) => Err(ExprFailure::NonScalarScope(scope.to_string())),
            None => Err(ExprFailure::Scope(scope.to_string())),
        },
        _ if NUMBER.is_match(exp) => parse_number(exp),
        _ => match quoted(exp) {
            Some(literal) => Ok(Value::String(literal.to_string())),
            None => resolve_var_path(data, scope, exp),
        },
    }
}

fn parse_number(exp: &str) -> Resolution {
    if !exp.contains('.') {
        if let Ok(n) = exp.parse::<i64>() {
            return Ok(Value::from(n));
        }
    }
    exp.parse::<f64>()
        .map(Value::from)
        .map_err(|_| ExprFailure::Malformed(exp.to_string()))
}

/// Content between matching outer quotes, if `exp` is a quoted literal
pub(crate) fn quoted(exp: &str) -> Option<&str> {
    let quote = exp.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    (exp.len() >= 2 && exp.ends_with(quote)).then(|| &exp[1..exp.len() - 1])
}
