//! Bracketed value expressions: `[path]`, `[path|filter:arg]`, `[path|int]`.
//!
//! Literal text around the brackets is trimmed and kept; each bracket body is
//! resolved against the data context and written in its place.

use prepcook_parser::{next_segment, ParseError};
use serde_json::Value;

use crate::error::{RenderError, Result};
use crate::filter::FilterRegistry;
use crate::resolver::{normalize_expression, quoted, ExprFailure, Resolution, ScopePath};
use crate::value::to_output;

/// Stage names that only require the value to resolve
const TYPE_ASSERTIONS: &[&str] = &["int", "text", "array", "list", "string"];

/// Evaluates expression text found inside a tag
pub struct Tokenizer<'a> {
    filters: &'a FilterRegistry,
    open: &'a str,
    close: &'a str,
}

impl<'a> Tokenizer<'a> {
    pub fn new(filters: &'a FilterRegistry) -> Self {
        Self::with_delimiters(filters, "[", "]")
    }

    pub fn with_delimiters(filters: &'a FilterRegistry, open: &'a str, close: &'a str) -> Self {
        Self {
            filters,
            open,
            close,
        }
    }

    /// Replace every bracket expression in `text` with its rendered value.
    ///
    /// A failed expression renders as nothing. Empty delimiters are rejected.
    pub fn parse(&self, text: &str, data: &Value, scope: &ScopePath) -> Result<String> {
        if self.open.is_empty() || self.close.is_empty() {
            return Err(ParseError::EmptyDelimiter.into());
        }

        let mut out = String::new();
        let mut rest = text;

        while !rest.is_empty() {
            let seg = next_segment(rest, self.open, self.close);
            out.push_str(seg.left.trim());

            if seg.found {
                match self.eval_command_block(seg.segment, data, scope)? {
                    Ok(value) => out.push_str(&to_output(&value)),
                    Err(failure) => {
                        tracing::warn!("Expression `{}` failed: {}", seg.segment.trim(), failure)
                    }
                }
            }

            if seg.is_terminal() {
                break;
            }
            rest = seg.right;
        }

        Ok(out)
    }

    /// Evaluate one bracket body.
    ///
    /// The outer error is fatal (a failed type assertion); the inner
    /// [`Resolution`] carries ordinary expression failures.
    pub fn eval_command_block(
        &self,
        inner: &str,
        data: &Value,
        scope: &ScopePath,
    ) -> Result<Resolution> {
        let stages = split_stages(inner);
        if stages.len() > 2 {
            return Ok(Err(ExprFailure::ChainedFilter(inner.trim().to_string())));
        }

        let value = normalize_expression(stages[0], data, scope);
        let Some(stage) = stages.get(1).map(|s| s.trim()) else {
            return Ok(value);
        };

        if TYPE_ASSERTIONS.contains(&stage) {
            return value.map(Ok).map_err(|source| RenderError::TypeAssertion {
                expression: stages[0].trim().to_string(),
                assertion: stage.to_string(),
                source,
            });
        }

        let mut parts = stage.split(':');
        let name = parts.next().unwrap_or_default().trim();
        let args: Vec<&str> = parts
            .map(|arg| {
                let arg = arg.trim();
                quoted(arg).unwrap_or(arg)
            })
            .collect();

        Ok(value.map(|v| self.filters.apply(name, &v, &args)))
    }
}

/// Split on `|` outside quoted literals.
///
/// Only stage splitting is quote-aware. The closing `]` and tag keywords are
/// found by plain substring search, so a quoted literal cannot contain the
/// expression close delimiter or a `/keyword` closing tag.
fn split_stages(inner: &str) -> Vec<&str> {
    let mut stages = Vec::new();
    let mut quote = None;
    let mut start = 0;

    for (i, ch) in inner.char_indices() {
        match (quote, ch) {
            (None, '"' | '\'') => quote = Some(ch),
            (Some(q), c) if c == q => quote = None,
            (None, '|') => {
                stages.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    stages.push(&inner[start..]);
    stages
}
