// File: src/conditional.rs
// Purpose: Boolean evaluation of `#if`/`#unless`/`#elseif` expressions

use once_cell::sync::Lazy;
use prepcook_parser::{ReserveWord, Rule};
use regex::Regex;
use serde_json::Value;

use crate::resolver::{normalize_expression, ExprFailure, Resolution, ScopePath};
use crate::value::{compare, is_truthy, Comparison};

static SINGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\.\./)*[A-Za-z0-9_\-\.]+$").unwrap());

static BINARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^("[^"]*"|'[^']*'|[A-Za-z0-9_\-\./]+)\s*(==|!=|>=|<=|>|<)\s*("[^"]*"|'[^']*'|[A-Za-z0-9_\-\./]+)$"#,
    )
    .unwrap()
});

/// Evaluate a conditional expression to `Value::Bool`.
///
/// A single token is true when it resolves to a truthy value. In a binary
/// comparison an unresolved side is compared as null. Any other shape fails.
pub fn eval_conditional(
    word: &ReserveWord,
    expression: &str,
    data: &Value,
    scope: &ScopePath,
) -> Resolution {
    if word.is_unconditional() {
        return Ok(Value::Bool(true));
    }

    let expression = expression.trim();
    if expression.is_empty() {
        return Err(ExprFailure::Empty);
    }

    if SINGLE.is_match(expression) {
        let value = normalize_expression(expression, data, scope);
        if let Err(failure) = &value {
            tracing::debug!("Conditional `{}` did not resolve: {}", expression, failure);
        }
        return Ok(Value::Bool(value.is_ok_and(|v| is_truthy(&v))));
    }

    let Some(caps) = BINARY.captures(expression) else {
        return Err(ExprFailure::Malformed(expression.to_string()));
    };
    let op = Comparison::parse(&caps[2])
        .ok_or_else(|| ExprFailure::Malformed(expression.to_string()))?;

    let left = operand(&caps[1], expression, data, scope);
    let right = operand(&caps[3], expression, data, scope);

    Ok(Value::Bool(compare(&left, op, &right)))
}

fn operand(side: &str, expression: &str, data: &Value, scope: &ScopePath) -> Value {
    normalize_expression(side, data, scope).unwrap_or_else(|failure| {
        tracing::warn!(
            "Operand `{}` in `{}` did not resolve ({}), comparing as null",
            side,
            expression,
            failure
        );
        Value::Null
    })
}

/// Apply the word's rule to its expression: does this branch render?
///
/// A failed expression reads as false before the rule is applied, so a
/// malformed `#unless` passes.
pub fn resolve_conditional(
    word: &ReserveWord,
    expression: &str,
    data: &Value,
    scope: &ScopePath,
) -> bool {
    let result = match eval_conditional(word, expression, data, scope) {
        Ok(value) => is_truthy(&value),
        Err(failure) => {
            tracing::warn!(
                "Conditional `{} {}` failed: {}",
                word.start,
                expression,
                failure
            );
            false
        }
    };

    match word.rule {
        Some(Rule::All) | None => result,
        Some(Rule::None) => !result,
    }
}
