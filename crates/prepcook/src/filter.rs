//! Value-formatting filters applied by `[value|name:arg:arg]` expressions.
//!
//! A [`FilterRegistry`] maps filter names to functions. The defaults are
//! `lowercase`, `uppercase`, `json`, `currency` and `date`; callers can
//! register their own. A filter that cannot handle its input returns it unchanged.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{self, Write};
use std::sync::Arc;

/// A filter: `fn(value, args) -> value`
pub type FilterFn = Arc<dyn Fn(&Value, &[&str]) -> Value + Send + Sync>;

/// Name-to-filter table shared by every render of an engine
#[derive(Clone)]
pub struct FilterRegistry {
    filters: HashMap<String, FilterFn>,
}

impl FilterRegistry {
    /// Registry with the built-in filters
    pub fn new() -> Self {
        Self::empty()
            .with("lowercase", lowercase)
            .with("uppercase", uppercase)
            .with("json", json)
            .with("currency", currency)
            .with("date", date)
    }

    /// Registry with no filters at all
    pub fn empty() -> Self {
        Self {
            filters: HashMap::new(),
        }
    }

    /// Builder form of [`register`](Self::register)
    pub fn with<F>(mut self, name: impl Into<String>, filter: F) -> Self
    where
        F: Fn(&Value, &[&str]) -> Value + Send + Sync + 'static,
    {
        self.register(name, filter);
        self
    }

    /// Add or replace a filter
    pub fn register<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(&Value, &[&str]) -> Value + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Arc::new(filter));
    }

    pub fn get(&self, name: &str) -> Option<&FilterFn> {
        self.filters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Apply the named filter; unknown names leave the value unchanged
    pub fn apply(&self, name: &str, value: &Value, args: &[&str]) -> Value {
        match self.filters.get(name) {
            Some(filter) => filter(value, args),
            None => {
                tracing::warn!("Unknown filter `{}`, value left unchanged", name);
                value.clone()
            }
        }
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}

fn lowercase(value: &Value, _args: &[&str]) -> Value {
    match value {
        Value::String(s) => Value::String(s.to_lowercase()),
        other => {
            tracing::warn!("lowercase expects a string, {} given", crate::value::type_name(other));
            other.clone()
        }
    }
}

fn uppercase(value: &Value, _args: &[&str]) -> Value {
    match value {
        Value::String(s) => Value::String(s.to_uppercase()),
        other => {
            tracing::warn!("uppercase expects a string, {} given", crate::value::type_name(other));
            other.clone()
        }
    }
}

fn json(value: &Value, _args: &[&str]) -> Value {
    Value::String(value.to_string())
}

/// Format a number as currency: `[price|currency:USD]` -> `$1,234.50`
fn currency(value: &Value, args: &[&str]) -> Value {
    let code = args.first().map(|s| s.trim()).unwrap_or("USD");
    let symbol = match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "INR" => "₹",
        "CNY" => "CN¥",
        _ => {
            tracing::warn!("{} is not a recognized currency format", code);
            return value.clone();
        }
    };

    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let Some(amount) = amount.filter(|a| a.is_finite()) else {
        return value.clone();
    };

    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };

    Value::String(format!("{sign}{symbol}{}.{cents}", group_thousands(whole)))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Reformat a date string: `[when|date:%d/%m/%Y]`.
///
/// Arguments are rejoined with `:` so time formats such as `%H:%M` survive.
fn date(value: &Value, args: &[&str]) -> Value {
    let Value::String(raw) = value else {
        tracing::warn!("date expects a string, {} given", crate::value::type_name(value));
        return value.clone();
    };
    let format = if args.is_empty() {
        "%Y-%m-%d".to_string()
    } else {
        args.join(":")
    };

    let mut out = String::new();
    let written = if let Ok(dt) = DateTime::parse_from_rfc3339(raw.trim()) {
        write!(out, "{}", dt.format(&format))
    } else if let Ok(day) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        write!(out, "{}", day.format(&format))
    } else {
        tracing::warn!("Could not parse `{}` as a date", raw);
        return value.clone();
    };

    match written {
        Ok(()) => Value::String(out),
        Err(_) => {
            tracing::warn!("Invalid date format `{}`", format);
            value.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_case_filters() {
        let filters = FilterRegistry::new();
        assert_eq!(filters.apply("lowercase", &json!("Hello World"), &[]), json!("hello world"));
        assert_eq!(filters.apply("uppercase", &json!("Hello"), &[]), json!("HELLO"));
        assert_eq!(filters.apply("uppercase", &json!(5), &[]), json!(5));
    }

    #[test]
    fn test_json_filter() {
        let filters = FilterRegistry::new();
        assert_eq!(
            filters.apply("json", &json!({"a": [1, 2]}), &[]),
            json!("{\"a\":[1,2]}")
        );
    }

    #[rstest]
    #[case(json!(1234.5), "USD", json!("$1,234.50"))]
    #[case(json!(1234567), "EUR", json!("€1,234,567.00"))]
    #[case(json!(-12.5), "GBP", json!("-£12.50"))]
    #[case(json!(0), "JPY", json!("¥0.00"))]
    #[case(json!("99.9"), "INR", json!("₹99.90"))]
    #[case(json!(10), "XYZ", json!(10))]
    #[case(json!("abc"), "USD", json!("abc"))]
    fn test_currency(#[case] input: Value, #[case] code: &str, #[case] expected: Value) {
        assert_eq!(FilterRegistry::new().apply("currency", &input, &[code]), expected);
    }

    #[test]
    fn test_date_filter() {
        let filters = FilterRegistry::new();
        assert_eq!(
            filters.apply("date", &json!("2024-03-05"), &["%d/%m/%Y"]),
            json!("05/03/2024")
        );
        assert_eq!(
            filters.apply("date", &json!("2024-03-05T14:30:00Z"), &["%H", "%M"]),
            json!("14:30")
        );
        assert_eq!(filters.apply("date", &json!("2024-03-05T14:30:00Z"), &[]), json!("2024-03-05"));
        assert_eq!(filters.apply("date", &json!("yesterday"), &[]), json!("yesterday"));
    }

    #[test]
    fn test_unknown_filter_is_identity() {
        let filters = FilterRegistry::new();
        assert_eq!(filters.apply("shout", &json!("x"), &[]), json!("x"));
    }

    #[test]
    fn test_register_custom_filter() {
        let filters = FilterRegistry::empty().with("repeat", |value: &Value, args: &[&str]| {
            let times = args.first().and_then(|n| n.parse().ok()).unwrap_or(1);
            Value::String(crate::value::to_output(value).repeat(times))
        });
        assert_eq!(filters.names(), vec!["repeat"]);
        assert!(!filters.contains("lowercase"));
        assert_eq!(filters.apply("repeat", &json!("ab"), &["3"]), json!("ababab"));
    }
}
