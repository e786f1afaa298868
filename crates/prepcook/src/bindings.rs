// File: src/bindings.rs
// Purpose: Template and asset bindings stored under the reserved data namespace
//
// Layout inside the data context (namespace defaults to `_prepcook`):
//
//   { "_prepcook": {
//       "templates": { "<name>": { "template": "...", "vars": { ... } } },
//       "assets": { "css": { "<name>": { "path": "..." } },
//                   "js":  { "<name>": { "path": "..." } } } } }

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A named sub-template and its optional isolated variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateBinding {
    pub template: String,

    /// When present, the sub-template renders against these instead of the caller's data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vars: Option<Value>,
}

impl TemplateBinding {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            vars: None,
        }
    }

    pub fn with_vars(mut self, vars: Value) -> Self {
        self.vars = Some(vars);
        self
    }
}

/// Asset kinds accepted by `#include`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Css,
    Js,
}

impl AssetKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "css" => Some(Self::Css),
            "js" => Some(Self::Js),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
        }
    }

    /// Markup that pulls in the asset at `path`
    pub fn markup(&self, path: &str) -> String {
        match self {
            Self::Css => format!("<link rel=\"stylesheet\" type=\"text/css\" href=\"{}\">", path),
            Self::Js => format!("<script type=\"text/javascript\" src=\"{}\"></script>", path),
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of the bindings namespace in one data context
#[derive(Debug, Clone, Copy)]
pub struct Bindings<'a> {
    store: Option<&'a Value>,
}

impl<'a> Bindings<'a> {
    /// Bindings found under `namespace` in `data`, if any
    pub fn of(data: &'a Value, namespace: &str) -> Self {
        Self {
            store: data.get(namespace).filter(|v| v.is_object()),
        }
    }

    /// The raw namespace object
    pub fn store(&self) -> Option<&'a Value> {
        self.store
    }

    /// A template bound by name. Malformed entries are treated as unbound.
    pub fn template(&self, name: &str) -> Option<TemplateBinding> {
        let entry = self.store?.get("templates")?.get(name)?;
        match TemplateBinding::deserialize(entry) {
            Ok(binding) => Some(binding),
            Err(e) => {
                tracing::warn!("Template binding `{}` is malformed: {}", name, e);
                None
            }
        }
    }

    /// Path of an asset bound by kind and name
    pub fn asset(&self, kind: AssetKind, name: &str) -> Option<&'a str> {
        self.store?
            .get("assets")?
            .get(kind.as_str())?
            .get(name)?
            .get("path")?
            .as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> Value {
        json!({
            "_prepcook": {
                "templates": {
                    "header": {"template": "<h1>[title]</h1>"},
                    "card": {"template": "[name]", "vars": {"name": "x"}},
                    "broken": {"body": "no template key"}
                },
                "assets": {
                    "css": {"main": {"path": "/css/main.css"}},
                    "js": {"app": {"path": "/js/app.js"}}
                }
            }
        })
    }

    #[test]
    fn test_template_lookup() {
        let data = data();
        let bindings = Bindings::of(&data, "_prepcook");
        assert_eq!(bindings.template("header"), Some(TemplateBinding::new("<h1>[title]</h1>")));
        assert_eq!(
            bindings.template("card"),
            Some(TemplateBinding::new("[name]").with_vars(json!({"name": "x"})))
        );
        assert_eq!(bindings.template("broken"), None);
        assert_eq!(bindings.template("footer"), None);
    }

    #[test]
    fn test_asset_lookup() {
        let data = data();
        let bindings = Bindings::of(&data, "_prepcook");
        assert_eq!(bindings.asset(AssetKind::Css, "main"), Some("/css/main.css"));
        assert_eq!(bindings.asset(AssetKind::Js, "app"), Some("/js/app.js"));
        assert_eq!(bindings.asset(AssetKind::Js, "main"), None);
    }

    #[test]
    fn test_missing_namespace() {
        let data = json!({"title": "x"});
        let bindings = Bindings::of(&data, "_prepcook");
        assert!(bindings.store().is_none());
        assert_eq!(bindings.template("header"), None);
    }

    #[test]
    fn test_asset_markup() {
        assert_eq!(
            AssetKind::Css.markup("/a.css"),
            "<link rel=\"stylesheet\" type=\"text/css\" href=\"/a.css\">"
        );
        assert_eq!(
            AssetKind::Js.markup("/a.js"),
            "<script type=\"text/javascript\" src=\"/a.js\"></script>"
        );
        assert_eq!(AssetKind::parse("img"), None);
    }
}
