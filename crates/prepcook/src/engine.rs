// File: src/engine.rs
// Purpose: Render engine holding configuration, filters and the template loader

use prepcook_parser::{ParseError, ParseTree, Parser};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::filter::FilterRegistry;
use crate::loader::TemplateLoader;
use crate::resolver::ScopePath;

/// Template render engine
///
/// Cheap to clone; filters and the loader are shared. Each render builds a
/// fresh parse tree, nothing is cached between renders.
#[derive(Clone)]
pub struct Prepcook {
    config: Config,
    filters: Arc<FilterRegistry>,
    loader: Option<Arc<dyn TemplateLoader>>,
}

impl Prepcook {
    /// Engine with default configuration and the built-in filters
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            filters: Arc::new(FilterRegistry::new()),
            loader: None,
        }
    }

    /// Replace the filter registry
    pub fn with_filters(mut self, filters: FilterRegistry) -> Self {
        self.filters = Arc::new(filters);
        self
    }

    /// Loader consulted for `#template` names missing from the data context
    pub fn with_loader<L>(mut self, loader: L) -> Self
    where
        L: TemplateLoader + 'static,
    {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Share an existing loader between engines
    pub fn with_shared_loader(mut self, loader: Arc<dyn TemplateLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    pub fn loader(&self) -> Option<&dyn TemplateLoader> {
        self.loader.as_deref()
    }

    /// Tree builder using the configured tag delimiters
    pub fn parser(&self) -> Parser {
        Parser::with_delimiters(&self.config.syntax.tag_open, &self.config.syntax.tag_close)
    }

    pub fn parse(&self, template: &str) -> std::result::Result<ParseTree, ParseError> {
        self.parser().parse(template)
    }

    /// Render `template` against `data` at the root scope
    pub async fn render(&self, data: &Value, template: &str) -> Result<String> {
        self.render_at(data, template, &ScopePath::root()).await
    }

    /// Render `template` with names resolved relative to `scope`
    pub async fn render_at(&self, data: &Value, template: &str, scope: &ScopePath) -> Result<String> {
        tracing::debug!(
            "Rendering template ({} bytes) at scope `{}`",
            template.len(),
            scope
        );

        Evaluator::new(self)
            .render_template(template, data, scope)
            .await
    }
}

impl Default for Prepcook {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Prepcook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prepcook")
            .field("config", &self.config)
            .field("filters", &self.filters)
            .field("loader", &self.loader.as_ref().map(|l| l.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::TemplateBinding;
    use crate::loader::MemoryLoader;
    use serde_json::json;

    #[tokio::test]
    async fn test_render_with_custom_syntax() {
        let mut config = Config::default();
        config.syntax.tag_open = "<%".to_string();
        config.syntax.tag_close = "%>".to_string();
        config.syntax.expression_open = "${".to_string();
        config.syntax.expression_close = "}".to_string();

        let engine = Prepcook::with_config(config);
        let out = engine
            .render(&json!({"name": "Ada"}), "<p><% #if name %><% ${name} %><% /if %></p>")
            .await
            .unwrap();
        assert_eq!(out, "<p>Ada</p>");
    }

    #[tokio::test]
    async fn test_render_at_scope() {
        let engine = Prepcook::new();
        let data = json!({"user": {"name": "Ada"}, "site": "docs"});
        let out = engine
            .render_at(&data, "{{ [name] }}@{{ [../site] }}", &ScopePath::parse("user"))
            .await
            .unwrap();
        assert_eq!(out, "Ada@docs");
    }

    #[tokio::test]
    async fn test_shared_loader() {
        let loader = MemoryLoader::new();
        loader.insert("hello", TemplateBinding::new("hi")).await;

        let shared: Arc<dyn TemplateLoader> = Arc::new(loader);
        let engine = Prepcook::new().with_shared_loader(shared.clone());
        assert_eq!(engine.loader().map(|l| l.name()), Some("memory"));

        let out = engine.render(&json!({}), "{{ #template hello }}{{ /template }}").await.unwrap();
        assert_eq!(out, "hi");
    }

    #[test]
    fn test_debug_lists_filters() {
        let debug = format!("{:?}", Prepcook::new());
        assert!(debug.contains("lowercase"));
        assert!(debug.contains("loader: None"));
    }
}
