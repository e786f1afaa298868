//! Depth-first evaluation of a parse tree into rendered text.
//!
//! Siblings are visited strictly left to right. Each visit returns the
//! linked-conditional flag handed to the next sibling: `true` only right after
//! a conditional in the same chain failed, so the following `#elseif`/`#else`
//! gets its turn. Whitespace-only constants pass the flag through untouched.

use prepcook_parser::{Behavior, NodeId, NodeKind, ParseTree, ReserveWord};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

use crate::bindings::{AssetKind, Bindings, TemplateBinding};
use crate::conditional::resolve_conditional;
use crate::engine::Prepcook;
use crate::error::{RenderError, Result};
use crate::resolver::{resolve_ref, ScopePath};
use crate::token::Tokenizer;
use crate::value::type_name;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One render pass, or one nested sub-template render
pub(crate) struct Evaluator<'e> {
    engine: &'e Prepcook,
    depth: usize,
}

impl<'e> Evaluator<'e> {
    pub(crate) fn new(engine: &'e Prepcook) -> Self {
        Self { engine, depth: 0 }
    }

    fn nested(&self) -> Self {
        Self {
            engine: self.engine,
            depth: self.depth + 1,
        }
    }

    fn tokenizer(&self) -> Tokenizer<'e> {
        let syntax = &self.engine.config().syntax;
        Tokenizer::with_delimiters(
            self.engine.filters(),
            &syntax.expression_open,
            &syntax.expression_close,
        )
    }

    /// Parse and evaluate `template`. Text without any tag is returned as is.
    pub(crate) fn render_template<'a>(
        &'a self,
        template: &'a str,
        data: &'a Value,
        scope: &'a ScopePath,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            if !template.contains(self.engine.config().syntax.tag_open.as_str()) {
                return Ok(template.to_string());
            }

            let tree = self.engine.parse(template)?;
            let mut out = String::with_capacity(template.len());
            self.visit(&tree, tree.root(), false, data, scope, &mut out)
                .await?;
            Ok(out)
        })
    }

    fn visit_children<'a>(
        &'a self,
        tree: &'a ParseTree,
        id: NodeId,
        data: &'a Value,
        scope: &'a ScopePath,
        out: &'a mut String,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut linked = false;
            for &child in tree.children(id) {
                linked = self.visit(tree, child, linked, data, scope, out).await?;
            }
            Ok(())
        })
    }

    /// Evaluate one node, returning the flag for its next sibling
    fn visit<'a>(
        &'a self,
        tree: &'a ParseTree,
        id: NodeId,
        linked: bool,
        data: &'a Value,
        scope: &'a ScopePath,
        out: &'a mut String,
    ) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let node = &tree[id];

            match &node.kind {
                NodeKind::Root => {
                    self.visit_children(tree, id, data, scope, out).await?;
                    Ok(false)
                }
                NodeKind::Constant => {
                    let text = node.payload.trim();
                    if text.is_empty() {
                        return Ok(linked);
                    }
                    out.push_str(text);
                    Ok(false)
                }
                NodeKind::Expression => {
                    out.push_str(&self.tokenizer().parse(&node.payload, data, scope)?);
                    Ok(false)
                }
                NodeKind::Directive(word) => {
                    self.directive(tree, id, *word, linked, data, scope, out)
                        .await
                }
            }
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn directive(
        &self,
        tree: &ParseTree,
        id: NodeId,
        word: &'static ReserveWord,
        linked: bool,
        data: &Value,
        scope: &ScopePath,
        out: &mut String,
    ) -> Result<bool> {
        let argument = tree[id].payload.trim();

        // A block with no argument is a plain grouping
        if argument.is_empty()
            && !word.is_unconditional()
            && matches!(
                word.behavior,
                Behavior::Conditional | Behavior::LinkedConditional | Behavior::Loop
            )
        {
            tracing::trace!("{} without an argument, rendering its body once", word.start);
            self.visit_children(tree, id, data, scope, out).await?;
            return Ok(false);
        }

        match word.behavior {
            Behavior::LinkedConditional if !linked => {
                tracing::trace!("Skipping {} {}", word.start, argument);
                Ok(false)
            }
            Behavior::Conditional | Behavior::LinkedConditional => {
                let pass = resolve_conditional(word, argument, data, scope);
                if pass {
                    self.visit_children(tree, id, data, scope, out).await?;
                }
                Ok(!pass)
            }
            Behavior::Loop => {
                self.iterate(tree, id, argument, data, scope, out).await?;
                Ok(false)
            }
            Behavior::Loader => {
                out.push_str(&self.load_template(argument, data, scope).await?);
                Ok(false)
            }
            Behavior::Include => {
                out.push_str(&self.include(argument, data)?);
                Ok(false)
            }
        }
    }

    /// Render the children once per element, each pass at `<scope>.<name>.<index>`
    async fn iterate(
        &self,
        tree: &ParseTree,
        id: NodeId,
        collection: &str,
        data: &Value,
        scope: &ScopePath,
        out: &mut String,
    ) -> Result<()> {
        let not_iterable = |reason: String| RenderError::IteratorType {
            collection: collection.to_string(),
            scope: scope.to_string(),
            reason,
        };

        let len = match resolve_ref(data, scope, collection) {
            Ok(Value::Array(items)) => items.len(),
            Ok(other) => {
                return Err(not_iterable(format!(
                    "expected an array, found {}",
                    type_name(other)
                )))
            }
            Err(failure) => return Err(not_iterable(failure.to_string())),
        };

        tracing::trace!("Iterating `{}` ({} items) at `{}`", collection, len, scope);

        for index in 0..len {
            let item_scope = scope
                .descend(collection, index)
                .ok_or_else(|| not_iterable("scope climbs above the root".to_string()))?;
            self.visit_children(tree, id, data, &item_scope, out).await?;
        }

        Ok(())
    }

    /// Resolve and render a `#template` sub-template
    async fn load_template(&self, name: &str, data: &Value, scope: &ScopePath) -> Result<String> {
        let config = self.engine.config();
        let namespace = config.bindings.namespace.as_str();
        let bindings = Bindings::of(data, namespace);

        let max_depth = config.render.max_template_depth;
        if self.depth >= max_depth {
            return Err(RenderError::TemplateDepthExceeded(max_depth));
        }

        let binding = match bindings.template(name) {
            Some(binding) => binding,
            None => self.fetch_template(name, scope).await?,
        };

        tracing::debug!("Rendering sub-template `{}` at depth {}", name, self.depth + 1);

        let nested = self.nested();
        let TemplateBinding { template, vars } = binding;
        match vars {
            Some(vars) => {
                let isolated = with_bindings(vars, bindings, namespace);
                nested
                    .render_template(&template, &isolated, &ScopePath::root())
                    .await
            }
            None => nested.render_template(&template, data, scope).await,
        }
    }

    async fn fetch_template(&self, name: &str, scope: &ScopePath) -> Result<TemplateBinding> {
        let Some(loader) = self.engine.loader() else {
            return Err(RenderError::UnresolvedBinding {
                kind: "template",
                name: name.to_string(),
            });
        };

        tracing::debug!("Fetching template `{}` from {} loader", name, loader.name());
        loader
            .load(name, scope.is_root())
            .await
            .map_err(|e| RenderError::Loader {
                name: name.to_string(),
                source: e.into(),
            })
    }

    /// Markup for every `kind:name` pair in an `#include` argument
    fn include(&self, argument: &str, data: &Value) -> Result<String> {
        let bindings = Bindings::of(data, &self.engine.config().bindings.namespace);

        let tags = argument
            .split_whitespace()
            .map(|pair| -> Result<String> {
                let invalid = || RenderError::InvalidInclude(pair.to_string());
                let (kind, name) = pair.split_once(':').ok_or_else(invalid)?;
                let kind = AssetKind::parse(kind).ok_or_else(invalid)?;
                if name.is_empty() {
                    return Err(invalid());
                }

                let path = bindings
                    .asset(kind, name)
                    .ok_or_else(|| RenderError::UnresolvedBinding {
                        kind: match kind {
                            AssetKind::Css => "stylesheet",
                            AssetKind::Js => "script",
                        },
                        name: name.to_string(),
                    })?;
                Ok(kind.markup(path))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(tags.join("\n"))
    }
}

/// Isolated sub-template variables still see the caller's bindings namespace
fn with_bindings(mut vars: Value, bindings: Bindings<'_>, namespace: &str) -> Value {
    if let (Value::Object(map), Some(store)) = (&mut vars, bindings.store()) {
        map.entry(namespace.to_string())
            .or_insert_with(|| store.clone());
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn render(data: Value, template: &str) -> Result<String> {
        let engine = Prepcook::new();
        Evaluator::new(&engine)
            .render_template(template, &data, &ScopePath::root())
            .await
    }

    #[tokio::test]
    async fn test_whitespace_keeps_chain_alive() {
        let out = render(
            json!({"a": false}),
            "{{ #if a }}A{{ /if }}\n   {{ #else }}B{{ /else }}",
        )
        .await
        .unwrap();
        assert_eq!(out, "B");
    }

    #[tokio::test]
    async fn test_text_breaks_chain() {
        let out = render(
            json!({"a": false}),
            "{{ #if a }}A{{ /if }} x {{ #else }}B{{ /else }}",
        )
        .await
        .unwrap();
        assert_eq!(out, "x");
    }

    #[tokio::test]
    async fn test_chain_does_not_leak_into_children() {
        let out = render(
            json!({"b": true, "list": [1]}),
            "{{ #unless b }}U{{ /unless }}{{ #each list }}{{ #else }}E{{ /else }}{{ /each }}",
        )
        .await
        .unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn test_loop_disarms_following_else() {
        let out = render(
            json!({"a": false, "list": []}),
            "{{ #if a }}A{{ /if }}{{ #each list }}{{ /each }}{{ #else }}E{{ /else }}",
        )
        .await
        .unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn test_chain_does_not_cross_iterations() {
        let out = render(
            json!({"list": [1, 2]}),
            "{{ #each list }}{{ #else }}E{{ /else }}{{ #if . }}{{ [.] }}{{ /if }}{{ /each }}",
        )
        .await
        .unwrap();
        assert_eq!(out, "12");
    }

    #[tokio::test]
    async fn test_else_without_chain_is_skipped() {
        let out = render(json!({}), "a{{ #else }}B{{ /else }}").await.unwrap();
        assert_eq!(out, "a");
    }

    #[tokio::test]
    async fn test_blocks_without_argument_render_body_once() {
        let data = json!({"list": [1, 2]});
        assert_eq!(render(data.clone(), "{{ #if }}body{{ /if }}").await.unwrap(), "body");
        assert_eq!(render(data.clone(), "{{ #unless }}U{{ /unless }}").await.unwrap(), "U");
        assert_eq!(render(data.clone(), "{{ #each }}E{{ /each }}").await.unwrap(), "E");
        assert_eq!(
            render(data, "{{ #if }}A{{ /if }}{{ #else }}B{{ /else }}").await.unwrap(),
            "A"
        );
    }

    #[tokio::test]
    async fn test_include_invalid_pair() {
        let err = render(json!({}), "{{ #include main.css }}").await.unwrap_err();
        assert!(matches!(err, RenderError::InvalidInclude(ref pair) if pair == "main.css"));

        let err = render(json!({}), "{{ #include img:logo }}").await.unwrap_err();
        assert!(matches!(err, RenderError::InvalidInclude(_)));
    }

    #[test]
    fn test_with_bindings_keeps_own_namespace() {
        let data = json!({"_prepcook": {"templates": {}}});
        let bindings = Bindings::of(&data, "_prepcook");

        let merged = with_bindings(json!({"x": 1}), bindings, "_prepcook");
        assert_eq!(merged, json!({"x": 1, "_prepcook": {"templates": {}}}));

        let own = with_bindings(json!({"_prepcook": 5}), bindings, "_prepcook");
        assert_eq!(own, json!({"_prepcook": 5}));
    }
}
