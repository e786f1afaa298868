//! Prepcook - a tag-driven text templating language.
//!
//! Templates mix literal text with tags. Tags carry control directives
//! (`#each`, `#if`/`#elseif`/`#else`, `#unless`, `#template`, `#include`) and
//! bracketed value expressions such as `[user.name|uppercase]`:
//!
//! ```text
//! <ul>{{ #each items }}<li>{{ [name] }} {{ #if ../show_price }}{{ [price|currency:USD] }}{{ /if }}</li>{{ /each }}</ul>
//! ```
//!
//! ```no_run
//! # async fn demo() -> Result<(), prepcook::RenderError> {
//! use serde_json::json;
//!
//! let html = prepcook::render(&json!({"bar": {"baz": "hi there"}}), "{{ [bar.baz] }}", None).await?;
//! assert_eq!(html, "hi there");
//! # Ok(())
//! # }
//! ```

pub mod bindings;
pub mod conditional;
pub mod config;
pub mod engine;
pub mod error;
mod evaluator;
pub mod filter;
pub mod loader;
pub mod resolver;
pub mod token;
pub mod value;

pub use bindings::{AssetKind, Bindings, TemplateBinding};
pub use config::{BindingsConfig, Config, RenderConfig, SyntaxConfig};
pub use engine::Prepcook;
pub use error::{RenderError, Result};
pub use filter::{FilterFn, FilterRegistry};
pub use loader::{DirectoryLoader, MemoryLoader, TemplateLoader};
pub use resolver::{ExprFailure, Resolution, ScopePath};
pub use token::Tokenizer;

pub use prepcook_parser::{parse, ParseError, ParseTree};

use serde_json::Value;

/// Render `template` against `data` with the default engine.
///
/// `scope_path` is a dotted path into `data` that names resolve against
/// (`None` for the root).
pub async fn render(data: &Value, template: &str, scope_path: Option<&str>) -> Result<String> {
    let scope = scope_path.map(ScopePath::parse).unwrap_or_default();
    Prepcook::new().render_at(data, template, &scope).await
}
