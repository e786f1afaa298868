//! Sub-template loaders consulted when `#template` names an unbound template

use crate::bindings::TemplateBinding;
use anyhow::Result;
use async_trait::async_trait;

pub mod directory;
pub mod memory;

pub use directory::DirectoryLoader;
pub use memory::MemoryLoader;

/// Source of sub-templates outside the data context
#[async_trait]
pub trait TemplateLoader: Send + Sync {
    /// Fetch the template bound to `name`.
    ///
    /// `use_default_scope` is true when the requesting `#template` sits at the
    /// root scope of its render.
    async fn load(&self, name: &str, use_default_scope: bool) -> Result<TemplateBinding>;

    /// Loader backend name
    fn name(&self) -> &'static str;
}
