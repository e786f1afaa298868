//! Template loader backed by a directory of files

use crate::bindings::TemplateBinding;
use crate::loader::TemplateLoader;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Reads `<root>/<name>.<extension>`
///
/// Names may contain `/` to reach subdirectories but cannot leave `root`.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
    extension: String,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: "html".to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn name_to_path(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if name.is_empty() || escapes {
            bail!("template name `{}` is not a relative path inside the template root", name);
        }

        Ok(self.root.join(format!("{}.{}", name, self.extension)))
    }
}

#[async_trait]
impl TemplateLoader for DirectoryLoader {
    async fn load(&self, name: &str, _use_default_scope: bool) -> Result<TemplateBinding> {
        let path = self.name_to_path(name)?;
        let template = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read template file: {:?}", path))?;

        tracing::debug!("Loaded template `{}` from {:?}", name, path);
        Ok(TemplateBinding::new(template))
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}
