//! In-memory template loader

use crate::bindings::TemplateBinding;
use crate::loader::TemplateLoader;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Templates registered at runtime, shared between clones
#[derive(Clone, Default)]
pub struct MemoryLoader {
    templates: Arc<RwLock<HashMap<String, TemplateBinding>>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, name: impl Into<String>, binding: TemplateBinding) {
        self.templates.write().await.insert(name.into(), binding);
    }

    pub async fn remove(&self, name: &str) -> Option<TemplateBinding> {
        self.templates.write().await.remove(name)
    }

    pub async fn len(&self) -> usize {
        self.templates.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.templates.read().await.is_empty()
    }
}

#[async_trait]
impl TemplateLoader for MemoryLoader {
    async fn load(&self, name: &str, _use_default_scope: bool) -> Result<TemplateBinding> {
        self.templates
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("template `{}` is not registered", name))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
