// File: src/config.rs
// Purpose: Engine configuration parsed from prepcook.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub syntax: SyntaxConfig,

    #[serde(default)]
    pub bindings: BindingsConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

/// Tag and expression delimiters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyntaxConfig {
    #[serde(default = "default_tag_open")]
    pub tag_open: String,

    #[serde(default = "default_tag_close")]
    pub tag_close: String,

    #[serde(default = "default_expression_open")]
    pub expression_open: String,

    #[serde(default = "default_expression_close")]
    pub expression_close: String,
}

/// Where sub-template and asset bindings live in the data context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BindingsConfig {
    /// Top-level key of the bindings object (default: "_prepcook")
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

/// Render limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderConfig {
    /// How deep `#template` may nest before the render is aborted
    #[serde(default = "default_max_template_depth")]
    pub max_template_depth: usize,
}

fn default_tag_open() -> String {
    "{{".to_string()
}

fn default_tag_close() -> String {
    "}}".to_string()
}

fn default_expression_open() -> String {
    "[".to_string()
}

fn default_expression_close() -> String {
    "]".to_string()
}

fn default_namespace() -> String {
    "_prepcook".to_string()
}

fn default_max_template_depth() -> usize {
    16
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Self {
            tag_open: default_tag_open(),
            tag_close: default_tag_close(),
            expression_open: default_expression_open(),
            expression_close: default_expression_close(),
        }
    }
}

impl Default for BindingsConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_template_depth: default_max_template_depth(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        tracing::debug!("Loaded prepcook config from {:?}", path);
        Ok(config)
    }

    /// Load configuration from ./prepcook.toml
    pub fn load_default() -> Result<Self> {
        Self::load("prepcook.toml")
    }
}
