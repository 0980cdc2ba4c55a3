//! Checker configuration, loaded from .asplan/config.yaml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH: &str = ".asplan/config.yaml";

/// Report format for `asplan check`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Xml,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Reject plans whose conflict annotations hold bad trigger patterns
    pub strict_annotations: bool,

    /// Run the conflict resolver over checked plans
    #[serde(default = "default_true")]
    pub resolve_conflicts: bool,

    /// File extensions scanned when `check` gets no explicit files
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,

    pub output: OutputFormat,
}

fn default_true() -> bool {
    true
}

fn default_source_extensions() -> Vec<String> {
    vec!["asl".to_string()]
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            strict_annotations: false,
            resolve_conflicts: true,
            source_extensions: default_source_extensions(),
            output: OutputFormat::Text,
        }
    }
}

impl CheckerConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load from project root, falling back to defaults
    pub fn load_from_project(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(CONFIG_PATH);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.source_extensions.iter().any(|e| e == ext))
    }

    /// Plan sources under `root`, sorted, skipping hidden directories
    pub fn discover_sources(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            let entries = std::fs::read_dir(&dir)
                .with_context(|| format!("Failed to list {}", dir.display()))?;
            for entry in entries {
                let path = entry?.path();
                let hidden = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.'));
                if path.is_dir() {
                    if !hidden {
                        pending.push(path);
                    }
                } else if self.is_source(&path) {
                    found.push(path);
                }
            }
        }
        found.sort();
        Ok(found)
    }
}
