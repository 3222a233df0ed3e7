//! Configuration for the gomod-manifest CLI

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Output configuration
    pub output: OutputConfig,
    /// Module paths to hide from listings (`*` wildcard patterns)
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// How statements are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Canonical manifest text, one statement per line
    #[default]
    Canonical,
    /// JSON array of statements
    Json,
    /// Statement counts per directive
    Summary,
}

impl OutputFormat {
    /// Parse an output format name, falling back to canonical for unknown values
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "summary" => OutputFormat::Summary,
            _ => OutputFormat::Canonical,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format for `list`
    pub format: OutputFormat,
    /// End canonical output with a newline
    pub trailing_newline: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Canonical,
            trailing_newline: true,
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("Invalid configuration")
    }

    /// Read and parse a TOML configuration file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Could not load config file {}", path.display()))
    }

    /// Whether a module path matches one of the `ignore` patterns
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|pattern| {
            if pattern.contains('*') {
                let parts: Vec<&str> = pattern.split('*').collect();
                if parts.len() == 2 {
                    name.starts_with(parts[0]) && name.ends_with(parts[1])
                } else {
                    name.starts_with(parts[0])
                }
            } else {
                name == pattern
            }
        })
    }
}
