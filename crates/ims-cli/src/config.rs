//! Configuration file handling for ims-cli

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// Gateway address used when neither flag, env nor config file names one
pub const DEFAULT_SERVER: &str = "http://localhost:5050";

/// Configuration for the CLI tool
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Default gateway URL
    pub server: Option<String>,
    /// Default output format
    pub output: Option<OutputFormat>,
    /// Disable colored output
    pub no_color: Option<bool>,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("ims-cli");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(
        &self,
        server: Option<&str>,
        output: Option<OutputFormat>,
        no_color: bool,
    ) -> MergedConfig {
        MergedConfig {
            server: server
                .map(String::from)
                .or_else(|| self.server.clone())
                .unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            output: output.or(self.output).unwrap_or_default(),
            no_color: no_color || self.no_color.unwrap_or(false),
        }
    }
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone, PartialEq)]
pub struct MergedConfig {
    pub server: String,
    pub output: OutputFormat,
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file_or_flags() {
        let merged = Config::default().merge_with_args(None, None, false);
        assert_eq!(
            merged,
            MergedConfig {
                server: DEFAULT_SERVER.to_string(),
                output: OutputFormat::Table,
                no_color: false,
            }
        );
    }

    #[test]
    fn flags_override_file() {
        let config = Config {
            server: Some("http://file:5050".into()),
            output: Some(OutputFormat::Json),
            no_color: Some(true),
        };

        let merged = config.merge_with_args(Some("http://flag:5050"), None, false);
        assert_eq!(merged.server, "http://flag:5050");
        assert_eq!(merged.output, OutputFormat::Json);
        assert!(merged.no_color);

        let merged = config.merge_with_args(None, Some(OutputFormat::Table), false);
        assert_eq!(merged.server, "http://file:5050");
        assert_eq!(merged.output, OutputFormat::Table);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "server = \"http://inventory:5050\"\noutput = \"json\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.as_deref(), Some("http://inventory:5050"));
        assert_eq!(config.output, Some(OutputFormat::Json));
        assert_eq!(config.no_color, None);
    }
}
