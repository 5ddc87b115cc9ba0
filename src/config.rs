//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.docbundle.toml` files.

use crate::manifest::{self, Manifest};
use crate::models::{Encoding, WriteMode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".docbundle.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Manifest settings.
    #[serde(default)]
    pub manifest: ManifestConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output document path.
    #[serde(default = "default_output")]
    pub output: String,

    /// How the output is written.
    #[serde(default)]
    pub write_mode: WriteMode,

    /// How source bytes are decoded.
    #[serde(default)]
    pub encoding: Encoding,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            write_mode: WriteMode::default(),
            encoding: Encoding::default(),
        }
    }
}

fn default_output() -> String {
    manifest::DEFAULT_OUTPUT.to_string()
}

/// Source manifest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Prefix prepended to every entry.
    #[serde(default = "default_base_dir")]
    pub base_dir: String,

    /// Entries to concatenate, in order.
    #[serde(default = "manifest::default_entries")]
    pub entries: Vec<String>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            entries: manifest::default_entries(),
        }
    }
}

fn default_base_dir() -> String {
    manifest::DEFAULT_BASE_DIR.to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Resolve the configuration for a run.
    ///
    /// An explicit path must load. Without one, `.docbundle.toml` in `dir` is
    /// used if present; only its absence falls back to the defaults. A file
    /// that exists but doesn't parse is an error.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(config_path) = explicit {
            info!("Loading config from: {}", config_path.display());
            return Self::load(config_path);
        }

        match Self::load_from_dir(dir)? {
            Some(config) => {
                info!("Loaded config from {}", dir.join(CONFIG_FILE_NAME).display());
                Ok(config)
            }
            None => {
                debug!("No config file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// Try to load configuration from a directory.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.to_string_lossy().to_string();
        }
        if let Some(write_mode) = args.write_mode {
            self.general.write_mode = write_mode;
        }
        if let Some(encoding) = args.encoding {
            self.general.encoding = encoding;
        }
        if let Some(ref base_dir) = args.base_dir {
            self.manifest.base_dir = base_dir.clone();
        }
    }

    /// Build the manifest described by this configuration.
    pub fn manifest(&self) -> Manifest {
        Manifest::new(self.manifest.base_dir.clone(), self.manifest.entries.clone())
    }

    /// Output document path.
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.general.output)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output, "docs.md");
        assert_eq!(config.general.write_mode, WriteMode::Atomic);
        assert_eq!(config.general.encoding, Encoding::Utf8Lossy);
        assert_eq!(config.manifest.base_dir, "docs/source/");
        assert_eq!(config.manifest.entries.len(), 25);
        assert_eq!(config.manifest(), Manifest::default());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "build/handbook.md"
write_mode = "append"
encoding = "utf8"

[manifest]
base_dir = "handbook/"
entries = ["intro.md", "setup/install.md"]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "build/handbook.md");
        assert_eq!(config.general.write_mode, WriteMode::Append);
        assert_eq!(config.general.encoding, Encoding::Utf8);
        assert_eq!(config.manifest.base_dir, "handbook/");
        assert_eq!(config.manifest.entries, vec!["intro.md", "setup/install.md"]);
        assert_eq!(
            config.manifest().source_path("setup/install.md"),
            PathBuf::from("handbook/setup/install.md")
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[general]\nwrite_mode = \"truncate\"\n").unwrap();
        assert_eq!(config.general.write_mode, WriteMode::Truncate);
        assert_eq!(config.general.output, "docs.md");
        assert_eq!(config.manifest.entries.len(), 25);
    }

    #[test]
    fn test_invalid_write_mode_is_rejected() {
        let result: Result<Config, _> = toml::from_str("[general]\nwrite_mode = \"sideways\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[manifest]"));
        assert!(toml_str.contains("recipes/recompose.md"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.manifest(), Manifest::default());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[manifest]\nentries = [\"a.md\"]\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.manifest.entries, vec!["a.md"]);

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "not = [valid").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_resolve_without_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::resolve(None, dir.path()).unwrap();
        assert_eq!(config.manifest(), Manifest::default());
        assert_eq!(config.output_path(), PathBuf::from("docs.md"));
    }

    #[test]
    fn test_resolve_rejects_malformed_default_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[general]\noutput = \"out.md\"\n[manifest]\nentries = [\"mine.md\"\n",
        )
        .unwrap();

        let err = Config::resolve(None, dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_resolve_prefers_explicit_path() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "not = [valid").unwrap();
        let explicit = dir.path().join("handbook.toml");
        std::fs::write(&explicit, "[general]\noutput = \"handbook.md\"\n").unwrap();

        let config = Config::resolve(Some(explicit.as_path()), dir.path()).unwrap();
        assert_eq!(config.general.output, "handbook.md");

        let missing = dir.path().join("missing.toml");
        assert!(Config::resolve(Some(missing.as_path()), dir.path()).is_err());
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let args = Args::parse_from([
            "docbundle",
            "--output",
            "out/all.md",
            "--base-dir",
            "site/",
            "--write-mode",
            "truncate",
        ]);

        config.merge_with_args(&args);

        assert_eq!(config.output_path(), PathBuf::from("out/all.md"));
        assert_eq!(config.manifest.base_dir, "site/");
        assert_eq!(config.general.write_mode, WriteMode::Truncate);
        assert_eq!(config.general.encoding, Encoding::Utf8Lossy);
    }

    #[test]
    fn test_merge_without_args_keeps_file_values() {
        let mut config: Config = toml::from_str("[general]\noutput = \"kept.md\"\n").unwrap();
        let args = Args::parse_from(["docbundle"]);

        config.merge_with_args(&args);

        assert_eq!(config.general.output, "kept.md");
    }
}
