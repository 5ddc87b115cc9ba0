//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Every flag is optional: with no arguments the
//! default documentation manifest is bundled into `docs.md`.

use crate::models::{Encoding, WriteMode};
use clap::Parser;
use std::path::PathBuf;

/// docbundle - concatenate markdown docs into a single document
///
/// Reads an ordered manifest of markdown files and writes their contents,
/// back to back, into one output file.
///
/// Examples:
///   docbundle
///   docbundle --output build/docs.md --write-mode truncate
///   docbundle --base-dir handbook/ --config handbook.toml
///   docbundle --dry-run
///   docbundle --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .docbundle.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output file for the bundled document [default: docs.md]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Prefix prepended to every manifest entry [default: docs/source/]
    ///
    /// Joined as a plain string, so keep the trailing slash.
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<String>,

    /// How the output is written [default: atomic]
    ///
    /// append: add to the existing file; truncate: clear it first;
    /// atomic: replace it in one step only after every entry was read.
    #[arg(long, value_name = "MODE")]
    pub write_mode: Option<WriteMode>,

    /// How source files are decoded [default: utf8-lossy]
    #[arg(long, value_name = "ENCODING")]
    pub encoding: Option<Encoding>,

    /// Format of the summary printed after the run
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: check the manifest against the filesystem without writing
    ///
    /// Exits with code 2 if any entry is missing.
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .docbundle.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Format of the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human readable text (default)
    #[default]
    Text,
    /// JSON
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref output) = self.output {
            if output.as_os_str().is_empty() {
                return Err("Output path must not be empty".to_string());
            }
            if output.is_dir() {
                return Err(format!(
                    "Output path is a directory: {}",
                    output.display()
                ));
            }
        }

        if let Some(ref config) = self.config {
            if !config.is_file() {
                return Err(format!("Config file does not exist: {}", config.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Whether human-oriented output (progress, banners) should be shown.
    pub fn interactive(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_args() -> Args {
        Args {
            config: None,
            output: None,
            base_dir: None,
            write_mode: None,
            encoding: None,
            format: OutputFormat::Text,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_no_arguments_is_valid() {
        let args = Args::parse_from(["docbundle"]);
        assert!(args.validate().is_ok());
        assert!(args.write_mode.is_none());
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn test_environment_does_not_redirect_output() {
        std::env::set_var("DOCBUNDLE_OUTPUT", "elsewhere.md");
        std::env::set_var("DOCBUNDLE_BASE_DIR", "elsewhere/");

        let args = Args::parse_from(["docbundle"]);

        std::env::remove_var("DOCBUNDLE_OUTPUT");
        std::env::remove_var("DOCBUNDLE_BASE_DIR");
        assert!(args.output.is_none());
        assert!(args.base_dir.is_none());
    }

    #[test]
    fn test_parse_value_enums() {
        let args = Args::parse_from([
            "docbundle",
            "--write-mode",
            "append",
            "--encoding",
            "utf8-lossy",
            "--format",
            "json",
        ]);
        assert_eq!(args.write_mode, Some(WriteMode::Append));
        assert_eq!(args.encoding, Some(Encoding::Utf8Lossy));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_output_is_directory() {
        let dir = TempDir::new().unwrap();
        let mut args = make_args();
        args.output = Some(dir.path().to_path_buf());
        assert!(args.validate().is_err());

        args.output = Some(PathBuf::new());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_config() {
        let mut args = make_args();
        args.config = Some(PathBuf::from("/no/such/.docbundle.toml"));
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_interactive() {
        let mut args = make_args();
        assert!(args.interactive());

        args.format = OutputFormat::Json;
        assert!(!args.interactive());

        args.format = OutputFormat::Text;
        args.quiet = true;
        assert!(!args.interactive());
    }
}
