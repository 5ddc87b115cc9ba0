//! docbundle - documentation bundler
//!
//! A CLI tool that concatenates an ordered manifest of markdown files
//! into a single document for publishing.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable source, unwritable output, bad config, etc.)
//!   2 - Dry run found manifest entries missing on disk

mod bundle;
mod cli;
mod config;
mod manifest;
mod models;
mod report;

use anyhow::{Context, Result};
use bundle::{AggregateOptions, Aggregator};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use manifest::{Manifest, ManifestStatus};
use report::RunSummary;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args)?;

    info!("docbundle v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_bundle(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Bundling failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .docbundle.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the output, base dir, and manifest entries.");
    Ok(())
}

/// Initialize logging based on verbosity settings. `RUST_LOG` wins if set.
fn init_logging(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))
}

/// Run the bundle workflow. Returns the exit code.
fn run_bundle(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = Config::resolve(args.config.as_deref(), Path::new("."))?;
    config.merge_with_args(&args);

    let manifest = config.manifest();
    let output = config.output_path();

    if args.dry_run {
        return handle_dry_run(&manifest);
    }

    if manifest.is_empty() {
        warn!("Manifest has no entries; nothing will be read");
    }

    if args.interactive() {
        println!(
            "📚 Bundling {} files from {} into {}",
            manifest.len(),
            manifest.base_dir,
            output.display()
        );
    }

    let base_dir = manifest.base_dir.clone();
    let options = AggregateOptions {
        write_mode: config.general.write_mode,
        encoding: config.general.encoding,
        show_progress: args.interactive(),
    };

    let aggregator = Aggregator::new(manifest, output, options);
    let outcome = aggregator
        .aggregate()
        .with_context(|| format!("Failed to bundle {}", aggregator.output().display()))?;

    let summary = RunSummary::new(
        aggregator.output().to_path_buf(),
        base_dir,
        options.write_mode,
        options.encoding,
        outcome,
        start_time.elapsed().as_secs_f64(),
    );

    match args.format {
        OutputFormat::Json => println!("{}", report::generate_json_summary(&summary)?),
        OutputFormat::Text if !args.quiet => {
            println!("\n{}", report::generate_text_summary(&summary));
            println!("✅ Bundle complete! Saved to: {}", summary.output.display());
        }
        OutputFormat::Text => {}
    }

    Ok(0)
}

/// Handle --dry-run: check every entry on disk, print the plan, write nothing.
fn handle_dry_run(manifest: &Manifest) -> Result<i32> {
    let status = manifest::inspect(manifest);

    println!("{}", report::generate_dry_run_text(&status));

    let exit_code = dry_run_exit_code(&status);
    if exit_code != 0 {
        let missing = status.missing();
        for entry in &missing {
            warn!("Missing manifest entry: {}", entry.source_path.display());
        }
        eprintln!(
            "⛔ {} manifest entries are missing. Failing (exit code {}).",
            missing.len(),
            exit_code
        );
        return Ok(exit_code);
    }

    println!("✅ Dry run complete. Nothing was written.");
    Ok(0)
}

/// Exit code for a dry run: 2 if any entry is missing on disk.
fn dry_run_exit_code(status: &ManifestStatus) -> i32 {
    if status.missing().is_empty() {
        0
    } else {
        2
    }
}
