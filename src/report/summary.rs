//! Run summary generation.
//!
//! This module renders what a bundling run did (or would do, for a dry
//! run) as plain text or JSON.

use crate::manifest::ManifestStatus;
use crate::models::{AggregateOutcome, Encoding, EntryReport, WriteMode};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Everything worth reporting about a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Output document that was written.
    pub output: PathBuf,
    /// Base prefix the entries were read from.
    pub base_dir: String,
    pub write_mode: WriteMode,
    pub encoding: Encoding,
    /// Number of entries written.
    pub files_written: usize,
    /// Number of bytes written during this run.
    pub bytes_written: u64,
    /// Per-entry sizes, in manifest order.
    pub entries: Vec<EntryReport>,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
    /// Wall-clock duration of the run in seconds.
    pub duration_seconds: f64,
}

impl RunSummary {
    /// Build a summary from an aggregation outcome.
    pub fn new(
        output: PathBuf,
        base_dir: String,
        write_mode: WriteMode,
        encoding: Encoding,
        outcome: AggregateOutcome,
        duration_seconds: f64,
    ) -> Self {
        Self {
            output,
            base_dir,
            write_mode,
            encoding,
            files_written: outcome.files_written(),
            bytes_written: outcome.total_bytes,
            entries: outcome.entries,
            generated_at: Utc::now(),
            duration_seconds,
        }
    }
}

/// Generate a human readable summary.
pub fn generate_text_summary(summary: &RunSummary) -> String {
    let mut output = String::new();

    output.push_str("📊 Bundle Summary:\n");
    output.push_str(&format!("   Output: {}\n", summary.output.display()));
    output.push_str(&format!("   Base dir: {}\n", summary.base_dir));
    output.push_str(&format!(
        "   Mode: {} | Encoding: {}\n",
        summary.write_mode, summary.encoding
    ));
    output.push_str(&format!("   Files written: {}\n", summary.files_written));
    output.push_str(&format!("   Bytes written: {}\n", summary.bytes_written));
    output.push_str(&format!("   Duration: {:.2}s\n", summary.duration_seconds));

    output
}

/// Generate a JSON summary.
pub fn generate_json_summary(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}

/// Describe what a run would do, without writing anything.
pub fn generate_dry_run_text(status: &ManifestStatus) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "🔍 Dry run: {} entries from {}\n\n",
        status.entries.len(),
        status.base_dir
    ));

    for (i, entry) in status.entries.iter().enumerate() {
        match entry.size {
            Some(size) => output.push_str(&format!(
                "   {:>3}. 📄 {} ({} bytes)\n",
                i + 1,
                entry.entry,
                size
            )),
            None => output.push_str(&format!(
                "   {:>3}. ❌ {} (missing: {})\n",
                i + 1,
                entry.entry,
                entry.source_path.display()
            )),
        }
    }

    let missing = status.missing().len();
    output.push_str(&format!(
        "\n   Total: {} bytes from {} files",
        status.total_bytes(),
        status.entries.len() - missing
    ));
    if missing > 0 {
        output.push_str(&format!(", {} missing", missing));
    }
    output.push('\n');

    if !status.unlisted.is_empty() {
        output.push_str(&format!(
            "\n   ⚠️  {} markdown files are not in the manifest:\n",
            status.unlisted.len()
        ));
        for path in &status.unlisted {
            output.push_str(&format!("     - {}\n", path));
        }
    }

    output
}
