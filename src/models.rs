//! Data models for the documentation bundler.
//!
//! This module contains the shared value types that flow between the
//! configuration layer, the aggregator and the run summary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// How the output document is written.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum WriteMode {
    /// Append each entry to the existing output without clearing it first.
    Append,
    /// Truncate the output at the start of the run, then append each entry.
    Truncate,
    /// Buffer everything and replace the output in a single rename.
    #[default]
    Atomic,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Append => write!(f, "append"),
            WriteMode::Truncate => write!(f, "truncate"),
            WriteMode::Atomic => write!(f, "atomic"),
        }
    }
}

/// How source bytes are turned into output text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    /// UTF-8; invalid sequences are replaced with U+FFFD.
    #[default]
    Utf8Lossy,
    /// UTF-8; invalid sequences are an error.
    Utf8,
    /// Bytes are copied through untouched.
    Raw,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Utf8Lossy => write!(f, "utf8-lossy"),
            Encoding::Utf8 => write!(f, "utf8"),
            Encoding::Raw => write!(f, "raw"),
        }
    }
}

/// One manifest entry after it has been written to the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReport {
    /// Entry as listed in the manifest.
    pub entry: String,
    /// Path the entry was read from (base dir + entry).
    pub source_path: PathBuf,
    /// Number of bytes contributed to the output.
    pub bytes: u64,
}

/// Result of a successful aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateOutcome {
    /// Written entries, in manifest order.
    pub entries: Vec<EntryReport>,
    /// Total bytes written during this run.
    pub total_bytes: u64,
}

impl AggregateOutcome {
    /// Record a written entry.
    pub fn push(&mut self, report: EntryReport) {
        self.total_bytes += report.bytes;
        self.entries.push(report);
    }

    /// Number of entries written.
    pub fn files_written(&self) -> usize {
        self.entries.len()
    }
}
