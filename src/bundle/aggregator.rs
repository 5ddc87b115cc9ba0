//! Ordered concatenation of manifest entries.
//!
//! Entries are processed strictly one after another: an entry is read,
//! decoded and written before the next one is touched. Nothing is
//! inserted between entries.

use crate::bundle::error::{BundleError, BundleResult};
use crate::manifest::Manifest;
use crate::models::{AggregateOutcome, Encoding, EntryReport, WriteMode};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Options controlling how the output is produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateOptions {
    pub write_mode: WriteMode,
    pub encoding: Encoding,
    /// Show a progress bar while entries are processed.
    pub show_progress: bool,
}

/// Concatenates the entries of a manifest into one output file.
pub struct Aggregator {
    manifest: Manifest,
    output: PathBuf,
    options: AggregateOptions,
}

impl Aggregator {
    /// Create a new aggregator.
    pub fn new(manifest: Manifest, output: PathBuf, options: AggregateOptions) -> Self {
        Self {
            manifest,
            output,
            options,
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Run the aggregation.
    ///
    /// Fails fast on the first unreadable entry. In `append` and `truncate`
    /// mode whatever was written before the failure stays in the output; in
    /// `atomic` mode the output is left as it was.
    pub fn aggregate(&self) -> BundleResult<AggregateOutcome> {
        info!(
            "Bundling {} entries from {} into {} ({} mode)",
            self.manifest.len(),
            self.manifest.base_dir,
            self.output.display(),
            self.options.write_mode
        );

        let progress = self.progress_bar();
        let outcome = self.aggregate_with(&progress)?;

        info!(
            "Wrote {} files ({} bytes) to {}",
            outcome.files_written(),
            outcome.total_bytes,
            self.output.display()
        );

        Ok(outcome)
    }

    /// Run the configured write mode, settling the progress bar either way.
    fn aggregate_with(&self, progress: &ProgressBar) -> BundleResult<AggregateOutcome> {
        let result = match self.options.write_mode {
            WriteMode::Append => self.append_entries(progress),
            WriteMode::Truncate => File::create(&self.output)
                .map_err(|source| BundleError::OutputWrite {
                    path: self.output.clone(),
                    source,
                })
                .and_then(|_| self.append_entries(progress)),
            WriteMode::Atomic => self.write_atomic(progress),
        };

        match result {
            Ok(outcome) => {
                progress.finish_with_message("done");
                Ok(outcome)
            }
            Err(e) => {
                progress.abandon();
                Err(e)
            }
        }
    }

    /// Read, decode and append each entry with its own open/write/close.
    fn append_entries(&self, progress: &ProgressBar) -> BundleResult<AggregateOutcome> {
        let mut outcome = AggregateOutcome::default();

        for (entry, source_path) in self.manifest.sources() {
            progress.set_message(entry.to_string());

            let content = read_entry(&source_path, self.options.encoding)?;
            append_to(&self.output, &content)?;

            debug!("Appended {} ({} bytes)", source_path.display(), content.len());
            outcome.push(EntryReport {
                entry: entry.to_string(),
                source_path,
                bytes: content.len() as u64,
            });
            progress.inc(1);
        }

        Ok(outcome)
    }

    /// Buffer every entry, then replace the output with a temp file rename.
    fn write_atomic(&self, progress: &ProgressBar) -> BundleResult<AggregateOutcome> {
        let mut outcome = AggregateOutcome::default();
        let mut buffer = Vec::new();

        for (entry, source_path) in self.manifest.sources() {
            progress.set_message(entry.to_string());

            let content = read_entry(&source_path, self.options.encoding)?;
            buffer.extend_from_slice(&content);

            debug!("Buffered {} ({} bytes)", source_path.display(), content.len());
            outcome.push(EntryReport {
                entry: entry.to_string(),
                source_path,
                bytes: content.len() as u64,
            });
            progress.inc(1);
        }

        let write_err = |source| BundleError::OutputWrite {
            path: self.output.clone(),
            source,
        };

        let mut builder = tempfile::Builder::new();
        // Same mode a plain create would give: 0666 minus the umask.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o666));
        }
        let mut temp_file: NamedTempFile = builder
            .tempfile_in(output_dir(&self.output))
            .map_err(write_err)?;

        // A replaced output keeps its permissions.
        if let Ok(metadata) = fs::metadata(&self.output) {
            fs::set_permissions(temp_file.path(), metadata.permissions()).map_err(write_err)?;
        }

        temp_file.write_all(&buffer).map_err(write_err)?;
        temp_file.flush().map_err(write_err)?;

        debug!("Persisting {} atomically", self.output.display());
        temp_file
            .persist(&self.output)
            .map_err(|source| BundleError::Persist {
                path: self.output.clone(),
                source,
            })?;

        Ok(outcome)
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(self.manifest.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }
}

/// Read a whole source file and decode it to output bytes.
fn read_entry(path: &Path, encoding: Encoding) -> BundleResult<Vec<u8>> {
    let bytes = fs::read(path).map_err(|source| BundleError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;

    match encoding {
        Encoding::Raw => Ok(bytes),
        Encoding::Utf8 => String::from_utf8(bytes)
            .map(String::into_bytes)
            .map_err(|source| BundleError::InvalidEncoding {
                path: path.to_path_buf(),
                source,
            }),
        Encoding::Utf8Lossy => Ok(String::from_utf8_lossy(&bytes).into_owned().into_bytes()),
    }
}

/// Append to the output, creating it if needed.
fn append_to(output: &Path, content: &[u8]) -> BundleResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(output)
        .map_err(|source| BundleError::OutputWrite {
            path: output.to_path_buf(),
            source,
        })?;

    file.write_all(content)
        .map_err(|source| BundleError::OutputWrite {
            path: output.to_path_buf(),
            source,
        })
}

/// Directory the output lives in; `.` for a bare file name.
fn output_dir(output: &Path) -> &Path {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
