//! Manifest of source documents.
//!
//! A manifest is an ordered list of entry paths plus a base prefix. The
//! order of entries is the order of concatenation in the output.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Base prefix used when nothing else is configured.
pub const DEFAULT_BASE_DIR: &str = "docs/source/";

/// Output document used when nothing else is configured.
pub const DEFAULT_OUTPUT: &str = "docs.md";

/// Entries of the default documentation manifest, in publishing order.
pub const DEFAULT_ENTRIES: &[&str] = &[
    "index.md",
    "why-apollo.md",
    "integrations.md",
    "react-apollo-migration.md",
    "essentials/get-started.md",
    "essentials/queries.md",
    "essentials/mutations.md",
    "essentials/local-state.md",
    "features/error-handling.md",
    "features/pagination.md",
    "features/optimistic-ui.md",
    "features/server-side-rendering.md",
    "features/developer-tooling.md",
    "features/defer-support.md",
    "advanced/boost-migration.md",
    "advanced/subscriptions.md",
    "advanced/network-layer.md",
    "advanced/caching.md",
    "advanced/fragments.md",
    "recipes/authentication.md",
    "recipes/testing.md",
    "recipes/static-typing.md",
    "recipes/performance.md",
    "recipes/webpack.md",
    "recipes/recompose.md",
];

/// Ordered list of documents to concatenate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Prefix prepended verbatim to every entry.
    pub base_dir: String,
    /// Entry paths, in output order. Duplicates are allowed.
    pub entries: Vec<String>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            base_dir: DEFAULT_BASE_DIR.to_string(),
            entries: default_entries(),
        }
    }
}

/// The default entries as owned strings.
pub fn default_entries() -> Vec<String> {
    DEFAULT_ENTRIES.iter().map(|e| e.to_string()).collect()
}

impl Manifest {
    /// Create a manifest from a base prefix and ordered entries.
    pub fn new(base_dir: impl Into<String>, entries: Vec<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            entries,
        }
    }

    /// Path of an entry: the base prefix and the entry joined as strings.
    ///
    /// No separator is inserted, so a base dir without a trailing `/` is
    /// glued directly onto the entry.
    pub fn source_path(&self, entry: &str) -> PathBuf {
        PathBuf::from(format!("{}{}", self.base_dir, entry))
    }

    /// Iterate `(entry, source_path)` pairs in manifest order.
    pub fn sources(&self) -> impl Iterator<Item = (&str, PathBuf)> + '_ {
        self.entries
            .iter()
            .map(move |entry| (entry.as_str(), self.source_path(entry)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// On-disk state of a single manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryStatus {
    pub entry: String,
    pub source_path: PathBuf,
    /// File size in bytes, `None` if the file is missing or unreadable.
    pub size: Option<u64>,
}

/// Result of checking a manifest against the filesystem.
#[derive(Debug, Clone, Default)]
pub struct ManifestStatus {
    pub base_dir: String,
    /// Every entry, in manifest order.
    pub entries: Vec<EntryStatus>,
    /// Markdown files under the base dir that no entry names, sorted.
    pub unlisted: Vec<String>,
}

impl ManifestStatus {
    /// Entries whose source file could not be found.
    pub fn missing(&self) -> Vec<&EntryStatus> {
        self.entries.iter().filter(|e| e.size.is_none()).collect()
    }

    /// Total bytes the present entries would contribute.
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().filter_map(|e| e.size).sum()
    }
}

/// Check each manifest entry on disk and look for unlisted markdown files.
pub fn inspect(manifest: &Manifest) -> ManifestStatus {
    let entries = manifest
        .sources()
        .map(|(entry, source_path)| {
            let size = fs::metadata(&source_path)
                .ok()
                .filter(|m| m.is_file())
                .map(|m| m.len());
            EntryStatus {
                entry: entry.to_string(),
                source_path,
                size,
            }
        })
        .collect();

    ManifestStatus {
        base_dir: manifest.base_dir.clone(),
        entries,
        unlisted: find_unlisted(manifest),
    }
}

/// Walk the base directory for `.md` files not named by the manifest.
fn find_unlisted(manifest: &Manifest) -> Vec<String> {
    let root = Path::new(&manifest.base_dir);
    if !root.is_dir() {
        debug!("Base directory {} not found, skipping unlisted scan", root.display());
        return Vec::new();
    }

    let listed: HashSet<&str> = manifest.entries.iter().map(String::as_str).collect();

    let mut unlisted: Vec<String> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|ext| ext.to_str()) == Some("md"))
        .filter_map(|e| {
            let rel = e.path().strip_prefix(root).ok()?;
            let rel = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            (!listed.contains(rel.as_str())).then_some(rel)
        })
        .collect();

    unlisted.sort();
    unlisted
}
