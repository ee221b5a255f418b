//! Copying configured entries out of an archive for inspection.
//!
//! Extraction is diagnostic: entries missing from the archive are reported
//! and skipped, and per-file write failures are collected rather than
//! aborting the remaining items.

use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::{self, EntrySnapshot};
use crate::patch::archive_path;
use crate::{Error, Result, TargetConfig};

/// Default output directory used by the CLI.
pub const DEFAULT_OUTPUT_DIR: &str = "extracted";

/// An entry written to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile {
    /// Archive-internal entry path.
    pub entry: String,
    /// Path of the written file.
    pub path: PathBuf,
    /// Number of bytes written.
    pub bytes: u64,
}

/// Result of an extraction.
#[must_use = "extract result should be checked for missing entries"]
#[derive(Debug, Default)]
pub struct ExtractResult {
    /// Files written, in configuration order.
    pub extracted: Vec<ExtractedFile>,
    /// Configured entries not present in the archive.
    pub missing: Vec<String>,
    /// Entries that could not be written, with the reason.
    pub failures: Vec<(String, Error)>,
}

impl ExtractResult {
    /// Returns whether every configured entry was extracted.
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.failures.is_empty()
    }

    /// Total bytes written.
    pub fn bytes_extracted(&self) -> u64 {
        self.extracted.iter().map(|f| f.bytes).sum()
    }
}

/// Writes every configured entry present in the archive to `output_dir`.
///
/// Files are named by the entry's base name; directory components are
/// dropped. The output directory is created if absent.
///
/// # Errors
///
/// - [`Error::ArchiveNotFound`] / [`Error::ArchiveCorrupt`] if the archive
///   cannot be opened
/// - [`Error::Io`] if the output directory cannot be created
pub fn extract(
    archive_root: &str,
    target: &TargetConfig,
    output_dir: impl AsRef<Path>,
) -> Result<ExtractResult> {
    let archive = archive_path(archive_root, target);
    let snapshot = archive::read_selected(&archive, &target.items)?;
    extract_from(&snapshot, &target.items, output_dir.as_ref())
}

fn extract_from(
    snapshot: &EntrySnapshot,
    items: &[String],
    output_dir: &Path,
) -> Result<ExtractResult> {
    if !output_dir.exists() {
        fs::create_dir_all(output_dir)?;
        log::info!("Created directory: {}", output_dir.display());
    }

    let mut result = ExtractResult::default();
    for item in items {
        let Some(data) = snapshot.get(item) else {
            log::warn!("{} not found in the archive", item);
            result.missing.push(item.clone());
            continue;
        };

        let path = output_dir.join(base_name(item));
        match fs::write(&path, data) {
            Ok(()) => {
                log::info!("Extracted {} to {}", item, path.display());
                result.extracted.push(ExtractedFile {
                    entry: item.clone(),
                    path,
                    bytes: data.len() as u64,
                });
            }
            Err(e) => {
                log::warn!("Failed to write '{}': {}", path.display(), e);
                result.failures.push((item.clone(), Error::Io(e)));
            }
        }
    }

    Ok(result)
}

/// Returns the last `/`-separated component of an entry path.
fn base_name(entry: &str) -> &str {
    entry.trim_end_matches('/').rsplit('/').next().unwrap_or(entry)
}
