//! Invalidation of host-application caches derived from the patched image.
//!
//! Host applications keep one cache root per installed version, named by a
//! fixed prefix optionally followed by a dotted version (`IntelliJIdea2023.1`,
//! `IntelliJIdea2023.2`, ...). After a patch or restore only the newest root
//! matters, because that is the one the registered installation reads next.
//!
//! # Example
//!
//! ```rust,no_run
//! use splashpatch::CacheDescriptor;
//! use splashpatch::cache::invalidate;
//!
//! let descriptor = CacheDescriptor::new(
//!     "/home/%s/.cache/JetBrains",
//!     "IntelliJIdea",
//!     "splash",
//! );
//! let result = invalidate("alice", &descriptor)?;
//! for path in &result.deleted {
//!     println!("Deleted cache file: {}", path.display());
//! }
//! # Ok::<(), splashpatch::Error>(())
//! ```

mod version;

pub use version::{DottedVersion, ParseVersionError};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::config::{CacheDescriptor, CacheSelection};
use crate::{Error, Result};

/// A subdirectory of the cache base whose name matches the prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheCandidate {
    /// Directory name.
    pub name: String,
    /// Version suffix after the prefix, if any.
    pub version: Option<DottedVersion>,
}

/// Result of a cache invalidation.
#[must_use = "invalidation result should be checked for deletion failures"]
#[derive(Debug, Default)]
pub struct InvalidationResult {
    /// The selected cache roots joined with the sub-path.
    pub cache_dirs: Vec<PathBuf>,
    /// Files deleted.
    pub deleted: Vec<PathBuf>,
    /// Files that could not be deleted.
    pub failures: Vec<(PathBuf, Error)>,
}

impl InvalidationResult {
    /// Returns whether every matching cache file was deleted.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Builds the candidate-matching pattern `^<prefix>([0-9]+(\.[0-9]+)*)?$`.
///
/// Digits are ASCII only, matching what [`DottedVersion`] parses.
fn candidate_pattern(prefix: &str) -> Result<Regex> {
    let pattern = format!(r"^{}([0-9]+(\.[0-9]+)*)?$", regex::escape(prefix));
    Regex::new(&pattern).map_err(|e| Error::Config(format!("cache prefix '{}': {}", prefix, e)))
}

/// Filters directory names down to those matching the prefix.
///
/// Returned candidates keep the input order.
pub fn match_candidates<'a>(
    prefix: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<CacheCandidate>> {
    let pattern = candidate_pattern(prefix)?;
    Ok(names
        .into_iter()
        .filter_map(|name| {
            let caps = pattern.captures(name)?;
            let version = match caps.get(1) {
                Some(m) => Some(m.as_str().parse().ok()?),
                None => None,
            };
            Some(CacheCandidate {
                name: name.to_string(),
                version,
            })
        })
        .collect())
}

/// Picks the candidate to invalidate.
///
/// Versioned candidates win over the bare prefix; among them the greatest
/// dotted version is chosen. Returns `None` only for an empty slice.
pub fn select_newest(candidates: &[CacheCandidate]) -> Option<&CacheCandidate> {
    let newest_versioned = candidates
        .iter()
        .filter(|c| c.version.is_some())
        .max_by(|a, b| a.version.cmp(&b.version));
    newest_versioned.or_else(|| candidates.iter().find(|c| c.version.is_none()))
}

/// Lists the names of the immediate subdirectories of `base`.
fn list_subdirs(base: &Path) -> Result<Vec<String>> {
    let read_dir = match fs::read_dir(base) {
        Ok(rd) => rd,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::CacheBaseNotFound {
                path: base.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let mut names: Vec<String> = read_dir
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    Ok(names)
}

/// Resolves the cache directories a descriptor points at for a user.
///
/// Each returned path is a selected cache root joined with the descriptor's
/// sub-path. With [`CacheSelection::Newest`] there is exactly one.
///
/// # Errors
///
/// - [`Error::CacheBaseNotFound`] if the substituted base does not exist
/// - [`Error::NoMatchingCacheDir`] if no subdirectory matches the prefix
pub fn resolve_cache_dirs(user: &str, descriptor: &CacheDescriptor) -> Result<Vec<PathBuf>> {
    let base = PathBuf::from(descriptor.base_dir(user));
    let names = list_subdirs(&base)?;
    let candidates = match_candidates(&descriptor.prefix, names.iter().map(String::as_str))?;

    let no_match = || Error::NoMatchingCacheDir {
        base: base.clone(),
        prefix: descriptor.prefix.clone(),
    };

    let selected: Vec<&CacheCandidate> = match descriptor.selection {
        CacheSelection::Newest => vec![select_newest(&candidates).ok_or_else(no_match)?],
        CacheSelection::All if candidates.is_empty() => return Err(no_match()),
        CacheSelection::All => candidates.iter().collect(),
    };

    Ok(selected
        .into_iter()
        .map(|c| {
            log::debug!("Selected cache directory {}", c.name);
            base.join(&c.name).join(&descriptor.sub_path)
        })
        .collect())
}

/// Deletes stale cache files for a descriptor.
///
/// Every regular file directly inside each resolved cache directory whose
/// name ends with the descriptor's suffix is deleted. Other files and the
/// directory itself stay. Deletion failures are collected, not fatal.
///
/// # Errors
///
/// See [`resolve_cache_dirs`]. No file is deleted when it fails.
pub fn invalidate(user: &str, descriptor: &CacheDescriptor) -> Result<InvalidationResult> {
    let cache_dirs = resolve_cache_dirs(user, descriptor)?;
    let mut result = InvalidationResult::default();

    for dir in &cache_dirs {
        purge_dir(dir, &descriptor.file_suffix, &mut result);
    }
    result.cache_dirs = cache_dirs;
    Ok(result)
}

fn purge_dir(dir: &Path, suffix: &str, result: &mut InvalidationResult) {
    let read_dir = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            log::warn!("Cannot list cache directory '{}': {}", dir.display(), e);
            return;
        }
    };

    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(suffix))
        .map(|entry| entry.path())
        .collect();
    files.sort();

    for path in files {
        match fs::remove_file(&path) {
            Ok(()) => {
                log::info!("Deleted cache file: {}", path.display());
                result.deleted.push(path);
            }
            Err(source) => {
                log::warn!("Failed to delete {}: {}", path.display(), source);
                result
                    .failures
                    .push((path.clone(), Error::Deletion { path, source }));
            }
        }
    }
}
