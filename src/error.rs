//! Error types for archive patching, restoring, and cache invalidation.
//!
//! This module provides the [`Error`] enum which represents every failure
//! mode of the patch engine, along with a convenient [`Result<T>`] alias.
//!
//! # Propagation
//!
//! Errors fall into two groups:
//!
//! | Group | Variants | Behavior |
//! |-------|----------|----------|
//! | Environment mismatch | [`ArchiveNotFound`][Error::ArchiveNotFound], [`ArchiveCorrupt`][Error::ArchiveCorrupt], [`EntryMissing`][Error::EntryMissing], [`CacheBaseNotFound`][Error::CacheBaseNotFound], [`NoMatchingCacheDir`][Error::NoMatchingCacheDir] | Abort the operation |
//! | Recovery | [`BackupIo`][Error::BackupIo] | Abort the patch before any write |
//! | Cleanup | [`Deletion`][Error::Deletion], per-item restore failures | Collected in the result, never abort |
//!
//! ```rust,no_run
//! use splashpatch::{Error, TargetConfig, fit::CenterCropFitter, patch};
//!
//! fn run(target: &TargetConfig) -> splashpatch::Result<()> {
//!     match patch::patch("/opt/ide/", "splash.png", target, &CenterCropFitter) {
//!         Ok(result) => {
//!             println!("Replaced {} entries", result.replaced.len());
//!             Ok(())
//!         }
//!         Err(Error::EntryMissing { entry, .. }) => {
//!             eprintln!("Configured entry {} is not in the archive", entry);
//!             Ok(())
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! # fn main() {}
//! ```

use std::io;
use std::path::PathBuf;

/// The main error type for patch, restore, extract and cache operations.
///
/// Each variant carries the path or name needed to tell the user which
/// piece of the environment did not match the configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error that is not attributable to a more specific variant.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive file does not exist.
    ///
    /// Usually means the installation directory or the configured `source`
    /// path is wrong.
    #[error("Archive not found at {}", path.display())]
    ArchiveNotFound {
        /// The resolved archive path.
        path: PathBuf,
    },

    /// The archive exists but could not be parsed as a ZIP container.
    #[error("Archive {} is corrupt: {reason}", path.display())]
    ArchiveCorrupt {
        /// The archive path.
        path: PathBuf,
        /// What the ZIP reader reported.
        reason: String,
    },

    /// A configured entry is not present in the archive.
    #[error("Entry '{entry}' not found in {}", archive.display())]
    EntryMissing {
        /// The archive path.
        archive: PathBuf,
        /// The archive-internal entry path.
        entry: String,
    },

    /// The cache base directory (after user substitution) does not exist.
    #[error("Cache base directory not found: {}", path.display())]
    CacheBaseNotFound {
        /// The substituted base directory.
        path: PathBuf,
    },

    /// No subdirectory of the cache base matches the configured prefix.
    #[error("No directory matching prefix '{prefix}' in {}", base.display())]
    NoMatchingCacheDir {
        /// The cache base directory that was scanned.
        base: PathBuf,
        /// The directory-name prefix.
        prefix: String,
    },

    /// Creating or verifying the backup artifact failed.
    ///
    /// When this is returned from a patch, the archive has not been touched.
    #[error("Backup of {} failed: {source}", path.display())]
    BackupIo {
        /// The backup artifact path.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// Deleting a cache file failed.
    #[error("Failed to delete {}: {source}", path.display())]
    Deletion {
        /// The file that could not be removed.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// An image could not be decoded, fitted or encoded.
    #[error("Image error for {context}: {source}")]
    Image {
        /// The entry path or replacement file involved.
        context: String,
        /// The underlying codec failure.
        #[source]
        source: image::ImageError,
    },

    /// The encoded format of an archive entry could not be determined.
    #[error("Cannot determine the image format of entry '{entry}'")]
    UnknownImageFormat {
        /// The archive-internal entry path.
        entry: String,
    },

    /// A fit was requested with a zero width or height.
    #[error("Invalid target dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The configuration document could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A category/product pair is not present in the configuration.
    #[error("Unknown target {category}/{product}")]
    UnknownTarget {
        /// Requested category.
        category: String,
        /// Requested product.
        product: String,
    },
}

impl Error {
    /// Returns whether this error is a configuration/environment mismatch.
    ///
    /// These are never transient and must not be retried.
    pub fn is_environment_mismatch(&self) -> bool {
        matches!(
            self,
            Error::ArchiveNotFound { .. }
                | Error::ArchiveCorrupt { .. }
                | Error::EntryMissing { .. }
                | Error::CacheBaseNotFound { .. }
                | Error::NoMatchingCacheDir { .. }
                | Error::UnknownTarget { .. }
        )
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, err: zip::result::ZipError) -> Self {
        Error::ArchiveCorrupt {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

/// A specialized Result type for splashpatch operations.
pub type Result<T> = std::result::Result<T, Error>;
