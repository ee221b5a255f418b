//! # splashpatch
//!
//! Replace splash images inside application archives, restore the originals,
//! and invalidate the host application's version-qualified image caches.
//!
//! The engine works on ZIP-format containers (JAR files) installed under an
//! application directory. Every mutation is preceded by a one-shot backup
//! (`<archive>.custom.backup`), so a patched installation can always be put
//! back byte for byte.
//!
//! ## Quick Start
//!
//! ### Patching an Archive
//!
//! ```rust,no_run
//! use splashpatch::{CenterCropFitter, PatchConfig, Result, cache, patch};
//!
//! fn main() -> Result<()> {
//!     let config = PatchConfig::from_path("config.json")?;
//!     let target = config.target("JetBrains", "IntelliJ IDEA")?;
//!
//!     let result = patch::patch("/opt/idea/", "my_splash.png", target, &CenterCropFitter)?;
//!     println!("Replaced {} entries in {}", result.replaced.len(), result.archive.display());
//!
//!     if let Some(descriptor) = &target.cache {
//!         let invalidated = cache::invalidate(&config.default_user, descriptor)?;
//!         println!("Deleted {} cache files", invalidated.deleted.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Restoring the Originals
//!
//! ```rust,no_run
//! use splashpatch::{Result, backup};
//!
//! fn main() -> Result<()> {
//!     let result = backup::restore("/opt/idea/lib")?;
//!     for item in &result.restored {
//!         println!("Restored {}", item.original.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli` | No | Command-line interface tool |
//!
//! ## Modules
//!
//! - [`archive`]: whole-archive snapshots and rewrites
//! - [`backup`]: backup creation and restoration
//! - [`fit`]: center-crop and resample of replacement images
//! - [`patch`]: entry replacement and inspection
//! - [`extract`]: copying configured entries out for review
//! - [`cache`]: version-aware cache directory selection and purge
//! - [`config`]: the JSON target configuration
//! - [`install`]: installation directory normalization

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Default buffer size for read operations (8 KiB).
pub(crate) const READ_BUFFER_SIZE: usize = 8192;

pub mod archive;
pub mod backup;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod fit;
pub mod install;
pub mod patch;

pub use error::{Error, Result};

// Re-export configuration types at crate root for convenience
pub use config::{CacheDescriptor, CacheSelection, PatchConfig, TargetConfig};

// Re-export archive API
pub use archive::{EntryPayload, EntrySnapshot, SnapshotEntry};

// Re-export backup API
pub use backup::{BackupState, RestoreResult, RestoredItem};

// Re-export patch and extract API
pub use extract::{ExtractResult, ExtractedFile};
pub use patch::{InspectResult, InspectedEntry, PatchResult, ReplacedEntry};

// Re-export image fitting
pub use fit::{CenterCropFitter, ImageFitter};

// Re-export cache API
pub use cache::{CacheCandidate, DottedVersion, InvalidationResult};
