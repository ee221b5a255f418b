//! Replacing splash-image entries inside an archive.
//!
//! A patch runs in a fixed order:
//! 1. Resolve the archive path from the installation root and target source
//! 2. Ensure a verified backup exists
//! 3. Read the full entry snapshot
//! 4. For every configured item: decode the current image, fit the
//!    replacement to its dimensions, re-encode in its original format
//! 5. Rewrite the archive from the updated snapshot
//!
//! Every failure in step 4 happens before the rewrite, so a failed patch
//! leaves the archive on disk untouched.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, ImageReader};

use crate::archive::{self, EntrySnapshot};
use crate::backup::{self, BackupState};
use crate::fit::ImageFitter;
use crate::{Error, Result, TargetConfig};

/// One entry replaced by a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacedEntry {
    /// Archive-internal entry path.
    pub path: String,
    /// Pixel width of the original (and new) image.
    pub width: u32,
    /// Pixel height of the original (and new) image.
    pub height: u32,
    /// Encoded format, shared by the original and the replacement.
    pub format: ImageFormat,
    /// Size in bytes of the new payload.
    pub bytes: usize,
}

/// Result of a successful patch.
#[must_use = "patch result should be checked to verify operation completed as expected"]
#[derive(Debug, Clone)]
pub struct PatchResult {
    /// The archive that was rewritten.
    pub archive: PathBuf,
    /// Whether this patch created the backup or found one already.
    pub backup: BackupState,
    /// Replaced entries, in configuration order.
    pub replaced: Vec<ReplacedEntry>,
    /// Entries in the rewritten archive.
    pub total_entries: usize,
}

/// Current state of one configured entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectedEntry {
    /// Archive-internal entry path.
    pub path: String,
    /// Whether the entry exists in the archive.
    pub present: bool,
    /// Detected image format.
    pub format: Option<ImageFormat>,
    /// Pixel dimensions, when the header could be decoded.
    pub dimensions: Option<(u32, u32)>,
    /// Stored payload size in bytes.
    pub bytes: usize,
}

/// Report produced by [`inspect`].
#[derive(Debug, Clone)]
pub struct InspectResult {
    /// The inspected archive.
    pub archive: PathBuf,
    /// Whether a backup exists next to the archive.
    pub has_backup: bool,
    /// One record per configured item, in configuration order.
    pub entries: Vec<InspectedEntry>,
}

impl InspectResult {
    /// Returns whether every configured item is present and decodable.
    pub fn is_patchable(&self) -> bool {
        self.entries
            .iter()
            .all(|e| e.present && e.format.is_some() && e.dimensions.is_some())
    }
}

/// Resolves the archive path for a target under an installation root.
///
/// The root is expected to end with a separator; the two strings are
/// concatenated as-is.
pub fn archive_path(archive_root: &str, target: &TargetConfig) -> PathBuf {
    PathBuf::from(format!("{}{}", archive_root, target.source))
}

/// Replaces every configured entry with the fitted replacement image.
///
/// # Errors
///
/// - [`Error::ArchiveNotFound`] if the archive does not exist
/// - [`Error::BackupIo`] if the backup cannot be created; nothing is written
/// - [`Error::ArchiveCorrupt`] if the archive cannot be read
/// - [`Error::EntryMissing`] if an item is not in the archive
/// - [`Error::UnknownImageFormat`] / [`Error::Image`] if an entry cannot be
///   decoded or the replacement cannot be fitted or encoded
pub fn patch(
    archive_root: &str,
    replacement: impl AsRef<Path>,
    target: &TargetConfig,
    fitter: &dyn ImageFitter,
) -> Result<PatchResult> {
    let archive = archive_path(archive_root, target);
    let replacement = replacement.as_ref();

    let backup = backup::ensure_backup(&archive)?;
    let mut snapshot = archive::read_all(&archive)?;

    let mut replaced = Vec::with_capacity(target.items.len());
    for item in &target.items {
        let entry = replace_entry(&mut snapshot, &archive, item, replacement, fitter)?;
        log::info!(
            "Replaced {} ({}x{} {:?}, {} bytes)",
            entry.path,
            entry.width,
            entry.height,
            entry.format,
            entry.bytes
        );
        replaced.push(entry);
    }

    archive::write_all(&archive, &snapshot)?;

    Ok(PatchResult {
        archive,
        backup,
        replaced,
        total_entries: snapshot.len(),
    })
}

/// Reports the configured entries of a target without modifying anything.
///
/// Missing entries are reported with `present == false` rather than failing.
///
/// # Errors
///
/// - [`Error::ArchiveNotFound`] / [`Error::ArchiveCorrupt`] if the archive
///   cannot be opened
pub fn inspect(archive_root: &str, target: &TargetConfig) -> Result<InspectResult> {
    let archive = archive_path(archive_root, target);
    let mut entries = Vec::with_capacity(target.items.len());

    for item in &target.items {
        let entry = match archive::read_entry(&archive, item) {
            Ok(payload) => {
                let dimensions = payload.format.and_then(|format| {
                    ImageReader::with_format(Cursor::new(&payload.bytes[..]), format)
                        .into_dimensions()
                        .ok()
                });
                InspectedEntry {
                    path: item.clone(),
                    present: true,
                    format: payload.format,
                    dimensions,
                    bytes: payload.bytes.len(),
                }
            }
            Err(Error::EntryMissing { .. }) => {
                log::warn!("{} not found in the archive", item);
                InspectedEntry {
                    path: item.clone(),
                    present: false,
                    format: None,
                    dimensions: None,
                    bytes: 0,
                }
            }
            Err(e) => return Err(e),
        };
        entries.push(entry);
    }

    Ok(InspectResult {
        has_backup: backup::has_backup(&archive),
        archive,
        entries,
    })
}

/// Fits and re-encodes one entry inside the snapshot.
fn replace_entry(
    snapshot: &mut EntrySnapshot,
    archive: &Path,
    item: &str,
    replacement: &Path,
    fitter: &dyn ImageFitter,
) -> Result<ReplacedEntry> {
    let current = snapshot.get(item).ok_or_else(|| Error::EntryMissing {
        archive: archive.to_path_buf(),
        entry: item.to_string(),
    })?;

    let format = archive::detect_format(item, current).ok_or_else(|| Error::UnknownImageFormat {
        entry: item.to_string(),
    })?;
    let original = image::load_from_memory_with_format(current, format).map_err(|e| {
        Error::Image {
            context: item.to_string(),
            source: e,
        }
    })?;
    let (width, height) = (original.width(), original.height());
    log::debug!("Image {} size: {}x{} ({:?})", item, width, height, format);

    let fitted = fitter.fit(replacement, width, height)?;
    let data = encode_image(&fitted, format).map_err(|e| Error::Image {
        context: item.to_string(),
        source: e,
    })?;
    let bytes = data.len();
    snapshot.replace(item, data);

    Ok(ReplacedEntry {
        path: item.to_string(),
        width,
        height,
        format,
        bytes,
    })
}

/// Encodes an image in `format`, dropping alpha where the format has none.
pub fn encode_image(img: &DynamicImage, format: ImageFormat) -> image::ImageResult<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()).write_to(&mut buf, format)?,
        _ => img.write_to(&mut buf, format)?,
    }
    Ok(buf.into_inner())
}
