//! Whole-archive read and write access to ZIP containers.
//!
//! The store never patches an entry in place. Callers read the full
//! [`EntrySnapshot`], change payloads in memory, and hand the snapshot back
//! to [`write_all`], which rewrites the container from scratch.
//!
//! # Example
//!
//! ```rust,no_run
//! use splashpatch::archive;
//!
//! let mut snapshot = archive::read_all("app.jar")?;
//! snapshot.replace("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n".to_vec());
//! archive::write_all("app.jar", &snapshot)?;
//! # Ok::<(), splashpatch::Error>(())
//! ```
//!
//! # Durability
//!
//! The new container is encoded into memory before the file is opened for
//! writing, so encoder failures never truncate the archive. The final write
//! goes directly to the archive path; a crash during that write leaves the
//! archive recoverable only from its backup.

mod snapshot;

pub use snapshot::{EntrySnapshot, SnapshotEntry};

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;

use image::ImageFormat;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::{Error, Result};

/// Raw bytes of a single entry plus its detected image format.
#[derive(Debug, Clone)]
pub struct EntryPayload {
    /// Decompressed entry bytes.
    pub bytes: Vec<u8>,
    /// Image format from the payload's magic bytes, else from the entry extension.
    pub format: Option<ImageFormat>,
}

/// Reads every entry of an archive into memory.
///
/// # Errors
///
/// - [`Error::ArchiveNotFound`] if the file does not exist
/// - [`Error::ArchiveCorrupt`] if the container or an entry cannot be read
pub fn read_all(archive_path: impl AsRef<Path>) -> Result<EntrySnapshot> {
    let path = archive_path.as_ref();
    let mut archive = open(path)?;
    let mut snapshot = EntrySnapshot::new();

    for idx in 0..archive.len() {
        let mut file = archive.by_index(idx).map_err(|e| Error::corrupt(path, e))?;
        let name = file.name().to_string();
        let compression = file.compression();
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data).map_err(|e| Error::ArchiveCorrupt {
            path: path.to_path_buf(),
            reason: format!("failed to read entry '{}': {}", name, e),
        })?;
        snapshot.insert(name, data, compression);
    }

    log::debug!(
        "Read {} entries ({} bytes) from {}",
        snapshot.len(),
        snapshot.total_bytes(),
        path.display()
    );
    Ok(snapshot)
}

/// Reads only the named entries that are present in the archive.
///
/// Names absent from the archive are silently left out of the snapshot;
/// callers compare against their own list to report them.
pub fn read_selected(archive_path: impl AsRef<Path>, names: &[String]) -> Result<EntrySnapshot> {
    let path = archive_path.as_ref();
    let mut archive = open(path)?;
    let mut snapshot = EntrySnapshot::new();

    for name in names {
        let mut file = match archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => continue,
            Err(e) => return Err(Error::corrupt(path, e)),
        };
        let compression = file.compression();
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data).map_err(|e| Error::ArchiveCorrupt {
            path: path.to_path_buf(),
            reason: format!("failed to read entry '{}': {}", name, e),
        })?;
        snapshot.insert(name.as_str(), data, compression);
    }

    Ok(snapshot)
}

/// Reads a single entry and detects its image format.
///
/// # Errors
///
/// - [`Error::ArchiveNotFound`] / [`Error::ArchiveCorrupt`] as for [`read_all`]
/// - [`Error::EntryMissing`] if `entry_path` is not in the archive
pub fn read_entry(archive_path: impl AsRef<Path>, entry_path: &str) -> Result<EntryPayload> {
    let path = archive_path.as_ref();
    let mut archive = open(path)?;
    let mut file = match archive.by_name(entry_path) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => {
            return Err(Error::EntryMissing {
                archive: path.to_path_buf(),
                entry: entry_path.to_string(),
            });
        }
        Err(e) => return Err(Error::corrupt(path, e)),
    };

    let mut bytes = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut bytes).map_err(|e| Error::ArchiveCorrupt {
        path: path.to_path_buf(),
        reason: format!("failed to read entry '{}': {}", entry_path, e),
    })?;
    let format = detect_format(entry_path, &bytes);

    Ok(EntryPayload { bytes, format })
}

/// Returns the archive's entry names in stored order.
pub fn entry_names(archive_path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = archive_path.as_ref();
    let mut archive = open(path)?;
    let mut names = Vec::with_capacity(archive.len());
    for idx in 0..archive.len() {
        let file = archive.by_index(idx).map_err(|e| Error::corrupt(path, e))?;
        names.push(file.name().to_string());
    }
    Ok(names)
}

/// Rewrites the archive from scratch with exactly the snapshot's entries.
///
/// No entries are carried over implicitly: the snapshot is the new content.
/// Callers that mutate an archive must hold a verified backup first.
pub fn write_all(archive_path: impl AsRef<Path>, snapshot: &EntrySnapshot) -> Result<()> {
    let path = archive_path.as_ref();
    let encoded = encode(snapshot).map_err(|e| Error::corrupt(path, e))?;

    std::fs::write(path, &encoded)?;
    log::info!(
        "Wrote {} entries ({} bytes) to {}",
        snapshot.len(),
        encoded.len(),
        path.display()
    );
    Ok(())
}

/// Encodes a snapshot as a complete ZIP container.
pub fn encode(snapshot: &EntrySnapshot) -> std::result::Result<Vec<u8>, ZipError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for entry in snapshot.iter() {
        let options =
            SimpleFileOptions::default().compression_method(writable_method(entry.compression));
        if entry.is_directory {
            writer.add_directory(entry.name.as_str(), options)?;
        } else {
            writer.start_file(entry.name.as_str(), options)?;
            writer.write_all(&entry.data)?;
        }
    }

    Ok(writer.finish()?.into_inner())
}

/// Opens an archive, distinguishing a missing file from a corrupt one.
fn open(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::ArchiveNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };
    open_reader(BufReader::new(file), path)
}

fn open_reader<R: Read + Seek>(reader: R, path: &Path) -> Result<ZipArchive<R>> {
    ZipArchive::new(reader).map_err(|e| Error::corrupt(path, e))
}

/// Maps a source compression method onto one this build can write.
fn writable_method(method: CompressionMethod) -> CompressionMethod {
    match method {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    }
}

/// Detects the image format of an entry from its bytes, then its extension.
pub(crate) fn detect_format(entry_path: &str, bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes)
        .ok()
        .or_else(|| ImageFormat::from_path(entry_path).ok())
}
