//! One-shot archive backups and their restoration.
//!
//! A backup is a byte-identical copy of the archive stored next to it as
//! `<archive>.custom.backup`. The presence of that file *is* the backup
//! state; there is no manifest. At most one backup exists per archive:
//! [`ensure_backup`] never overwrites an existing one, so the backup always
//! holds the archive as it was before the first patch.
//!
//! [`restore`] renames every backup in a directory over its original, which
//! both restores the content and consumes the backup.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::{Error, Result};

/// Suffix appended to an archive path to form its backup path.
pub const BACKUP_SUFFIX: &str = ".custom.backup";

/// Outcome of [`ensure_backup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupState {
    /// A new backup was written and verified.
    Created,
    /// A backup already existed and was left untouched.
    AlreadyExists,
}

impl BackupState {
    /// Returns a lowercase label for reports.
    pub fn as_str(self) -> &'static str {
        match self {
            BackupState::Created => "created",
            BackupState::AlreadyExists => "already-exists",
        }
    }
}

/// An archive restored from its backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredItem {
    /// The backup file that was consumed.
    pub backup: PathBuf,
    /// The archive path that now holds the restored content.
    pub original: PathBuf,
}

/// Result of a [`restore`] pass over a directory.
#[must_use = "restore result should be checked for per-item failures"]
#[derive(Debug, Default)]
pub struct RestoreResult {
    /// Archives restored successfully.
    pub restored: Vec<RestoredItem>,
    /// Backups that could not be moved, with the reason.
    pub failures: Vec<(PathBuf, Error)>,
}

impl RestoreResult {
    /// Returns whether every backup found was restored.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns whether no backups were found at all.
    pub fn is_empty(&self) -> bool {
        self.restored.is_empty() && self.failures.is_empty()
    }
}

/// Returns the backup path for an archive.
pub fn backup_path(archive_path: impl AsRef<Path>) -> PathBuf {
    let mut name = archive_path.as_ref().as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Returns whether a backup currently exists for an archive.
pub fn has_backup(archive_path: impl AsRef<Path>) -> bool {
    backup_path(archive_path).is_file()
}

/// Creates a verified backup unless one already exists.
///
/// The copy carries the archive's modification time and is checked by
/// CRC-32 against the source before this returns [`BackupState::Created`].
///
/// # Errors
///
/// - [`Error::ArchiveNotFound`] if the archive does not exist
/// - [`Error::BackupIo`] if copying or verification fails; any partial
///   backup is removed so a later call starts over
pub fn ensure_backup(archive_path: impl AsRef<Path>) -> Result<BackupState> {
    let archive = archive_path.as_ref();
    if !archive.is_file() {
        return Err(Error::ArchiveNotFound {
            path: archive.to_path_buf(),
        });
    }

    let backup = backup_path(archive);
    if backup.exists() {
        log::info!(
            "Backup already exists at {}, skipping backup",
            backup.display()
        );
        return Ok(BackupState::AlreadyExists);
    }

    if let Err(source) = copy_verified(archive, &backup) {
        if backup.exists() {
            if let Err(e) = fs::remove_file(&backup) {
                log::warn!(
                    "Failed to remove partial backup '{}': {}",
                    backup.display(),
                    e
                );
            }
        }
        return Err(Error::BackupIo {
            path: backup,
            source,
        });
    }

    log::info!("Backup created at {}", backup.display());
    Ok(BackupState::Created)
}

fn copy_verified(source: &Path, backup: &Path) -> io::Result<()> {
    fs::copy(source, backup)?;

    let metadata = fs::metadata(source)?;
    let mtime = FileTime::from_last_modification_time(&metadata);
    if let Err(e) = filetime::set_file_mtime(backup, mtime) {
        log::debug!(
            "Could not carry modification time onto '{}': {}",
            backup.display(),
            e
        );
    }

    let expected = file_crc32(source)?;
    let actual = file_crc32(backup)?;
    if expected != actual {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "backup checksum mismatch: expected {:#010x}, got {:#010x}",
                expected, actual
            ),
        ));
    }
    Ok(())
}

fn file_crc32(path: &Path) -> io::Result<u32> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = crc32fast::Hasher::new();
    let mut buf = [0u8; crate::READ_BUFFER_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

/// Restores every backed-up archive in a directory.
///
/// Each backup is renamed over its original, so it no longer exists
/// afterward. A failing item is recorded and the remaining items are still
/// attempted. Finding no backups is not an error.
///
/// # Errors
///
/// Returns [`Error::ArchiveNotFound`] if `archive_dir` does not exist.
pub fn restore(archive_dir: impl AsRef<Path>) -> Result<RestoreResult> {
    let dir = archive_dir.as_ref();
    let read_dir = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::ArchiveNotFound {
                path: dir.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let mut backups: Vec<PathBuf> = read_dir
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(BACKUP_SUFFIX) && n.len() > BACKUP_SUFFIX.len())
        })
        .collect();
    backups.sort();

    let mut result = RestoreResult::default();
    if backups.is_empty() {
        log::info!("No backup found in {}, nothing to restore", dir.display());
        return Ok(result);
    }

    for backup in backups {
        let original = original_path(&backup);
        match fs::rename(&backup, &original) {
            Ok(()) => {
                log::info!("Restored {} from backup", original.display());
                result.restored.push(RestoredItem { backup, original });
            }
            Err(e) => {
                log::warn!("Failed to restore '{}': {}", original.display(), e);
                result.failures.push((
                    backup.clone(),
                    Error::BackupIo {
                        path: backup,
                        source: e,
                    },
                ));
            }
        }
    }

    Ok(result)
}

/// Strips the backup suffix from a backup path's file name.
fn original_path(backup: &Path) -> PathBuf {
    match backup
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(BACKUP_SUFFIX))
    {
        Some(name) => backup.with_file_name(name),
        None => backup.to_path_buf(),
    }
}
