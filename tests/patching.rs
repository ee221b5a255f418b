//! Integration tests for patching and restoring archives.
//!
//! These tests verify that the patch engine correctly:
//! - Creates exactly one backup and never overwrites it
//! - Replaces configured entries with fitted images in their original format
//! - Leaves every other entry byte-identical
//! - Restores the original archive byte for byte
//! - Leaves the archive untouched when a configured entry is missing

mod common;

use std::fs;

use image::ImageFormat;
use splashpatch::backup::{self, BackupState};
use splashpatch::fit::CenterCropFitter;
use splashpatch::{Error, TargetConfig, patch};
use zip::CompressionMethod;

use common::{ZipEntry, find, install_with_archive, jpeg_bytes, png_bytes, read_zip};

const SOURCE: &str = "lib/app.jar";
const SPLASH: &str = "artwork/splash.png";
const SPLASH_2X: &str = "artwork/splash@2x.png";

fn ide_entries() -> Vec<ZipEntry<'static>> {
    vec![
        ZipEntry::directory("META-INF/"),
        ZipEntry::deflated("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n".to_vec()),
        ZipEntry::directory("artwork/"),
        ZipEntry::stored(SPLASH, png_bytes(40, 30, [0, 0, 255, 255])),
        ZipEntry::stored(SPLASH_2X, png_bytes(80, 60, [0, 0, 255, 255])),
        ZipEntry::deflated("com/example/Main.class", vec![0xCA, 0xFE, 0xBA, 0xBE, 0, 0, 0, 61]),
    ]
}

fn ide_target() -> TargetConfig {
    TargetConfig::new(SOURCE, [SPLASH, SPLASH_2X])
}

// ============================================================================
// Backup tests
// ============================================================================

#[test]
fn test_backup_is_idempotent() {
    let install = install_with_archive(SOURCE, &ide_entries());
    let original = fs::read(&install.archive).unwrap();

    assert_eq!(
        backup::ensure_backup(&install.archive).unwrap(),
        BackupState::Created
    );
    fs::write(&install.archive, b"something else").unwrap();
    assert_eq!(
        backup::ensure_backup(&install.archive).unwrap(),
        BackupState::AlreadyExists
    );

    let backup_bytes = fs::read(backup::backup_path(&install.archive)).unwrap();
    assert_eq!(backup_bytes, original);
}

#[test]
fn test_second_patch_keeps_first_backup() {
    let install = install_with_archive(SOURCE, &ide_entries());
    let original = fs::read(&install.archive).unwrap();
    let replacement = common::write_replacement(install.dir.path(), 64, 64);

    let first =
        patch::patch(&install.root, &replacement, &ide_target(), &CenterCropFitter).unwrap();
    assert_eq!(first.backup, BackupState::Created);

    let second =
        patch::patch(&install.root, &replacement, &ide_target(), &CenterCropFitter).unwrap();
    assert_eq!(second.backup, BackupState::AlreadyExists);

    let backup_bytes = fs::read(backup::backup_path(&install.archive)).unwrap();
    assert_eq!(backup_bytes, original);
}

// ============================================================================
// Patch tests
// ============================================================================

#[test]
fn test_patch_replaces_items_and_keeps_others() {
    let install = install_with_archive(SOURCE, &ide_entries());
    let before = read_zip(&install.archive);
    let replacement = common::write_replacement(install.dir.path(), 300, 100);

    let result =
        patch::patch(&install.root, &replacement, &ide_target(), &CenterCropFitter).unwrap();

    assert_eq!(result.archive, install.archive);
    assert_eq!(result.total_entries, before.len());
    assert_eq!(result.replaced.len(), 2);
    assert_eq!(result.replaced[0].path, SPLASH);
    assert_eq!((result.replaced[0].width, result.replaced[0].height), (40, 30));
    assert_eq!((result.replaced[1].width, result.replaced[1].height), (80, 60));

    let after = read_zip(&install.archive);
    let before_names: Vec<_> = before.iter().map(|e| e.name.as_str()).collect();
    let after_names: Vec<_> = after.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(before_names, after_names);

    for entry in &before {
        let patched = find(&after, &entry.name);
        if entry.name == SPLASH || entry.name == SPLASH_2X {
            assert_ne!(patched.data, entry.data, "{} was not replaced", entry.name);
        } else {
            assert_eq!(patched.data, entry.data, "{} changed", entry.name);
        }
    }

    for (name, dims) in [(SPLASH, (40, 30)), (SPLASH_2X, (80, 60))] {
        let data = &find(&after, name).data;
        assert_eq!(image::guess_format(data).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), dims);
    }

    assert!(backup::has_backup(&install.archive));
}

#[test]
fn test_patch_keeps_jpeg_format() {
    let entries = vec![ZipEntry::stored("splash.jpg", jpeg_bytes(32, 16, [10, 200, 10, 255]))];
    let install = install_with_archive("app.jar", &entries);
    let replacement = common::write_replacement(install.dir.path(), 50, 50);

    let target = TargetConfig::new("app.jar", ["splash.jpg"]);
    let result = patch::patch(&install.root, &replacement, &target, &CenterCropFitter).unwrap();
    assert_eq!(result.replaced[0].format, ImageFormat::Jpeg);

    let entries = read_zip(&install.archive);
    let data = &find(&entries, "splash.jpg").data;
    assert_eq!(image::guess_format(data).unwrap(), ImageFormat::Jpeg);
    let decoded = image::load_from_memory(data).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (32, 16));
}

#[test]
fn test_patch_preserves_compression_and_directories() {
    let install = install_with_archive(SOURCE, &ide_entries());
    let replacement = common::write_replacement(install.dir.path(), 64, 64);

    let _ = patch::patch(&install.root, &replacement, &ide_target(), &CenterCropFitter).unwrap();

    let after = read_zip(&install.archive);
    assert_eq!(
        find(&after, "META-INF/MANIFEST.MF").method,
        CompressionMethod::Deflated
    );
    assert_eq!(
        find(&after, "com/example/Main.class").method,
        CompressionMethod::Deflated
    );
    assert_eq!(find(&after, SPLASH).method, CompressionMethod::Stored);
    assert!(find(&after, "META-INF/").is_dir);
    assert!(find(&after, "artwork/").is_dir);
}

#[test]
fn test_patch_missing_entry_leaves_archive_untouched() {
    let install = install_with_archive(SOURCE, &ide_entries());
    let original = fs::read(&install.archive).unwrap();
    let replacement = common::write_replacement(install.dir.path(), 64, 64);

    let target = TargetConfig::new(SOURCE, [SPLASH, "artwork/missing.png"]);
    let result = patch::patch(&install.root, &replacement, &target, &CenterCropFitter);

    match result.unwrap_err() {
        Error::EntryMissing { archive, entry } => {
            assert_eq!(archive, install.archive);
            assert_eq!(entry, "artwork/missing.png");
        }
        e => panic!("Expected EntryMissing, got: {:?}", e),
    }

    assert_eq!(fs::read(&install.archive).unwrap(), original);
    let backup_bytes = fs::read(backup::backup_path(&install.archive)).unwrap();
    assert_eq!(backup_bytes, original);
}

#[test]
fn test_patch_missing_archive() {
    let install = install_with_archive(SOURCE, &ide_entries());
    let replacement = common::write_replacement(install.dir.path(), 64, 64);

    let target = TargetConfig::new("lib/other.jar", [SPLASH]);
    let result = patch::patch(&install.root, &replacement, &target, &CenterCropFitter);

    match result.unwrap_err() {
        Error::ArchiveNotFound { path } => assert!(path.ends_with("lib/other.jar")),
        e => panic!("Expected ArchiveNotFound, got: {:?}", e),
    }
}

#[test]
fn test_patch_unreadable_replacement_leaves_archive_untouched() {
    let install = install_with_archive(SOURCE, &ide_entries());
    let original = fs::read(&install.archive).unwrap();
    let replacement = install.dir.path().join("not-an-image.png");
    fs::write(&replacement, b"plain text").unwrap();

    let result = patch::patch(&install.root, &replacement, &ide_target(), &CenterCropFitter);

    assert!(matches!(result, Err(Error::Image { .. })));
    assert_eq!(fs::read(&install.archive).unwrap(), original);
}

// ============================================================================
// Restore tests
// ============================================================================

#[test]
fn test_patch_then_restore_round_trip() {
    let install = install_with_archive(SOURCE, &ide_entries());
    let original = fs::read(&install.archive).unwrap();
    let replacement = common::write_replacement(install.dir.path(), 64, 64);

    let target = ide_target();
    let _ = patch::patch(&install.root, &replacement, &target, &CenterCropFitter).unwrap();
    assert_ne!(fs::read(&install.archive).unwrap(), original);

    let dir = format!("{}{}", install.root, target.source_dir());
    let result = backup::restore(&dir).unwrap();

    assert!(result.is_ok());
    assert_eq!(result.restored.len(), 1);
    assert_eq!(fs::read(&install.archive).unwrap(), original);
    assert!(!backup::has_backup(&install.archive));
}

#[test]
fn test_restore_without_patch_is_noop() {
    let install = install_with_archive(SOURCE, &ide_entries());
    let original = fs::read(&install.archive).unwrap();

    let result = backup::restore(install.archive.parent().unwrap()).unwrap();

    assert!(result.is_empty());
    assert_eq!(fs::read(&install.archive).unwrap(), original);
}

#[test]
fn test_restore_restores_every_backup_in_directory() {
    let install = install_with_archive(SOURCE, &ide_entries());
    let lib = install.archive.parent().unwrap().to_path_buf();
    let other = lib.join("resources.jar");
    fs::write(&other, b"resources").unwrap();

    backup::ensure_backup(&install.archive).unwrap();
    backup::ensure_backup(&other).unwrap();
    fs::write(&install.archive, b"patched").unwrap();
    fs::write(&other, b"patched").unwrap();

    let result = backup::restore(&lib).unwrap();

    assert_eq!(result.restored.len(), 2);
    assert_eq!(fs::read(&other).unwrap(), b"resources");
    assert!(common::list_files(&lib).iter().all(|n| !n.ends_with(".custom.backup")));
}

#[test]
fn test_restore_continues_after_failed_item() {
    let install = install_with_archive(SOURCE, &ide_entries());
    let lib = install.archive.parent().unwrap().to_path_buf();
    let first = lib.join("a.jar");
    let second = lib.join("b.jar");
    fs::write(&first, b"a").unwrap();
    fs::write(&second, b"b").unwrap();
    backup::ensure_backup(&first).unwrap();
    backup::ensure_backup(&second).unwrap();

    // A non-empty directory where a.jar was cannot be renamed over
    fs::remove_file(&first).unwrap();
    fs::create_dir(&first).unwrap();
    fs::write(first.join("keep"), b"x").unwrap();
    fs::write(&second, b"patched").unwrap();

    let result = backup::restore(&lib).unwrap();

    assert!(!result.is_ok());
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].0, backup::backup_path(&first));
    assert!(matches!(result.failures[0].1, Error::BackupIo { .. }));
    assert_eq!(result.restored.len(), 1);
    assert_eq!(result.restored[0].original, second);
    assert_eq!(fs::read(&second).unwrap(), b"b");
    assert!(backup::has_backup(&first));
}

// ============================================================================
// Inspect tests
// ============================================================================

#[test]
fn test_inspect_reports_entries_and_backup() {
    let install = install_with_archive(SOURCE, &ide_entries());

    let report = patch::inspect(&install.root, &ide_target()).unwrap();
    assert!(report.is_patchable());
    assert!(!report.has_backup);
    assert_eq!(report.entries[1].dimensions, Some((80, 60)));

    backup::ensure_backup(&install.archive).unwrap();
    let report = patch::inspect(&install.root, &ide_target()).unwrap();
    assert!(report.has_backup);
}
