//! Shared test utilities for integration tests.
//!
//! This module provides fixture builders used across multiple test files:
//! encoded images, ZIP archives laid out under a fake installation root,
//! and cache directory trees.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Encodes a solid-color image in the given format.
pub fn image_bytes(width: u32, height: u32, color: [u8; 4], format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)));
    splashpatch::patch::encode_image(&img, format).expect("Failed to encode test image")
}

/// Encodes a solid-color PNG.
pub fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    image_bytes(width, height, color, ImageFormat::Png)
}

/// Encodes a solid-color JPEG.
pub fn jpeg_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    image_bytes(width, height, color, ImageFormat::Jpeg)
}

/// A ZIP entry to place in a fixture archive.
pub struct ZipEntry<'a> {
    pub name: &'a str,
    pub data: Vec<u8>,
    pub method: CompressionMethod,
}

impl<'a> ZipEntry<'a> {
    pub fn stored(name: &'a str, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name,
            data: data.into(),
            method: CompressionMethod::Stored,
        }
    }

    pub fn deflated(name: &'a str, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name,
            data: data.into(),
            method: CompressionMethod::Deflated,
        }
    }

    pub fn directory(name: &'a str) -> Self {
        Self {
            name,
            data: Vec::new(),
            method: CompressionMethod::Stored,
        }
    }
}

/// Builds ZIP bytes from entries, written with the zip crate directly.
pub fn create_zip(entries: &[ZipEntry<'_>]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for entry in entries {
        let options = SimpleFileOptions::default().compression_method(entry.method);
        if entry.name.ends_with('/') {
            writer.add_directory(entry.name, options).unwrap();
        } else {
            writer.start_file(entry.name, options).unwrap();
            writer.write_all(&entry.data).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// An entry read back from an archive on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadEntry {
    pub name: String,
    pub data: Vec<u8>,
    pub method: CompressionMethod,
    pub is_dir: bool,
}

/// Reads every entry of an archive in stored order.
pub fn read_zip(path: &Path) -> Vec<ReadEntry> {
    let bytes = fs::read(path).expect("Failed to read archive");
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("Failed to open archive");
    let mut entries = Vec::new();
    for idx in 0..archive.len() {
        let mut file = archive.by_index(idx).unwrap();
        let mut data = Vec::new();
        file.read_to_end(&mut data).unwrap();
        entries.push(ReadEntry {
            name: file.name().to_string(),
            method: file.compression(),
            is_dir: file.is_dir(),
            data,
        });
    }
    entries
}

/// Looks up one entry read by [`read_zip`].
pub fn find<'a>(entries: &'a [ReadEntry], name: &str) -> &'a ReadEntry {
    entries
        .iter()
        .find(|e| e.name == name)
        .unwrap_or_else(|| panic!("entry {} not in archive", name))
}

/// A fake installation directory holding one archive.
pub struct Install {
    pub dir: TempDir,
    /// Installation root with a trailing `/`, as the engine expects.
    pub root: String,
    /// Full path of the archive.
    pub archive: PathBuf,
}

/// Creates an installation root with the archive at `source`.
pub fn install_with_archive(source: &str, entries: &[ZipEntry<'_>]) -> Install {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let root = format!("{}/", dir.path().display());
    let archive = PathBuf::from(format!("{}{}", root, source));
    if let Some(parent) = archive.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&archive, create_zip(entries)).expect("Failed to write archive");
    Install {
        dir,
        root,
        archive,
    }
}

/// Writes a replacement PNG next to the installation and returns its path.
pub fn write_replacement(dir: &Path, width: u32, height: u32) -> PathBuf {
    let path = dir.join("replacement.png");
    fs::write(&path, png_bytes(width, height, [220, 40, 40, 255])).unwrap();
    path
}

/// Creates `base/<name>/<sub_path>` for each name and fills it with files.
pub fn create_cache_tree(base: &Path, names: &[&str], sub_path: &str, files: &[&str]) {
    for name in names {
        let dir = base.join(name).join(sub_path);
        fs::create_dir_all(&dir).unwrap();
        for file in files {
            fs::write(dir.join(file), b"cached").unwrap();
        }
    }
}

/// Lists the file names in a directory, sorted.
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
