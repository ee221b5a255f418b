//! In-memory snapshot of every entry in an archive.

use std::collections::HashMap;

use zip::CompressionMethod;

/// One entry of an [`EntrySnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    /// Archive-internal path.
    pub name: String,
    /// Raw (decompressed) payload.
    pub data: Vec<u8>,
    /// Compression method the entry was stored with.
    pub compression: CompressionMethod,
    /// Whether the entry is a directory marker (name ends with `/`).
    pub is_directory: bool,
}

/// Ordered mapping from entry path to payload, loaded fully into memory.
///
/// Entry order is the order of the archive's central directory, and
/// [`write_all`](super::write_all) writes entries back in
/// the same order. Keys are unique; replacing a key keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrySnapshot {
    entries: Vec<SnapshotEntry>,
    index: HashMap<String, usize>,
}

impl EntrySnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry, or replaces the payload of an existing one.
    ///
    /// Directory-ness is derived from a trailing `/` in `name`.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        data: impl Into<Vec<u8>>,
        compression: CompressionMethod,
    ) {
        let name = name.into();
        let data = data.into();
        if let Some(&idx) = self.index.get(&name) {
            let entry = &mut self.entries[idx];
            entry.data = data;
            entry.compression = compression;
            return;
        }
        let is_directory = name.ends_with('/');
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(SnapshotEntry {
            name,
            data,
            compression,
            is_directory,
        });
    }

    /// Replaces the payload of an existing entry, keeping its compression.
    ///
    /// Returns `false` without modifying anything when `name` is absent.
    pub fn replace(&mut self, name: &str, data: Vec<u8>) -> bool {
        match self.index.get(name) {
            Some(&idx) => {
                self.entries[idx].data = data;
                true
            }
            None => false,
        }
    }

    /// Returns the payload of an entry.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entry(name).map(|e| e.data.as_slice())
    }

    /// Returns the full entry record.
    pub fn entry(&self, name: &str) -> Option<&SnapshotEntry> {
        self.index.get(name).map(|&idx| &self.entries[idx])
    }

    /// Returns whether the snapshot has an entry with this path.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterates over entries in archive order.
    pub fn iter(&self) -> impl Iterator<Item = &SnapshotEntry> {
        self.entries.iter()
    }

    /// Returns the entry names in archive order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total payload size in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.data.len() as u64).sum()
    }
}
