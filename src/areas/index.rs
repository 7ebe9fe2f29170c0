//! Index (staging area)
//!
//! The index tracks which blob each path will hold in the next commit. It is a
//! flat, ordered `path -> oid` map, paths relative to the repository root and
//! joined with `/`.
//!
//! ## Lifecycle
//!
//! The index is read fully, mutated in memory and written fully. Writes go to
//! a temporary file that is renamed over the old index, so a reader only ever
//! sees the previous or the next complete version. The repository wraps this
//! in a transaction (see `Repository::with_index`).
//!
//! ## Conflicts
//!
//! A path cannot be both a file and a directory. Setting `a/b` drops a file
//! entry `a`, and setting `a` drops every entry under `a/`.

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{BINARY_OID_SIZE, HEADER_SIZE};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{FlatTree, validate_entry_name};
use anyhow::{Context, anyhow};
use byteorder::{ByteOrder, WriteBytesExt};
use fake::rand;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.ugit/index`)
    path: Box<Path>,
    entries: FlatTree,
    /// Set when the entries differ from what is on disk
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: FlatTree::new(),
            changed: false,
        }
    }

    /// Read the index at `path`; a missing file is an empty index
    pub fn load(path: Box<Path>) -> anyhow::Result<Self> {
        let mut index = Self::new(path);
        index.rehydrate()?;

        Ok(index)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.entries.clear();
        self.changed = false;

        if !self.path.exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new()
            .read(true)
            .open(&self.path)
            .with_context(|| format!("Unable to open index {}", self.path.display()))?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;
        let file: &mut std::fs::File = lock.deref_mut();

        // an empty file is what a freshly created index looks like
        if file.metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(file);
        let entries_count = Self::parse_header(&mut reader)?;
        self.parse_entries(entries_count, &mut reader)?;

        reader
            .verify()
            .with_context(|| format!("Corrupt index {}", self.path.display()))
    }

    fn parse_header(reader: &mut Checksum<&mut std::fs::File>) -> anyhow::Result<u32> {
        let header = IndexHeader::deserialize(reader.read(HEADER_SIZE)?)?;
        header.validate()?;

        Ok(header.entries_count)
    }

    fn parse_entries(
        &mut self,
        entries_count: u32,
        reader: &mut Checksum<&mut std::fs::File>,
    ) -> anyhow::Result<()> {
        for _ in 0..entries_count {
            let path_length = byteorder::NetworkEndian::read_u16(&reader.read(2)?);
            let path = String::from_utf8(reader.read(path_length as usize)?.to_vec())
                .map_err(|_| anyhow!("Index entry path is not valid UTF-8"))?;
            let oid = ObjectId::read_h40_from(&mut reader.read(BINARY_OID_SIZE)?.as_ref())?;

            self.entries.insert(path, oid);
        }

        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&ObjectId> {
        self.entries.get(path)
    }

    pub fn entries(&self) -> &FlatTree {
        &self.entries
    }

    pub fn into_entries(self) -> FlatTree {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Stage `oid` at `path`, evicting entries it clashes with
    pub fn set(&mut self, path: &str, oid: ObjectId) -> anyhow::Result<()> {
        Self::validate_path(path)?;
        self.discard_conflicts(path);
        self.entries.insert(path.to_string(), oid);
        self.changed = true;

        Ok(())
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.changed = true;
        }
        self.entries.clear();
    }

    /// Swap the whole content for `entries`, as reading a tree does
    pub fn replace(&mut self, entries: FlatTree) {
        self.entries = entries;
        self.changed = true;
    }

    fn validate_path(path: &str) -> anyhow::Result<()> {
        path.split('/').try_for_each(validate_entry_name)
    }

    fn discard_conflicts(&mut self, path: &str) {
        // every proper prefix `a`, `a/b` of `a/b/c` might be a file entry
        let parents = path
            .match_indices('/')
            .map(|(position, _)| path[..position].to_string())
            .collect::<Vec<_>>();
        for parent in parents {
            if self.entries.remove(&parent).is_some() {
                self.changed = true;
            }
        }

        self.remove_children(path);
    }

    fn remove_children(&mut self, path: &str) {
        let prefix = format!("{path}/");
        let children = self
            .entries
            .range(prefix.clone()..)
            .take_while(|(child, _)| child.starts_with(&prefix))
            .map(|(child, _)| child.clone())
            .collect::<Vec<_>>();

        for child in children {
            self.entries.remove(&child);
            self.changed = true;
        }
    }

    /// Persist the entries atomically, replacing whatever was on disk
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let index_dir = self
            .path
            .parent()
            .with_context(|| format!("Invalid index path {}", self.path.display()))?;
        let temp_path = index_dir.join(format!("index-{}.tmp", rand::random::<u32>()));

        let mut temp_file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .with_context(|| format!("Unable to create {}", temp_path.display()))?;
        let mut lock = file_guard::lock(&mut temp_file, file_guard::Lock::Exclusive, 0, 1)?;
        let file: &mut std::fs::File = lock.deref_mut();

        let mut writer = Checksum::new(file);
        let header = IndexHeader::for_entries(self.entries.len() as u32);
        writer.write(&header.serialize()?)?;

        for (path, oid) in &self.entries {
            writer.write(&Self::serialize_entry(path, oid)?)?;
        }

        writer.write_checksum()?;
        writer.into_inner().flush()?;
        drop(lock);

        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Unable to replace index {}", self.path.display()))?;
        tracing::debug!(entries = self.entries.len(), "index written");
        self.changed = false;

        Ok(())
    }

    fn serialize_entry(path: &str, oid: &ObjectId) -> anyhow::Result<Vec<u8>> {
        let path_length = u16::try_from(path.len())
            .map_err(|_| anyhow!("Path too long for the index: {path}"))?;

        let mut bytes = Vec::with_capacity(2 + path.len() + BINARY_OID_SIZE);
        bytes.write_u16::<byteorder::NetworkEndian>(path_length)?;
        bytes.write_all(path.as_bytes())?;
        oid.write_h40_to(&mut bytes)?;

        Ok(bytes)
    }
}
