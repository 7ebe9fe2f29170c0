//! Tree object
//!
//! Trees are directory snapshots: a listing of named blobs and subtrees.
//!
//! ## Format
//!
//! One line per entry, sorted by name:
//!
//! ```text
//! <type> <oid> <name>\n
//! ```
//!
//! Sorting by name is what makes the encoding canonical: the same set of
//! entries always produces the same bytes, and therefore the same oid, no
//! matter in which order the entries were collected.
//!
//! ## Tree Building
//!
//! [`TreeBuilder`] turns the flat `path -> oid` map held by the index into a
//! nested [`TreeNode`] structure, then writes it bottom-up: every directory's
//! children are stored before the directory itself so their oids are known.

use crate::areas::database::Database;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::StorageError;
use bytes::Bytes;
use std::collections::BTreeMap;

/// Flat `path -> blob oid` view of a tree, paths joined with `/`
pub type FlatTree = BTreeMap<String, ObjectId>;

/// Entry names must be single, real path components
///
/// Newlines and NULs are refused too: a tree line ends at `\n`, so such a
/// name would store a tree that cannot be parsed back.
pub fn validate_entry_name(name: &str) -> anyhow::Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\n', '\0']) {
        return Err(StorageError::corrupt_tree(format!("invalid entry name {name:?}")).into());
    }

    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: BTreeMap<String, DatabaseEntry>,
}

impl Tree {
    pub fn insert(&mut self, name: &str, entry: DatabaseEntry) -> anyhow::Result<()> {
        validate_entry_name(name)?;
        self.entries.insert(name.to_string(), entry);

        Ok(())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &DatabaseEntry)> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> impl Iterator<Item = (String, DatabaseEntry)> {
        self.entries.into_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let content = self
            .entries
            .iter()
            .map(|(name, entry)| format!("{} {} {}\n", entry.object_type, entry.oid, name))
            .collect::<String>();

        Ok(Bytes::from(content))
    }
}

impl Unpackable for Tree {
    fn deserialize(content: Bytes) -> anyhow::Result<Self> {
        let content = std::str::from_utf8(&content)
            .map_err(|_| StorageError::corrupt_tree("entries are not valid UTF-8"))?;

        let mut tree = Tree::default();
        for line in content.split_terminator('\n') {
            let mut fields = line.splitn(3, ' ');
            let (Some(object_type), Some(oid), Some(name)) =
                (fields.next(), fields.next(), fields.next())
            else {
                return Err(StorageError::corrupt_tree(format!("malformed entry {line:?}")).into());
            };

            let object_type = match object_type {
                "blob" => ObjectType::Blob,
                "tree" => ObjectType::Tree,
                other => {
                    return Err(StorageError::corrupt_tree(format!(
                        "unknown entry type {other:?} for {name:?}"
                    ))
                    .into());
                }
            };
            let oid = ObjectId::try_parse(oid)
                .map_err(|_| StorageError::corrupt_tree(format!("bad oid in entry {line:?}")))?;

            tree.insert(name, DatabaseEntry::new(oid, object_type))?;
        }

        Ok(tree)
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}

/// A node of the tree being built from the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    File(ObjectId),
    Directory(BTreeMap<String, TreeNode>),
}

#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    root: BTreeMap<String, TreeNode>,
}

impl TreeBuilder {
    /// Group flat `a/b/c` paths into nested directory nodes
    pub fn build<'e>(
        entries: impl IntoIterator<Item = (&'e String, &'e ObjectId)>,
    ) -> anyhow::Result<Self> {
        let mut builder = Self::default();

        for (path, oid) in entries {
            builder.add_entry(path, oid)?;
        }

        Ok(builder)
    }

    fn add_entry(&mut self, path: &str, oid: &ObjectId) -> anyhow::Result<()> {
        let mut components = path.split('/').collect::<Vec<_>>();
        let file_name = components
            .pop()
            .ok_or_else(|| StorageError::corrupt_tree(format!("empty path {path:?}")))?;

        let mut level = &mut self.root;
        for dir in components {
            validate_entry_name(dir)?;
            let node = level
                .entry(dir.to_string())
                .or_insert_with(|| TreeNode::Directory(BTreeMap::new()));

            level = match node {
                TreeNode::Directory(children) => children,
                TreeNode::File(_) => {
                    return Err(StorageError::corrupt_tree(format!(
                        "{dir:?} is both a file and a directory in {path:?}"
                    ))
                    .into());
                }
            };
        }

        validate_entry_name(file_name)?;
        if let Some(TreeNode::Directory(_)) = level.get(file_name) {
            return Err(StorageError::corrupt_tree(format!(
                "{path:?} is both a file and a directory"
            ))
            .into());
        }
        level.insert(file_name.to_string(), TreeNode::File(oid.clone()));

        Ok(())
    }

    /// Store every directory bottom-up and return the root tree's oid
    pub fn write(&self, database: &Database) -> anyhow::Result<ObjectId> {
        Self::write_level(&self.root, database)
    }

    fn write_level(
        level: &BTreeMap<String, TreeNode>,
        database: &Database,
    ) -> anyhow::Result<ObjectId> {
        let mut tree = Tree::default();

        for (name, node) in level {
            let entry = match node {
                TreeNode::File(oid) => DatabaseEntry::new(oid.clone(), ObjectType::Blob),
                TreeNode::Directory(children) => {
                    DatabaseEntry::new(Self::write_level(children, database)?, ObjectType::Tree)
                }
            };
            tree.insert(name, entry)?;
        }

        database.store(&tree)
    }
}
