//! Commit object
//!
//! Commits tie a tree snapshot into history.
//!
//! ## Format
//!
//! ```text
//! tree <tree-oid>
//! parent <parent-oid>      (zero or more, first parent first)
//!
//! <commit message>
//! ```
//!
//! Any header key other than `tree` or `parent` means the object is corrupt.

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::StorageError;
use bytes::Bytes;
use derive_new::new;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Commit {
    tree: ObjectId,
    parents: Vec<ObjectId>,
    message: String,
}

impl Commit {
    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    /// The first parent, i.e. the branch that held HEAD when this was made
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content = format!("tree {}\n", self.tree);
        for parent in &self.parents {
            content.push_str(&format!("parent {parent}\n"));
        }
        content.push('\n');
        content.push_str(&self.message);
        content.push('\n');

        Ok(Bytes::from(content))
    }
}

impl Unpackable for Commit {
    fn deserialize(content: Bytes) -> anyhow::Result<Self> {
        let content = std::str::from_utf8(&content)
            .map_err(|_| StorageError::corrupt_commit("content is not valid UTF-8"))?;

        let (headers, message) = content
            .split_once("\n\n")
            .ok_or_else(|| StorageError::corrupt_commit("missing blank line after headers"))?;

        let mut tree = None;
        let mut parents = Vec::new();
        for line in headers.lines() {
            let (key, value) = line
                .split_once(' ')
                .ok_or_else(|| StorageError::corrupt_commit(format!("malformed header {line:?}")))?;
            if !(key == "parent" || key == "tree" && tree.is_none()) {
                return Err(StorageError::corrupt_commit(format!("unknown field {key:?}")).into());
            }
            let oid = ObjectId::try_parse(value)
                .map_err(|_| StorageError::corrupt_commit(format!("bad oid in {line:?}")))?;

            if key == "tree" {
                tree = Some(oid);
            } else {
                parents.push(oid);
            }
        }

        let tree = tree.ok_or_else(|| StorageError::corrupt_commit("missing tree field"))?;
        let message = message.strip_suffix('\n').unwrap_or(message);

        Ok(Commit::new(tree, parents, message.to_string()))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
