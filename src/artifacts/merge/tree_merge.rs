//! Three-way merge of flattened trees
//!
//! Paths are decided one at a time from the oids the base, head and other
//! trees hold for them (absent counts as a value too):
//!
//! | changed vs base | result                                     |
//! |-----------------|--------------------------------------------|
//! | neither         | base (= head)                              |
//! | head only       | head                                       |
//! | other only      | other                                      |
//! | both, same      | that oid                                   |
//! | both, differ    | text merge, possibly with conflict markers |
//!
//! When one side deletes a path the other modified, the modified version is
//! kept. Binary content cannot be merged line by line; head's version is
//! kept and the path is reported as conflicted.

use crate::areas::database::Database;
use crate::artifacts::diff::tree_diff::compare_trees;
use crate::artifacts::merge::text_merge::merge_text;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::FlatTree;
use bitflags::bitflags;
use derive_new::new;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChangedSides: u8 {
        const NONE = 0b00;
        const HEAD = 0b01;
        const OTHER = 0b10;
        const BOTH = Self::HEAD.bits() | Self::OTHER.bits();
    }
}

impl ChangedSides {
    pub fn classify(
        base: Option<&ObjectId>,
        head: Option<&ObjectId>,
        other: Option<&ObjectId>,
    ) -> Self {
        let mut sides = ChangedSides::NONE;
        if head != base {
            sides |= ChangedSides::HEAD;
        }
        if other != base {
            sides |= ChangedSides::OTHER;
        }

        sides
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeMerge {
    pub tree: FlatTree,
    /// Paths whose merged content holds conflict markers or could not be merged
    pub conflicts: Vec<String>,
}

#[derive(Debug, new)]
pub struct TreeMerger<'r> {
    database: &'r Database,
    /// Names the other side in conflict markers
    other_label: String,
}

impl TreeMerger<'_> {
    pub fn merge(
        &self,
        base: &FlatTree,
        head: &FlatTree,
        other: &FlatTree,
    ) -> anyhow::Result<TreeMerge> {
        let mut merge = TreeMerge::default();

        for (path, [base_oid, head_oid, other_oid]) in compare_trees([base, head, other]) {
            let sides = ChangedSides::classify(base_oid, head_oid, other_oid);

            let merged = if sides == ChangedSides::NONE || sides == ChangedSides::HEAD {
                head_oid.cloned()
            } else if sides == ChangedSides::OTHER || head_oid == other_oid {
                other_oid.cloned()
            } else {
                self.merge_both_changed(path, base_oid, head_oid, other_oid, &mut merge)?
            };

            if let Some(oid) = merged {
                merge.tree.insert(path.clone(), oid);
            }
        }

        Ok(merge)
    }

    fn merge_both_changed(
        &self,
        path: &str,
        base: Option<&ObjectId>,
        head: Option<&ObjectId>,
        other: Option<&ObjectId>,
        merge: &mut TreeMerge,
    ) -> anyhow::Result<Option<ObjectId>> {
        let (head, other) = match (head, other) {
            (Some(head), Some(other)) => (head, other),
            (head, other) => {
                let kept = head.or(other);
                tracing::warn!(
                    path,
                    "deleted on one side and modified on the other, keeping the modification"
                );
                return Ok(kept.cloned());
            }
        };

        let base_blob = base
            .map(|oid| self.database.parse_object_as_blob(oid))
            .transpose()?
            .unwrap_or_else(|| Blob::new(Default::default()));
        let head_blob = self.database.parse_object_as_blob(head)?;
        let other_blob = self.database.parse_object_as_blob(other)?;

        let (Some(base_text), Some(head_text), Some(other_text)) =
            (base_blob.as_text(), head_blob.as_text(), other_blob.as_text())
        else {
            tracing::warn!(path, "binary content changed on both sides, keeping HEAD's version");
            merge.conflicts.push(path.to_string());
            return Ok(Some(head.clone()));
        };

        let merged = merge_text(base_text, head_text, other_text, &self.other_label);
        if !merged.is_clean() {
            tracing::debug!(path, conflicts = merged.conflicts, "merged with conflicts");
            merge.conflicts.push(path.to_string());
        }

        let oid = self
            .database
            .store_raw(ObjectType::Blob, merged.content.as_bytes())?;
        Ok(Some(oid))
    }
}
