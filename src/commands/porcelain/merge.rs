use crate::areas::refs::{MERGE_HEAD_REF_NAME, RefValue};
use crate::areas::repository::Repository;
use crate::artifacts::merge::tree_merge::{TreeMerge, TreeMerger};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeBuilder;
use crate::errors::StorageError;
use anyhow::Context;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// HEAD was an ancestor of the other commit and now points at it
    FastForward(ObjectId),
    /// The other commit is already part of HEAD's history
    UpToDate,
    /// Merged into the index and working tree; MERGE_HEAD awaits a commit
    Merged { conflicts: Vec<String> },
}

impl Repository {
    /// Merge the commit `name` resolves to into HEAD
    ///
    /// ```text
    /// base == other        -> nothing to do
    /// base == HEAD         -> fast-forward, no merge commit
    /// otherwise            -> three-way merge, MERGE_HEAD set, HEAD untouched
    /// ```
    pub fn merge(&self, name: &str) -> anyhow::Result<MergeOutcome> {
        self.ensure_no_merge_in_progress()?;

        let other = self.resolve_name(name)?;
        let head = self
            .refs()
            .read_head()?
            .ok_or_else(|| StorageError::not_found("a commit at HEAD to merge into"))?;
        let base = self.merge_base(&other, &head)?.ok_or_else(|| {
            StorageError::not_found(format!("common ancestor of {head} and {other}"))
        })?;

        if base == other {
            writeln!(self.writer(), "Already up to date")?;
            return Ok(MergeOutcome::UpToDate);
        }

        if base == head {
            let commit = self.get_commit(&other)?;
            self.read_tree(commit.tree_oid(), true)?;
            self.update_head(&other, true)?;

            writeln!(
                self.writer(),
                "Fast-forward {}..{}",
                head.to_short_oid(),
                other.to_short_oid()
            )?;
            return Ok(MergeOutcome::FastForward(other));
        }

        let merge = self.read_tree_merged(&base, &head, &other, name, true)?;
        self.refs()
            .update_ref(MERGE_HEAD_REF_NAME, &RefValue::direct(&other), false)?;

        let mut writer = self.writer();
        for path in &merge.conflicts {
            writeln!(writer, "CONFLICT (content): Merge conflict in {path}")?;
        }
        if merge.conflicts.is_empty() {
            writeln!(writer, "Merged in working tree\nPlease commit")?;
        } else {
            writeln!(
                writer,
                "Automatic merge failed; fix conflicts and then commit the result."
            )?;
        }

        Ok(MergeOutcome::Merged {
            conflicts: merge.conflicts,
        })
    }

    /// Three-way merge of three commits' trees into the index
    ///
    /// `label` names the other side in conflict markers. A merged tree that
    /// holds a path as both a file and a directory is rejected before the
    /// index or working tree is touched.
    pub fn read_tree_merged(
        &self,
        base: &ObjectId,
        head: &ObjectId,
        other: &ObjectId,
        label: &str,
        checkout: bool,
    ) -> anyhow::Result<TreeMerge> {
        let base_tree = self.commit_tree(Some(base))?;
        let head_tree = self.commit_tree(Some(head))?;
        let other_tree = self.commit_tree(Some(other))?;

        let merge = TreeMerger::new(self.database(), label.to_string()).merge(
            &base_tree,
            &head_tree,
            &other_tree,
        )?;
        tracing::debug!(%base, %head, %other, conflicts = merge.conflicts.len(), "merged trees");
        TreeBuilder::build(&merge.tree)
            .with_context(|| format!("Unable to merge {label} into HEAD"))?;

        self.with_index(|index| {
            index.replace(merge.tree.clone());
            if checkout {
                self.checkout_index(index)?;
            }

            Ok(())
        })?;

        Ok(merge)
    }
}
