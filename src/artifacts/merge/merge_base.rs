//! Common ancestor lookup for merges
//!
//! The base is found by collecting every ancestor of one side, then walking
//! the other side's ancestry in [`Ancestors`] order and stopping at the first
//! commit the two share. With several merge bases (criss-cross histories)
//! this picks whichever the walk meets first rather than a provably lowest
//! one; fast-forward detection relies on exactly this choice.

use crate::artifacts::log::rev_list::Ancestors;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::HashSet;

pub struct MergeBaseFinder<ParentLoaderFn>
where
    ParentLoaderFn: FnMut(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    parent_loader: ParentLoaderFn,
}

impl<ParentLoaderFn> MergeBaseFinder<ParentLoaderFn>
where
    ParentLoaderFn: FnMut(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    pub fn new(parent_loader: ParentLoaderFn) -> Self {
        MergeBaseFinder { parent_loader }
    }

    /// First ancestor of `b` (in traversal order) that is also an ancestor of `a`
    pub fn merge_base(&mut self, a: &ObjectId, b: &ObjectId) -> anyhow::Result<Option<ObjectId>> {
        let a_ancestors = Ancestors::new([a.clone()], &mut self.parent_loader)
            .collect::<anyhow::Result<HashSet<_>>>()?;

        for candidate in Ancestors::new([b.clone()], &mut self.parent_loader) {
            let candidate = candidate?;
            if a_ancestors.contains(&candidate) {
                tracing::debug!(%a, %b, base = %candidate, "found merge base");
                return Ok(Some(candidate));
            }
        }

        tracing::debug!(%a, %b, "histories are unrelated");
        Ok(None)
    }

    /// Whether `maybe_ancestor` is `commit` or one of its ancestors
    pub fn is_ancestor(
        &mut self,
        commit: &ObjectId,
        maybe_ancestor: &ObjectId,
    ) -> anyhow::Result<bool> {
        for ancestor in Ancestors::new([commit.clone()], &mut self.parent_loader) {
            if &ancestor? == maybe_ancestor {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
