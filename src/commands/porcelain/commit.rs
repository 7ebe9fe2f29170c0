use crate::areas::refs::MERGE_HEAD_REF_NAME;
use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// Record the index as a new commit on top of HEAD
    ///
    /// A pending merge contributes MERGE_HEAD as the second parent and is
    /// cleared afterwards. HEAD is updated through its symbolic chain, so the
    /// checked-out branch moves with it.
    pub fn commit(&self, message: &str) -> anyhow::Result<ObjectId> {
        let index = self.open_index()?;
        let tree = self.build_tree(&index)?;

        let head = self.refs().read_head()?;
        let merge_head = self.refs().read_merge_head()?;
        let parents = head.iter().chain(merge_head.iter()).cloned().collect();

        let commit = Commit::new(tree, parents, message.trim_end().to_string());
        let commit_oid = self.database().store(&commit)?;

        if merge_head.is_some() {
            self.refs().delete_ref(MERGE_HEAD_REF_NAME, false)?;
        }
        self.update_head(&commit_oid, true)?;
        tracing::debug!(oid = %commit_oid, parents = commit.parents().len(), "committed");

        let branch = self
            .refs()
            .current_branch()?
            .unwrap_or_else(|| "detached HEAD".to_string());
        let is_root = if head.is_none() { " (root-commit)" } else { "" };
        writeln!(
            self.writer(),
            "[{branch}{is_root} {}] {}",
            commit_oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(commit_oid)
    }
}
