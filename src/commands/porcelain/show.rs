use crate::areas::repository::Repository;
use crate::artifacts::core::colors_enabled;
use crate::artifacts::diff::patch::PatchWriter;
use std::io::Write;

impl Repository {
    /// Print a commit and its changes against the first parent
    ///
    /// A root commit is compared with the empty tree.
    pub fn show(&self, name: &str) -> anyhow::Result<()> {
        let oid = self.resolve_name(name)?;
        let commit = self.get_commit(&oid)?;

        self.write_commit_header(&oid, &commit, &[])?;
        writeln!(self.writer())?;

        let parent_tree = self.commit_tree(commit.parent())?;
        let tree = self.database().flatten_tree(Some(commit.tree_oid()))?;

        let mut writer = self.writer();
        PatchWriter::new(self.database(), colors_enabled()).write_tree_diff(
            &parent_tree,
            &tree,
            &mut *writer,
        )?;

        Ok(())
    }
}
