use crate::areas::repository::Repository;
use crate::artifacts::core::colors_enabled;
use crate::artifacts::diff::patch::PatchWriter;

impl Repository {
    /// Print a patch between two snapshots
    ///
    /// | commit | cached | from          | to           |
    /// |--------|--------|---------------|--------------|
    /// | none   | no     | index         | working tree |
    /// | none   | yes    | HEAD's tree   | index        |
    /// | given  | no     | commit's tree | working tree |
    /// | given  | yes    | commit's tree | index        |
    pub fn diff(&self, commit: Option<&str>, cached: bool) -> anyhow::Result<()> {
        let index = self.open_index()?.into_entries();

        let from = match commit {
            Some(name) => {
                let oid = self.resolve_name(name)?;
                self.commit_tree(Some(&oid))?
            }
            None if cached => self.commit_tree(self.refs().read_head()?.as_ref())?,
            None => index.clone(),
        };
        let to = if cached {
            index
        } else {
            self.working_snapshot()?
        };

        let mut writer = self.writer();
        PatchWriter::new(self.database(), colors_enabled()).write_tree_diff(
            &from,
            &to,
            &mut *writer,
        )
    }
}
