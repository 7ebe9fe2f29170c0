use crate::areas::repository::Repository;
use crate::artifacts::core::colors_enabled;
use crate::artifacts::diff::tree_diff::{ChangeType, changed_files};
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Print the branch, any pending merge, and what changed
    ///
    /// Staged changes compare HEAD's tree with the index, unstaged ones the
    /// index with the working tree.
    pub fn status(&self) -> anyhow::Result<()> {
        let head = self.refs().read_head()?;

        match (self.refs().current_branch()?, &head) {
            (Some(branch), _) => writeln!(self.writer(), "On branch {branch}")?,
            (None, Some(head)) => {
                writeln!(self.writer(), "HEAD detached at {}", head.to_short_oid())?
            }
            (None, None) => writeln!(self.writer(), "HEAD detached")?,
        }

        if let Some(merge_head) = self.refs().read_merge_head()? {
            writeln!(self.writer(), "Merging with {}", merge_head.to_short_oid())?;
        }

        let head_tree = self.commit_tree(head.as_ref())?;
        let index = self.open_index()?.into_entries();
        let working = self.working_snapshot()?;

        self.write_changes("Changes to be committed:", changed_files(&head_tree, &index), true)?;
        self.write_changes(
            "Changes not staged for commit:",
            changed_files(&index, &working),
            false,
        )?;

        Ok(())
    }

    fn write_changes(
        &self,
        title: &str,
        changes: Vec<(String, ChangeType)>,
        staged: bool,
    ) -> anyhow::Result<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut writer = self.writer();
        writeln!(writer, "\n{title}\n")?;
        for (path, change) in changes {
            let line = format!("{:>12}: {path}", change.as_str());
            match (colors_enabled(), staged) {
                (true, true) => writeln!(writer, "{}", line.green())?,
                (true, false) => writeln!(writer, "{}", line.red())?,
                (false, _) => writeln!(writer, "{line}")?,
            }
        }

        Ok(())
    }
}
