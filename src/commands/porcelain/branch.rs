use crate::areas::refs::RefValue;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::colors_enabled;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::StorageError;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// List branches, or create `name` at `start` when a name is given
    pub fn branch(&self, name: Option<&str>, start: &str) -> anyhow::Result<()> {
        let Some(name) = name else {
            return self.list_branches();
        };

        let oid = self.resolve_name(start)?;
        self.create_branch(name, &oid)?;

        writeln!(
            self.writer(),
            "Branch {name} created at {}",
            oid.to_short_oid()
        )?;

        Ok(())
    }

    /// Write `refs/heads/<name>`; an existing branch is not overwritten
    pub fn create_branch(&self, name: &str, oid: &ObjectId) -> anyhow::Result<()> {
        let branch = BranchName::try_parse(name)?;
        let branch_ref = branch.to_branch_ref();

        if self.refs().resolve(&branch_ref, false)?.1.is_present() {
            return Err(
                StorageError::invalid_ref(format!("branch '{branch}' already exists")).into(),
            );
        }

        self.refs()
            .update_ref(&branch_ref, &RefValue::direct(oid), false)
    }

    fn list_branches(&self) -> anyhow::Result<()> {
        let current = self.refs().current_branch()?;

        for branch in self.refs().list_branches()? {
            if current.as_deref() == Some(branch.as_str()) {
                let line = format!("* {branch}");
                if colors_enabled() {
                    writeln!(self.writer(), "{}", line.green())?;
                } else {
                    writeln!(self.writer(), "{line}")?;
                }
            } else {
                writeln!(self.writer(), "  {branch}")?;
            }
        }

        Ok(())
    }
}
