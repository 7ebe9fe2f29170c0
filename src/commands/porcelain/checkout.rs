use crate::areas::refs::{HEAD_REF_NAME, RefValue};
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// Switch the working tree and HEAD to a branch or commit
    ///
    /// A branch name makes HEAD symbolic and checks out the branch tip, even
    /// when a tag of the same name exists; anything else detaches HEAD at the
    /// resolved oid.
    pub fn checkout(&self, name: &str) -> anyhow::Result<()> {
        self.ensure_no_merge_in_progress()?;

        let branch_ref = self.branch_ref(name)?;
        let oid = match &branch_ref {
            Some((_, tip)) => tip.clone(),
            None => self.resolve_name(name)?,
        };
        let commit = self.get_commit(&oid)?;
        self.read_tree(commit.tree_oid(), true)?;

        match branch_ref {
            Some((branch_ref, _)) => {
                self.refs()
                    .update_ref(HEAD_REF_NAME, &RefValue::symbolic(branch_ref), false)?;
                writeln!(self.writer(), "Switched to branch '{name}'")?;
            }
            None => {
                self.refs()
                    .update_ref(HEAD_REF_NAME, &RefValue::direct(&oid), false)?;
                writeln!(
                    self.writer(),
                    "HEAD is now at {} {}",
                    oid.to_short_oid(),
                    commit.short_message()
                )?;
            }
        }

        Ok(())
    }

    /// `refs/heads/<name>` and the commit it points at, when that branch exists
    fn branch_ref(&self, name: &str) -> anyhow::Result<Option<(String, ObjectId)>> {
        let Ok(branch) = BranchName::try_parse(name) else {
            return Ok(None);
        };

        let branch_ref = branch.to_branch_ref();
        let (_, value) = self.refs().resolve(&branch_ref, true)?;
        if !value.is_present() {
            return Ok(None);
        }

        Ok(value.oid()?.map(|tip| (branch_ref, tip)))
    }
}
