use crate::areas::refs::RefValue;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::StorageError;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Send `branch` to the repository at `remote_path`
    ///
    /// Only objects the remote cannot already reach from its own refs are
    /// copied. The push is refused unless it fast-forwards the remote branch.
    pub fn push(&self, remote_path: &Path, branch: &str) -> anyhow::Result<()> {
        let remote = Repository::open(remote_path, Box::new(std::io::sink()))?;
        let refname = BranchName::try_parse(branch)?.to_branch_ref();

        let local_oid = self
            .refs()
            .resolve(&refname, true)?
            .1
            .oid()?
            .ok_or_else(|| StorageError::not_found(refname.clone()))?;

        let mut remote_tips = Vec::new();
        for (_, value) in remote.refs().iter_refs("", true)? {
            remote_tips.extend(value.oid()?);
        }

        let remote_oid = remote.refs().resolve(&refname, true)?.1.oid()?;
        if let Some(remote_oid) = &remote_oid
            && !(self.database().exists(remote_oid) && self.is_ancestor(&local_oid, remote_oid)?)
        {
            anyhow::bail!(
                "rejected: {refname} at {} is not an ancestor of {}",
                remote_oid.to_short_oid(),
                local_oid.to_short_oid()
            );
        }

        // what the remote already has, as far as this side can tell
        let known_tips = remote_tips
            .into_iter()
            .filter(|oid| self.database().exists(oid))
            .collect::<Vec<_>>();
        let remote_objects = self
            .iter_objects_reachable_from(known_tips)
            .collect::<anyhow::Result<HashSet<_>>>()?;

        let mut copied = 0;
        for oid in self.iter_objects_reachable_from([local_oid.clone()]) {
            let oid = oid?;
            if !remote_objects.contains(&oid)
                && self.database().replicate_to(&oid, remote.database())?
            {
                copied += 1;
            }
        }

        remote
            .refs()
            .update_ref(&refname, &RefValue::direct(&local_oid), false)?;
        tracing::debug!(remote = %remote.path().display(), %refname, copied, "pushed");

        writeln!(
            self.writer(),
            "Pushed {copied} objects to {refname} in {}",
            remote.path().display()
        )?;

        Ok(())
    }
}
