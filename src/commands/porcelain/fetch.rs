use crate::areas::refs::{HEADS_PREFIX, REMOTE_PREFIX, RefValue};
use crate::areas::repository::Repository;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Copy the branches of the repository at `remote_path` into this one
    ///
    /// Every object reachable from the remote branch tips is copied unless
    /// already present, then each tip is recorded as `refs/remote/<branch>`.
    pub fn fetch(&self, remote_path: &Path) -> anyhow::Result<()> {
        let remote = Repository::open(remote_path, Box::new(std::io::sink()))?;

        let mut tips = Vec::new();
        for (refname, value) in remote.refs().iter_refs(HEADS_PREFIX, true)? {
            if let Some(oid) = value.oid()? {
                tips.push((refname, oid));
            }
        }

        // each oid comes out before the walk loads it, so it can be copied in first
        let mut copied = 0;
        for oid in self.iter_objects_reachable_from(tips.iter().map(|(_, oid)| oid.clone())) {
            if self.database().fetch_from(&oid?, remote.database())? {
                copied += 1;
            }
        }

        for (refname, oid) in &tips {
            let branch = refname.strip_prefix(HEADS_PREFIX).unwrap_or(refname);
            self.refs().update_ref(
                &format!("{REMOTE_PREFIX}{branch}"),
                &RefValue::direct(oid),
                false,
            )?;
        }
        tracing::debug!(remote = %remote.path().display(), copied, "fetched");

        writeln!(
            self.writer(),
            "Fetched {copied} objects and {} branches from {}",
            tips.len(),
            remote.path().display()
        )?;

        Ok(())
    }
}
