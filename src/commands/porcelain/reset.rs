use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Move HEAD, and the branch it points at, to `name`
    ///
    /// Neither the index nor the working tree is touched.
    pub fn reset(&self, name: &str) -> anyhow::Result<()> {
        self.ensure_no_merge_in_progress()?;

        let oid = self.resolve_name(name)?;
        self.update_head(&oid, true)?;

        writeln!(self.writer(), "HEAD is now at {}", oid.to_short_oid())?;

        Ok(())
    }
}
