use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// Print the merge base of two named commits, if they share history
    pub fn show_merge_base(&self, a: &str, b: &str) -> anyhow::Result<Option<ObjectId>> {
        let a = self.resolve_name(a)?;
        let b = self.resolve_name(b)?;

        let base = self.merge_base(&a, &b)?;
        if let Some(base) = &base {
            writeln!(self.writer(), "{base}")?;
        }

        Ok(base)
    }
}
