use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// Store the index as nested trees and print the root tree's oid
    pub fn write_tree(&self) -> anyhow::Result<ObjectId> {
        let index = self.open_index()?;
        let oid = self.build_tree(&index)?;

        writeln!(self.writer(), "{oid}")?;

        Ok(oid)
    }
}
