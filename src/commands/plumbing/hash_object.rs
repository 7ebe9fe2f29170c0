use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Store the file at `file` as a blob and print its oid
    pub fn hash_object(&self, file: &Path) -> anyhow::Result<ObjectId> {
        let content =
            std::fs::read(file).with_context(|| format!("Unable to read {}", file.display()))?;
        let oid = self.database().store(&Blob::new(Bytes::from(content)))?;

        writeln!(self.writer(), "{oid}")?;

        Ok(oid)
    }
}
