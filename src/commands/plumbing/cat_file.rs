use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use std::io::Write;

impl Repository {
    /// Write an object's content, as stored, to the writer
    ///
    /// `expected` rejects objects of another type.
    pub fn cat_file(&self, name: &str, expected: Option<ObjectType>) -> anyhow::Result<()> {
        let oid = self.resolve_name(name)?;
        let (_, content) = self.database().load(&oid, expected)?;

        let mut writer = self.writer();
        writer.write_all(&content)?;
        writer.flush()?;

        Ok(())
    }
}
