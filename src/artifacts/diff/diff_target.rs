use crate::areas::database::Database;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_id::ObjectId;

pub const NULL_PATH: &str = "/dev/null";

/// One side of a file diff: the blob a path holds, if any
#[derive(Debug, Clone)]
pub struct DiffTarget {
    pub file: String,
    pub oid: Option<ObjectId>,
    pub blob: Option<Blob>,
}

impl DiffTarget {
    pub fn load(database: &Database, file: &str, oid: Option<&ObjectId>) -> anyhow::Result<Self> {
        let blob = oid
            .map(|oid| database.parse_object_as_blob(oid))
            .transpose()?;

        Ok(DiffTarget {
            file: file.to_string(),
            oid: oid.cloned(),
            blob,
        })
    }

    pub fn is_binary(&self) -> bool {
        self.blob.as_ref().is_some_and(|blob| blob.as_text().is_none())
    }

    /// Lines of a text blob, each keeping its `\n`; nothing for a missing side
    ///
    /// Only a final line can lack the terminator, which keeps `x` and `x\n`
    /// apart.
    pub fn lines(&self) -> Vec<&str> {
        self.blob
            .as_ref()
            .and_then(Blob::as_text)
            .map(|text| text.split_inclusive('\n').collect())
            .unwrap_or_default()
    }

    /// `a/<file>` or `b/<file>`, or `/dev/null` for a missing side
    pub fn diff_path(&self, side: &str) -> String {
        match self.oid {
            Some(_) => format!("{side}/{}", self.file),
            None => NULL_PATH.to_string(),
        }
    }
}
