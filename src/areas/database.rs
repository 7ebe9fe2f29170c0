//! Content-addressed object store
//!
//! Objects live flat under `<meta>/objects/<oid>` as `<type>\0<content>`.
//! Writes go through a temporary file and a rename, and are skipped when the
//! object already exists: same bytes, same oid, so there is nothing to
//! overwrite and no locking to do.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::{FlatTree, Tree};
use crate::errors::StorageError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    fn object_path(&self, object_id: &ObjectId) -> PathBuf {
        self.path.join(object_id.as_ref())
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.object_path(object_id).is_file()
    }

    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let content = object.serialize()?;
        self.store_raw(object.object_type(), &content)
    }

    /// Hash and persist `content` under its type tag, returning its oid
    pub fn store_raw(&self, object_type: ObjectType, content: &[u8]) -> anyhow::Result<ObjectId> {
        let object_id = ObjectId::hash(object_type, content);
        let object_path = self.object_path(&object_id);

        if object_path.exists() {
            return Ok(object_id);
        }

        std::fs::create_dir_all(&self.path).context(format!(
            "Unable to create object directory {}",
            self.path.display()
        ))?;

        let mut raw = Vec::with_capacity(object_type.as_bytes().len() + 1 + content.len());
        raw.extend_from_slice(object_type.as_bytes());
        raw.push(0);
        raw.extend_from_slice(content);

        self.write_object(&object_path, &raw)?;
        tracing::debug!(oid = %object_id, %object_type, size = content.len(), "stored object");

        Ok(object_id)
    }

    /// Read an object back, checking its type tag when one is expected
    pub fn load(
        &self,
        object_id: &ObjectId,
        expected: Option<ObjectType>,
    ) -> anyhow::Result<(ObjectType, Bytes)> {
        let raw = self.read_object(object_id)?;

        let separator = raw
            .iter()
            .position(|&byte| byte == 0)
            .ok_or_else(|| StorageError::corrupt_object(object_id, "missing type tag"))?;
        let object_type = std::str::from_utf8(&raw[..separator])
            .ok()
            .and_then(|tag| ObjectType::try_from(tag).ok())
            .ok_or_else(|| StorageError::corrupt_object(object_id, "unknown type tag"))?;

        if let Some(expected) = expected
            && expected != object_type
        {
            return Err(StorageError::TypeMismatch {
                oid: object_id.to_string(),
                expected,
                actual: object_type,
            }
            .into());
        }

        Ok((object_type, raw.slice(separator + 1..)))
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let (_, content) = self.load(object_id, Some(ObjectType::Blob))?;
        Blob::deserialize(content)
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> anyhow::Result<Tree> {
        let (_, content) = self.load(object_id, Some(ObjectType::Tree))?;
        Tree::deserialize(content).with_context(|| format!("Unable to parse tree {object_id}"))
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let (_, content) = self.load(object_id, Some(ObjectType::Commit))?;
        Commit::deserialize(content).with_context(|| format!("Unable to parse commit {object_id}"))
    }

    /// Expand a stored tree into `path -> blob oid`
    ///
    /// `None` stands for the empty tree (e.g. the parent of a root commit).
    pub fn flatten_tree(&self, tree_oid: Option<&ObjectId>) -> anyhow::Result<FlatTree> {
        let mut flat = FlatTree::new();
        let mut pending = match tree_oid {
            Some(oid) => vec![(String::new(), oid.clone())],
            None => Vec::new(),
        };

        while let Some((base_path, oid)) = pending.pop() {
            for (name, entry) in self.parse_object_as_tree(&oid)?.into_entries() {
                let path = format!("{base_path}{name}");
                if entry.is_tree() {
                    pending.push((format!("{path}/"), entry.oid));
                } else {
                    flat.insert(path, entry.oid);
                }
            }
        }

        Ok(flat)
    }

    /// Copy one object byte-for-byte into another store
    ///
    /// Returns whether anything was copied; an object the target already has
    /// is identical by construction and is left alone.
    pub fn replicate_to(&self, object_id: &ObjectId, target: &Database) -> anyhow::Result<bool> {
        if target.exists(object_id) {
            return Ok(false);
        }

        let raw = self.read_object(object_id)?;
        std::fs::create_dir_all(target.objects_path()).context(format!(
            "Unable to create object directory {}",
            target.objects_path().display()
        ))?;
        target.write_object(&target.object_path(object_id), &raw)?;
        tracing::debug!(oid = %object_id, "replicated object");

        Ok(true)
    }

    pub fn fetch_from(&self, object_id: &ObjectId, source: &Database) -> anyhow::Result<bool> {
        source.replicate_to(object_id, self)
    }

    fn read_object(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.object_path(object_id);

        match std::fs::read(&object_path) {
            Ok(content) => Ok(Bytes::from(content)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::not_found(format!("object {object_id}")).into())
            }
            Err(error) => Err(error).context(format!(
                "Unable to read object file {}",
                object_path.display()
            )),
        }
    }

    fn write_object(&self, object_path: &Path, raw: &[u8]) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(raw).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    fn database(dir: &TempDir) -> Database {
        Database::new(dir.path().join("objects").into_boxed_path())
    }

    #[rstest]
    fn stored_bytes_are_tag_nul_content(store_dir: TempDir) -> anyhow::Result<()> {
        let database = database(&store_dir);

        let oid = database.store_raw(ObjectType::Blob, b"hello")?;

        assert_eq!(oid.as_ref(), "5b211494ba9e0f5c98ca51e8732bda579d8487ef");
        assert_eq!(
            std::fs::read(database.objects_path().join(oid.as_ref()))?,
            b"blob\0hello".to_vec()
        );
        Ok(())
    }

    #[rstest]
    fn loading_with_the_wrong_type_fails(store_dir: TempDir) -> anyhow::Result<()> {
        let database = database(&store_dir);
        let oid = database.store_raw(ObjectType::Blob, b"content")?;

        let error = database
            .load(&oid, Some(ObjectType::Tree))
            .expect_err("type mismatch must be reported");

        assert!(matches!(
            StorageError::find(&error),
            Some(StorageError::TypeMismatch {
                expected: ObjectType::Tree,
                actual: ObjectType::Blob,
                ..
            })
        ));
        Ok(())
    }

    #[rstest]
    fn loading_an_unknown_oid_is_not_found(store_dir: TempDir) {
        let database = database(&store_dir);
        let oid = ObjectId::hash(ObjectType::Blob, b"never stored");

        let error = database.load(&oid, None).expect_err("nothing was stored");

        assert!(!database.exists(&oid));
        assert!(matches!(
            StorageError::find(&error),
            Some(StorageError::NotFound(_))
        ));
    }

    #[rstest]
    fn objects_without_a_type_tag_are_corrupt(store_dir: TempDir) -> anyhow::Result<()> {
        let database = database(&store_dir);
        let oid = ObjectId::hash(ObjectType::Blob, b"x");
        std::fs::create_dir_all(database.objects_path())?;
        std::fs::write(database.objects_path().join(oid.as_ref()), b"no separator")?;

        let error = database.load(&oid, None).expect_err("corrupt object");

        assert!(matches!(
            StorageError::find(&error),
            Some(StorageError::CorruptObject { .. })
        ));
        Ok(())
    }

    #[rstest]
    fn replication_copies_once(store_dir: TempDir) -> anyhow::Result<()> {
        let source = database(&store_dir);
        let target = Database::new(store_dir.path().join("other").into_boxed_path());
        let oid = source.store_raw(ObjectType::Commit, b"tree x\n\nmsg\n")?;

        assert!(target.fetch_from(&oid, &source)?);
        assert!(!source.replicate_to(&oid, &target)?);
        assert_eq!(
            target.load(&oid, Some(ObjectType::Commit))?,
            source.load(&oid, Some(ObjectType::Commit))?
        );
        Ok(())
    }

    proptest! {
        #[test]
        fn put_is_deterministic_and_round_trips(
            content in proptest::collection::vec(any::<u8>(), 0..512),
            kind in prop_oneof![
                Just(ObjectType::Blob),
                Just(ObjectType::Tree),
                Just(ObjectType::Commit)
            ]
        ) {
            let dir = TempDir::new().expect("Failed to create temp dir");
            let database = database(&dir);

            let first = database.store_raw(kind, &content).expect("first write");
            let second = database.store_raw(kind, &content).expect("second write");
            let (loaded_type, loaded) = database.load(&first, Some(kind)).expect("read back");

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(loaded_type, kind);
            prop_assert_eq!(loaded.to_vec(), content);
        }
    }
}
