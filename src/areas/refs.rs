//! References (HEAD, MERGE_HEAD, branches, tags)
//!
//! References are human-readable names pointing into the object store.
//! A reference is either:
//! - Direct: the file holds a 40-character oid
//! - Symbolic: the file holds `ref: <other ref name>`
//!
//! ## Layout
//!
//! - `HEAD`: the current tip, usually symbolic to a branch
//! - `MERGE_HEAD`: only present while a merge waits to be committed
//! - `refs/heads/<name>`: branches
//! - `refs/tags/<name>`: tags
//!
//! A missing or empty ref file reads as "no value", which is the same as the
//! ref not existing at all.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::StorageError;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

pub const HEAD_REF_NAME: &str = "HEAD";
pub const MERGE_HEAD_REF_NAME: &str = "MERGE_HEAD";
pub const HEADS_PREFIX: &str = "refs/heads/";
pub const TAGS_PREFIX: &str = "refs/tags/";
pub const REMOTE_PREFIX: &str = "refs/remote/";

/// The value held by a ref file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefValue {
    /// When set, `value` names another ref instead of holding an oid
    pub symbolic: bool,
    pub value: Option<String>,
}

impl RefValue {
    pub fn direct(oid: &ObjectId) -> Self {
        RefValue {
            symbolic: false,
            value: Some(oid.to_string()),
        }
    }

    pub fn symbolic(target: impl Into<String>) -> Self {
        RefValue {
            symbolic: true,
            value: Some(target.into()),
        }
    }

    pub fn is_present(&self) -> bool {
        self.value.as_deref().is_some_and(|value| !value.is_empty())
    }

    /// The oid held by a direct ref, `None` if it has no value
    pub fn oid(&self) -> anyhow::Result<Option<ObjectId>> {
        match (&self.value, self.symbolic) {
            (None, _) => Ok(None),
            (Some(value), false) => Ok(Some(ObjectId::try_parse(value.as_str()).map_err(
                |_| StorageError::invalid_ref(format!("{value:?} is not an object id")),
            )?)),
            (Some(value), true) => Err(StorageError::invalid_ref(format!(
                "symbolic ref to {value} has no object id until dereferenced"
            ))
            .into()),
        }
    }
}

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory (typically `.ugit`)
    path: Box<Path>,
}

impl Refs {
    fn ref_path(&self, refname: &str) -> PathBuf {
        self.path.join(refname)
    }

    fn read_ref_file(&self, refname: &str) -> anyhow::Result<RefValue> {
        let path = self.ref_path(refname);
        if !path.is_file() {
            return Ok(RefValue::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read ref file at {:?}", path))?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(RefValue::default());
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        match symref_match {
            Some(symref_match) => Ok(RefValue::symbolic(symref_match[1].to_string())),
            None => Ok(RefValue {
                symbolic: false,
                value: Some(content.to_string()),
            }),
        }
    }

    /// Find a ref's value, following `ref: <name>` chains when `deref` is set
    ///
    /// Returns the name of the ref that was finally read along with its value.
    /// Without `deref` a symbolic ref comes back as-is, one hop only.
    pub fn resolve(&self, refname: &str, deref: bool) -> anyhow::Result<(String, RefValue)> {
        let mut refname = refname.to_string();

        loop {
            let value = self.read_ref_file(&refname)?;

            match (value.symbolic, deref, &value.value) {
                (true, true, Some(target)) => {
                    tracing::trace!(from = %refname, to = %target, "following symbolic ref");
                    refname = target.clone();
                }
                _ => return Ok((refname, value)),
            }
        }
    }

    /// Write a ref, writing through symbolic indirection when `deref` is set
    pub fn update_ref(&self, refname: &str, value: &RefValue, deref: bool) -> anyhow::Result<()> {
        let Some(raw_value) = value.value.as_deref().filter(|raw| !raw.is_empty()) else {
            return Err(
                StorageError::invalid_ref(format!("{refname} cannot be set to nothing")).into(),
            );
        };

        let refname = if deref {
            self.resolve(refname, true)?.0
        } else {
            refname.to_string()
        };

        let raw_ref = if value.symbolic {
            format!("ref: {raw_value}")
        } else {
            raw_value.to_string()
        };

        tracing::debug!(%refname, value = %raw_ref, "updating ref");
        self.update_ref_file(&self.ref_path(&refname), &raw_ref)
    }

    fn update_ref_file(&self, path: &Path, raw_ref: &str) -> anyhow::Result<()> {
        // create all the parent directories if they don't exist
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to open ref file at {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }

    pub fn delete_ref(&self, refname: &str, deref: bool) -> anyhow::Result<()> {
        let (refname, _) = self.resolve(refname, deref)?;
        let path = self.ref_path(&refname);

        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(%refname, "deleted ref");
                Ok(())
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => {
                Err(error).with_context(|| format!("failed to delete ref file at {:?}", path))
            }
        }
    }

    /// Every ref starting with `prefix` that has a value
    ///
    /// `HEAD` and `MERGE_HEAD` come first, then everything under `refs/` in
    /// name order.
    pub fn iter_refs(&self, prefix: &str, deref: bool) -> anyhow::Result<Vec<(String, RefValue)>> {
        let mut refnames = vec![HEAD_REF_NAME.to_string(), MERGE_HEAD_REF_NAME.to_string()];
        refnames.extend(self.list_refs(&self.refs_path())?);

        refnames
            .into_iter()
            .filter(|refname| refname.starts_with(prefix))
            .filter_map(|refname| match self.resolve(&refname, deref) {
                Ok((_, value)) if value.is_present() => Some(Ok((refname, value))),
                Ok(_) => None,
                Err(error) => Some(Err(error)),
            })
            .collect()
    }

    fn list_refs(&self, path: &Path) -> anyhow::Result<Vec<String>> {
        Ok(WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(self.path.as_ref()).ok()?;
                let components = relative_path
                    .components()
                    .map(|component| component.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>();
                Some(components.join("/"))
            })
            .collect())
    }

    /// The oid HEAD ultimately points at, `None` before the first commit
    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        self.resolve(HEAD_REF_NAME, true)?.1.oid()
    }

    pub fn read_merge_head(&self) -> anyhow::Result<Option<ObjectId>> {
        self.resolve(MERGE_HEAD_REF_NAME, true)?.1.oid()
    }

    /// The checked-out branch, `None` when HEAD is detached
    pub fn current_branch(&self) -> anyhow::Result<Option<String>> {
        let (_, head) = self.resolve(HEAD_REF_NAME, false)?;

        Ok(match (head.symbolic, head.value) {
            (true, Some(target)) => target.strip_prefix(HEADS_PREFIX).map(str::to_string),
            _ => None,
        })
    }

    pub fn list_branches(&self) -> anyhow::Result<Vec<String>> {
        Ok(self
            .list_refs(&self.heads_path())?
            .into_iter()
            .filter_map(|refname| refname.strip_prefix(HEADS_PREFIX).map(str::to_string))
            .collect())
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }

    pub fn tags_path(&self) -> Box<Path> {
        self.refs_path().join("tags").into_boxed_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::object_type::ObjectType;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn refs_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    fn refs(dir: &TempDir) -> Refs {
        Refs::new(dir.path().to_path_buf().into_boxed_path())
    }

    fn oid(seed: &str) -> ObjectId {
        ObjectId::hash(ObjectType::Commit, seed.as_bytes())
    }

    #[rstest]
    fn symbolic_chain_resolves_to_the_oid(refs_dir: TempDir) -> anyhow::Result<()> {
        let refs = refs(&refs_dir);
        refs.update_ref("refs/heads/main", &RefValue::direct(&oid("c1")), true)?;
        refs.update_ref(HEAD_REF_NAME, &RefValue::symbolic("refs/heads/main"), false)?;

        assert_eq!(
            refs.resolve(HEAD_REF_NAME, true)?,
            ("refs/heads/main".to_string(), RefValue::direct(&oid("c1")))
        );
        assert_eq!(
            refs.resolve(HEAD_REF_NAME, false)?,
            (HEAD_REF_NAME.to_string(), RefValue::symbolic("refs/heads/main"))
        );
        Ok(())
    }

    #[rstest]
    fn missing_and_empty_refs_have_no_value(refs_dir: TempDir) -> anyhow::Result<()> {
        let refs = refs(&refs_dir);
        std::fs::create_dir_all(refs_dir.path().join("refs/heads"))?;
        std::fs::write(refs_dir.path().join("refs/heads/empty"), "")?;

        assert_eq!(
            refs.resolve("refs/heads/empty", true)?,
            ("refs/heads/empty".to_string(), RefValue::default())
        );
        assert_eq!(
            refs.resolve("refs/heads/missing", true)?,
            ("refs/heads/missing".to_string(), RefValue::default())
        );
        Ok(())
    }

    #[rstest]
    fn updating_through_head_moves_the_branch(refs_dir: TempDir) -> anyhow::Result<()> {
        let refs = refs(&refs_dir);
        refs.update_ref(HEAD_REF_NAME, &RefValue::symbolic("refs/heads/master"), false)?;

        refs.update_ref(HEAD_REF_NAME, &RefValue::direct(&oid("c1")), true)?;

        assert_eq!(
            std::fs::read_to_string(refs_dir.path().join("refs/heads/master"))?,
            oid("c1").to_string()
        );
        assert_eq!(refs.current_branch()?, Some("master".to_string()));
        assert_eq!(refs.read_head()?, Some(oid("c1")));
        Ok(())
    }

    #[rstest]
    fn empty_values_are_rejected(refs_dir: TempDir) {
        let refs = refs(&refs_dir);

        let error = refs
            .update_ref(HEAD_REF_NAME, &RefValue::default(), true)
            .expect_err("refs must carry a value");

        assert!(matches!(
            StorageError::find(&error),
            Some(StorageError::InvalidRef(_))
        ));
    }

    #[rstest]
    fn iteration_filters_by_prefix_and_skips_valueless_refs(
        refs_dir: TempDir,
    ) -> anyhow::Result<()> {
        let refs = refs(&refs_dir);
        refs.update_ref(HEAD_REF_NAME, &RefValue::symbolic("refs/heads/master"), false)?;
        refs.update_ref("refs/heads/feature", &RefValue::direct(&oid("f")), false)?;
        refs.update_ref("refs/tags/v1", &RefValue::direct(&oid("t")), false)?;

        // HEAD points at an unborn branch, so it resolves to nothing
        let all = refs.iter_refs("", true)?;
        let names = all.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["refs/heads/feature", "refs/tags/v1"]);

        let heads = refs.iter_refs(HEADS_PREFIX, true)?;
        assert_eq!(
            heads,
            vec![("refs/heads/feature".to_string(), RefValue::direct(&oid("f")))]
        );

        let undereferenced = refs.iter_refs(HEAD_REF_NAME, false)?;
        assert_eq!(
            undereferenced,
            vec![(
                HEAD_REF_NAME.to_string(),
                RefValue::symbolic("refs/heads/master")
            )]
        );
        Ok(())
    }

    #[rstest]
    fn deleting_merge_head_removes_the_file(refs_dir: TempDir) -> anyhow::Result<()> {
        let refs = refs(&refs_dir);
        refs.update_ref(MERGE_HEAD_REF_NAME, &RefValue::direct(&oid("m")), true)?;
        assert_eq!(refs.read_merge_head()?, Some(oid("m")));

        refs.delete_ref(MERGE_HEAD_REF_NAME, false)?;
        refs.delete_ref(MERGE_HEAD_REF_NAME, false)?;

        assert_eq!(refs.read_merge_head()?, None);
        Ok(())
    }
}
