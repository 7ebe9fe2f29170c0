//! Repository handle
//!
//! A [`Repository`] owns the root path and every area derived from it: the
//! object database, the refs, the workspace and the index file. Commands are
//! `impl Repository` blocks under `commands/`; the shared engine operations
//! (index transactions, tree building, commit graph queries and working tree
//! synchronisation) live here.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::{HEAD_REF_NAME, RefValue, Refs};
use crate::areas::workspace::Workspace;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::log::reachable::ReachableObjects;
use crate::artifacts::log::rev_list::Ancestors;
use crate::artifacts::merge::merge_base::MergeBaseFinder;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::{FlatTree, TreeBuilder};
use crate::errors::StorageError;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const META_DIR: &str = ".ugit";
pub const DEFAULT_BRANCH: &str = "master";
const INDEX_FILE: &str = "index";
const OBJECTS_DIR: &str = "objects";

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn Write>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    index_path: Box<Path>,
}

impl Repository {
    /// Handle for the repository rooted at `path`, creating the directory if needed
    ///
    /// Nothing under the metadata directory is touched; see `init`.
    pub fn new(path: &Path, writer: Box<dyn Write>) -> anyhow::Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("Unable to create {}", path.display()))?;
        }
        let path = path
            .canonicalize()
            .with_context(|| format!("Unable to resolve {}", path.display()))?;
        let meta = path.join(META_DIR);

        Ok(Repository {
            database: Database::new(meta.join(OBJECTS_DIR).into_boxed_path()),
            workspace: Workspace::new(path.clone().into_boxed_path()),
            refs: Refs::new(meta.clone().into_boxed_path()),
            index_path: meta.join(INDEX_FILE).into_boxed_path(),
            writer: RefCell::new(writer),
            path: path.into_boxed_path(),
        })
    }

    /// Handle for an initialised repository
    pub fn open(path: &Path, writer: Box<dyn Write>) -> anyhow::Result<Self> {
        let repository = Self::new(path, writer)?;

        if !repository.meta_path().is_dir() {
            return Err(StorageError::not_found(format!(
                "ugit repository in {}",
                repository.path().display()
            ))
            .into());
        }

        Ok(repository)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn meta_path(&self) -> PathBuf {
        self.path.join(META_DIR)
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn open_index(&self) -> anyhow::Result<Index> {
        Index::load(self.index_path.clone())
    }

    /// Run `mutate` against a freshly loaded index
    ///
    /// The index is written back only when `mutate` succeeds and changed
    /// something; on error the in-memory copy is dropped and the file on disk
    /// stays as it was.
    pub fn with_index<T>(
        &self,
        mutate: impl FnOnce(&mut Index) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        let mut index = self.open_index()?;
        let result = mutate(&mut index)?;

        if index.is_changed() {
            index.write_updates()?;
        }

        Ok(result)
    }

    /// Store the index content as nested trees and return the root oid
    pub fn build_tree(&self, index: &Index) -> anyhow::Result<ObjectId> {
        TreeBuilder::build(index.entries())?.write(&self.database)
    }

    pub fn get_commit(&self, oid: &ObjectId) -> anyhow::Result<Commit> {
        self.database.parse_object_as_commit(oid)
    }

    /// Flattened tree of a commit, empty for `None`
    pub fn commit_tree(&self, commit_oid: Option<&ObjectId>) -> anyhow::Result<FlatTree> {
        match commit_oid {
            Some(oid) => {
                let commit = self.get_commit(oid)?;
                self.database.flatten_tree(Some(commit.tree_oid()))
            }
            None => Ok(FlatTree::new()),
        }
    }

    pub fn resolve_name(&self, name: &str) -> anyhow::Result<ObjectId> {
        Revision::try_parse(name)?.resolve(self)
    }

    /// Write the index to the working directory, replacing what was there
    pub fn checkout_index(&self, index: &Index) -> anyhow::Result<()> {
        self.workspace.empty()?;

        for (path, oid) in index.entries() {
            let blob = self.database.parse_object_as_blob(oid)?;
            self.workspace.write_file(path, blob.content())?;
        }
        tracing::debug!(files = index.len(), "checked out index");

        Ok(())
    }

    /// Every working file hashed into the object store
    pub fn working_snapshot(&self) -> anyhow::Result<FlatTree> {
        self.workspace
            .list_files(None)?
            .into_iter()
            .map(|path| {
                let content = self.workspace.read_file(&path)?;
                let oid = self.database.store_raw(ObjectType::Blob, &content)?;
                Ok((path, oid))
            })
            .collect()
    }

    fn parent_loader(&self) -> impl FnMut(&ObjectId) -> anyhow::Result<Vec<ObjectId>> + '_ {
        move |oid: &ObjectId| -> anyhow::Result<Vec<ObjectId>> {
            Ok(self.get_commit(oid)?.parents().to_vec())
        }
    }

    pub fn ancestors(
        &self,
        starts: impl IntoIterator<Item = ObjectId>,
    ) -> Ancestors<impl FnMut(&ObjectId) -> anyhow::Result<Vec<ObjectId>> + '_> {
        Ancestors::new(starts, self.parent_loader())
    }

    pub fn merge_base(&self, a: &ObjectId, b: &ObjectId) -> anyhow::Result<Option<ObjectId>> {
        MergeBaseFinder::new(self.parent_loader()).merge_base(a, b)
    }

    pub fn is_ancestor(
        &self,
        commit: &ObjectId,
        maybe_ancestor: &ObjectId,
    ) -> anyhow::Result<bool> {
        MergeBaseFinder::new(self.parent_loader()).is_ancestor(commit, maybe_ancestor)
    }

    pub fn iter_objects_reachable_from(
        &self,
        commits: impl IntoIterator<Item = ObjectId>,
    ) -> ReachableObjects<'_> {
        ReachableObjects::new(&self.database, commits)
    }

    /// Fail when a merge is waiting to be committed
    pub fn ensure_no_merge_in_progress(&self) -> anyhow::Result<()> {
        match self.refs.read_merge_head()? {
            Some(merge_head) => Err(StorageError::MergeInProgress(merge_head.to_string()).into()),
            None => Ok(()),
        }
    }

    /// Point HEAD at `oid`, moving the checked-out branch when `deref` is set
    pub fn update_head(&self, oid: &ObjectId, deref: bool) -> anyhow::Result<()> {
        self.refs.update_ref(HEAD_REF_NAME, &RefValue::direct(oid), deref)
    }
}
