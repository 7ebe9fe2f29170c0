//! Working directory access
//!
//! Paths handed in and out of the workspace are relative to its root and use
//! `/` separators, the same keys the index and flattened trees use. The
//! metadata directory is never listed, read or removed.

use crate::areas::repository::META_DIR;
use crate::artifacts::objects::tree::validate_entry_name;
use anyhow::Context;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_ignored(&self, path: &Path) -> bool {
        path.strip_prefix(self.path.as_ref())
            .ok()
            .and_then(|relative| relative.components().next())
            .is_some_and(|first| first.as_os_str() == META_DIR)
    }

    /// `/`-joined key for a path below the root
    ///
    /// Fails for names that are not UTF-8 or that a tree entry cannot hold.
    fn to_key(&self, path: &Path) -> anyhow::Result<String> {
        let relative = path.strip_prefix(self.path.as_ref())?;
        let components = relative
            .components()
            .map(|component| {
                let name = component
                    .as_os_str()
                    .to_str()
                    .ok_or_else(|| anyhow::anyhow!("name is not valid UTF-8"))?;
                validate_entry_name(name)?;

                Ok(name)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(components.join("/"))
    }

    /// Every file below `root` (the whole workspace by default), sorted
    ///
    /// `root` may itself be a file, in which case it is the only result.
    pub fn list_files(&self, root: Option<&Path>) -> anyhow::Result<Vec<String>> {
        let root = match root {
            Some(root) if root.is_absolute() => root.to_path_buf(),
            Some(root) => self.path.join(root),
            None => self.path.to_path_buf(),
        };

        if !root.exists() {
            anyhow::bail!("The specified path does not exist: {:?}", root);
        }
        if !root.starts_with(self.path.as_ref()) {
            anyhow::bail!("{:?} is outside the repository at {:?}", root, self.path);
        }

        let mut files = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_ignored(entry.path()))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| match self.to_key(entry.path()) {
                Ok(key) => Some(key),
                Err(error) => {
                    tracing::warn!(path = ?entry.path(), %error, "skipping file");
                    None
                }
            })
            .collect::<Vec<_>>();
        files.sort();

        Ok(files)
    }

    pub fn read_file(&self, file_path: &str) -> anyhow::Result<Bytes> {
        let path = self.path.join(file_path);
        let content =
            std::fs::read(&path).with_context(|| format!("Unable to read {}", path.display()))?;

        Ok(Bytes::from(content))
    }

    /// Write `content` to `file_path`, creating parent directories as needed
    pub fn write_file(&self, file_path: &str, content: &[u8]) -> anyhow::Result<()> {
        let path = self.path.join(file_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Unable to create directory {}", parent.display()))?;
        }

        std::fs::write(&path, content)
            .with_context(|| format!("Unable to write {}", path.display()))
    }

    /// Remove every file and directory except the metadata directory
    ///
    /// Deepest paths go first so directories are empty by the time they are
    /// reached. Entries that vanished meanwhile, and directories that still
    /// hold something, are left alone.
    pub fn empty(&self) -> anyhow::Result<()> {
        let entries = WalkDir::new(self.path.as_ref())
            .min_depth(1)
            .contents_first(true)
            .into_iter()
            .filter_entry(|entry| !self.is_ignored(entry.path()))
            .filter_map(|entry| entry.ok())
            .map(|entry| (entry.path().to_path_buf(), entry.file_type().is_dir()))
            .collect::<Vec<(PathBuf, bool)>>();

        for (path, is_dir) in entries {
            let removed = if is_dir {
                std::fs::remove_dir(&path)
            } else {
                std::fs::remove_file(&path)
            };

            match removed {
                Ok(()) => {}
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
                Err(_) if is_dir => {
                    tracing::debug!(path = %path.display(), "leaving non-empty directory");
                }
                Err(error) => {
                    return Err(error)
                        .with_context(|| format!("Unable to remove {}", path.display()));
                }
            }
        }

        Ok(())
    }
}
