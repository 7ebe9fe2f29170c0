use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use anyhow::Context;
use std::path::{Path, PathBuf};

impl Repository {
    /// Stage files, expanding directories recursively
    ///
    /// Relative paths are taken from the repository root. Everything happens
    /// in one index transaction: a path that cannot be read leaves the index
    /// untouched.
    pub fn add(&self, paths: &[impl AsRef<Path>]) -> anyhow::Result<()> {
        let roots = paths
            .iter()
            .map(|path| self.workspace_root_for(path.as_ref()))
            .collect::<anyhow::Result<Vec<_>>>()?;

        self.with_index(|index| {
            for root in &roots {
                for file in self.workspace().list_files(Some(root.as_path()))? {
                    let content = self.workspace().read_file(&file)?;
                    let oid = self.database().store(&Blob::new(content))?;

                    tracing::debug!(path = %file, %oid, "staging");
                    index.set(&file, oid)?;
                }
            }

            Ok(())
        })
    }

    fn workspace_root_for(&self, path: &Path) -> anyhow::Result<PathBuf> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.path().join(path)
        };

        path.canonicalize()
            .with_context(|| format!("The specified path does not exist: {}", path.display()))
    }
}
