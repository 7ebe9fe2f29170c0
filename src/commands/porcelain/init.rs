use crate::areas::refs::{HEAD_REF_NAME, HEADS_PREFIX, RefValue};
use crate::areas::repository::{DEFAULT_BRANCH, Repository};
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    /// Create the metadata layout, leaving an existing HEAD in place
    pub fn init(&self) -> anyhow::Result<()> {
        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .ugit/objects directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create .ugit/refs/heads directory")?;

        fs::create_dir_all(self.refs().tags_path())
            .context("Failed to create .ugit/refs/tags directory")?;

        if !self.refs().head_path().exists() {
            self.refs()
                .update_ref(
                    HEAD_REF_NAME,
                    &RefValue::symbolic(format!("{HEADS_PREFIX}{DEFAULT_BRANCH}")),
                    false,
                )
                .context("Failed to create initial HEAD reference")?;
        }

        writeln!(
            self.writer(),
            "Initialized empty ugit repository in {}",
            self.meta_path().display()
        )?;

        Ok(())
    }
}
