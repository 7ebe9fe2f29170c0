//! Unified-style textual diff between two trees
//!
//! For every changed path:
//!
//! ```text
//! diff --ugit a/<path> b/<path>
//! --- a/<path>            (/dev/null when added)
//! +++ b/<path>            (/dev/null when deleted)
//! @@ -l,s +l,s @@
//!  unchanged
//! -removed
//! +added
//! ```
//!
//! A last line without a terminator is followed by
//! `\ No newline at end of file`. Binary blobs only get a
//! `Binary files ... differ` line.

use crate::areas::database::Database;
use crate::artifacts::diff::diff_algorithm::{Edit, HUNK_CONTEXT, Hunk, MyersDiff};
use crate::artifacts::diff::diff_target::DiffTarget;
use crate::artifacts::diff::tree_diff::changed_files;
use crate::artifacts::objects::tree::FlatTree;
use colored::Colorize;
use derive_new::new;
use std::io::Write;

const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

#[derive(Debug, new)]
pub struct PatchWriter<'r> {
    database: &'r Database,
    /// Style headers and edits for a terminal
    colorize: bool,
}

impl PatchWriter<'_> {
    pub fn write_tree_diff(
        &self,
        a: &FlatTree,
        b: &FlatTree,
        out: &mut dyn Write,
    ) -> anyhow::Result<()> {
        for (path, _) in changed_files(a, b) {
            let a_target = DiffTarget::load(self.database, &path, a.get(&path))?;
            let b_target = DiffTarget::load(self.database, &path, b.get(&path))?;

            self.write_file_diff(&a_target, &b_target, out)?;
        }

        Ok(())
    }

    pub fn write_file_diff(
        &self,
        a: &DiffTarget,
        b: &DiffTarget,
        out: &mut dyn Write,
    ) -> anyhow::Result<()> {
        if a.oid == b.oid {
            return Ok(());
        }

        self.header(out, &format!("diff --ugit a/{} b/{}", a.file, b.file))?;

        if a.is_binary() || b.is_binary() {
            writeln!(out, "Binary files a/{} and b/{} differ", a.file, b.file)?;
            return Ok(());
        }

        self.header(out, &format!("--- {}", a.diff_path("a")))?;
        self.header(out, &format!("+++ {}", b.diff_path("b")))?;

        let (a_lines, b_lines) = (a.lines(), b.lines());
        for hunk in MyersDiff::new(&a_lines, &b_lines).hunks(HUNK_CONTEXT) {
            self.write_hunk(&hunk, out)?;
        }

        Ok(())
    }

    fn write_hunk(&self, hunk: &Hunk<&str>, out: &mut dyn Write) -> anyhow::Result<()> {
        if self.colorize {
            writeln!(out, "{}", hunk.header().cyan())?;
        } else {
            writeln!(out, "{}", hunk.header())?;
        }

        for edit in hunk.edits() {
            let line = edit.to_string();
            let (line, terminated) = match line.strip_suffix('\n') {
                Some(line) => (line, true),
                None => (line.as_str(), false),
            };

            match (self.colorize, edit) {
                (true, Edit::Delete { .. }) => writeln!(out, "{}", line.red())?,
                (true, Edit::Insert { .. }) => writeln!(out, "{}", line.green())?,
                _ => writeln!(out, "{line}")?,
            }
            if !terminated {
                writeln!(out, "{NO_NEWLINE_MARKER}")?;
            }
        }

        Ok(())
    }

    fn header(&self, out: &mut dyn Write, line: &str) -> anyhow::Result<()> {
        if self.colorize {
            writeln!(out, "{}", line.bold())?;
        } else {
            writeln!(out, "{line}")?;
        }

        Ok(())
    }
}
