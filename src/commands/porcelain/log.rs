use crate::areas::refs::{HEAD_REF_NAME, HEADS_PREFIX, MERGE_HEAD_REF_NAME, TAGS_PREFIX};
use crate::areas::repository::Repository;
use crate::artifacts::core::colors_enabled;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use colored::Colorize;
use std::collections::HashMap;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// One `<short oid> (<refs>) <subject>` line per commit
    pub oneline: bool,
}

/// Ref names pointing at each commit, in ref iteration order
type Decorations = HashMap<ObjectId, Vec<String>>;

impl Repository {
    /// Print the history reachable from `start`
    pub fn log(&self, start: &str, options: LogOptions) -> anyhow::Result<()> {
        let start = self.resolve_name(start)?;
        let decorations = self.decorations()?;

        for oid in self.ancestors([start]) {
            let oid = oid?;
            let commit = self.get_commit(&oid)?;
            let refs = decorations.get(&oid).map(Vec::as_slice).unwrap_or_default();

            if options.oneline {
                writeln!(
                    self.writer(),
                    "{}{} {}",
                    self.commit_id(&oid, true),
                    self.decoration(refs),
                    commit.short_message()
                )?;
            } else {
                self.write_commit_header(&oid, &commit, refs)?;
                writeln!(self.writer())?;
            }
        }

        Ok(())
    }

    fn decorations(&self) -> anyhow::Result<Decorations> {
        let mut decorations = Decorations::new();

        for (refname, value) in self.refs().iter_refs("", true)? {
            if let Some(oid) = value.oid()? {
                decorations.entry(oid).or_default().push(refname);
            }
        }

        Ok(decorations)
    }

    /// `commit <oid> (<refs>)` followed by the indented message
    pub(crate) fn write_commit_header(
        &self,
        oid: &ObjectId,
        commit: &Commit,
        refs: &[String],
    ) -> anyhow::Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "{}{}", self.commit_id(oid, false), self.decoration(refs))?;
        if commit.is_merge() {
            let parents = commit
                .parents()
                .iter()
                .map(ObjectId::to_short_oid)
                .collect::<Vec<_>>();
            writeln!(writer, "Merge: {}", parents.join(" "))?;
        }
        writeln!(writer)?;
        for line in commit.message().lines() {
            writeln!(writer, "    {line}")?;
        }

        Ok(())
    }

    fn commit_id(&self, oid: &ObjectId, abbreviate: bool) -> String {
        let id = if abbreviate {
            oid.to_short_oid()
        } else {
            format!("commit {oid}")
        };

        if colors_enabled() {
            id.yellow().to_string()
        } else {
            id
        }
    }

    fn decoration(&self, refs: &[String]) -> String {
        if refs.is_empty() {
            return String::new();
        }

        let names = refs
            .iter()
            .map(|refname| {
                if !colors_enabled() {
                    return refname.clone();
                }

                if refname == HEAD_REF_NAME || refname == MERGE_HEAD_REF_NAME {
                    refname.cyan().bold().to_string()
                } else if refname.starts_with(HEADS_PREFIX) {
                    refname.green().bold().to_string()
                } else if refname.starts_with(TAGS_PREFIX) {
                    refname.yellow().bold().to_string()
                } else {
                    refname.red().bold().to_string()
                }
            })
            .collect::<Vec<_>>();

        format!(" ({})", names.join(", "))
    }
}
