use crate::areas::refs::Refs;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::{ANCESTOR_REGEX, PARENT_REGEX, REF_ALIASES};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::StorageError;
use anyhow::Context;

/// Where a bare name is looked for, in order
const NAME_CANDIDATES: [&str; 4] = ["", "refs/", "refs/tags/", "refs/heads/"];

/// A name for a commit as typed by a user
///
/// - Ref names: `master`, `refs/tags/v1`, `HEAD`, `MERGE_HEAD`
/// - Alias: `@` for `HEAD`
/// - Full oids: 40 hexadecimal characters, used when no ref matches
/// - Parent notation: `<revision>^`
/// - Ancestor notation: `<revision>~<n>` (first parents only)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Name(String),
    Parent(Box<Revision>),
    Ancestor(Box<Revision>, usize),
}

impl Revision {
    pub fn try_parse(revision: &str) -> anyhow::Result<Revision> {
        let parent_regex = regex::Regex::new(PARENT_REGEX)
            .with_context(|| format!("invalid parent regex: {PARENT_REGEX}"))?;
        let ancestor_regex = regex::Regex::new(ANCESTOR_REGEX)
            .with_context(|| format!("invalid ancestor regex: {ANCESTOR_REGEX}"))?;

        if let Some(caps) = parent_regex.captures(revision) {
            return Ok(Revision::Parent(Box::new(Self::try_parse(&caps[1])?)));
        }

        if let Some(caps) = ancestor_regex.captures(revision) {
            let generations = caps[2]
                .parse()
                .with_context(|| format!("failed to parse generations in revision: {revision}"))?;
            return Ok(Revision::Ancestor(
                Box::new(Self::try_parse(&caps[1])?),
                generations,
            ));
        }

        let name = *REF_ALIASES.get(revision).unwrap_or(&revision);
        BranchName::try_parse(name)
            .map_err(|_| StorageError::UnknownName(revision.to_string()))?;

        Ok(Revision::Name(name.to_string()))
    }

    pub fn resolve(&self, repository: &Repository) -> anyhow::Result<ObjectId> {
        match self {
            Revision::Name(name) => resolve_name(repository.refs(), name),
            Revision::Parent(base) => Self::first_parent(&base.resolve(repository)?, repository),
            Revision::Ancestor(base, generations) => {
                let mut oid = base.resolve(repository)?;
                for _ in 0..*generations {
                    oid = Self::first_parent(&oid, repository)?;
                }

                Ok(oid)
            }
        }
    }

    fn first_parent(oid: &ObjectId, repository: &Repository) -> anyhow::Result<ObjectId> {
        let commit = repository.database().parse_object_as_commit(oid)?;

        commit
            .parent()
            .cloned()
            .ok_or_else(|| StorageError::not_found(format!("parent of root commit {oid}")).into())
    }
}

/// Look `name` up as a ref, then as a full oid
///
/// A candidate ref only counts when, fully dereferenced, it holds an oid. An
/// unborn branch therefore falls through to the next candidate.
pub fn resolve_name(refs: &Refs, name: &str) -> anyhow::Result<ObjectId> {
    let name = *REF_ALIASES.get(name).unwrap_or(&name);

    for prefix in NAME_CANDIDATES {
        let candidate = format!("{prefix}{name}");
        let (_, value) = refs.resolve(&candidate, true)?;

        if let Ok(Some(oid)) = value.oid() {
            tracing::trace!(%name, %candidate, %oid, "resolved name");
            return Ok(oid);
        }
    }

    if ObjectId::is_valid(name) {
        return ObjectId::try_parse(name);
    }

    Err(StorageError::UnknownName(name.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::refs::RefValue;
    use crate::artifacts::objects::object_type::ObjectType;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    fn oid(seed: &str) -> ObjectId {
        ObjectId::hash(ObjectType::Commit, seed.as_bytes())
    }

    #[fixture]
    fn refs_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp dir")
    }

    fn refs_with_history(dir: &TempDir) -> anyhow::Result<Refs> {
        let refs = Refs::new(dir.path().to_path_buf().into_boxed_path());
        refs.update_ref("HEAD", &RefValue::symbolic("refs/heads/master"), false)?;
        refs.update_ref("refs/heads/master", &RefValue::direct(&oid("master")), false)?;
        refs.update_ref("refs/tags/v1", &RefValue::direct(&oid("tag")), false)?;
        refs.update_ref("refs/heads/v1", &RefValue::direct(&oid("branch")), false)?;

        Ok(refs)
    }

    #[rstest]
    #[case::alias("@", "master")]
    #[case::head("HEAD", "master")]
    #[case::branch("master", "master")]
    #[case::full_ref("refs/heads/master", "master")]
    #[case::tags_win_over_branches("v1", "tag")]
    #[case::explicit_branch("heads/v1", "branch")]
    fn names_resolve_in_lookup_order(
        refs_dir: TempDir,
        #[case] name: &str,
        #[case] expected: &str,
    ) -> anyhow::Result<()> {
        let refs = refs_with_history(&refs_dir)?;

        assert_eq!(resolve_name(&refs, name)?, oid(expected));
        Ok(())
    }

    #[rstest]
    fn full_oids_resolve_to_themselves(refs_dir: TempDir) -> anyhow::Result<()> {
        let refs = refs_with_history(&refs_dir)?;
        let raw = oid("anything");

        assert_eq!(resolve_name(&refs, raw.as_ref())?, raw);
        Ok(())
    }

    #[rstest]
    #[case::missing_branch("nope")]
    #[case::short_oid("5b21149")]
    fn unknown_names_fail(refs_dir: TempDir, #[case] name: &str) -> anyhow::Result<()> {
        let refs = refs_with_history(&refs_dir)?;

        let error = resolve_name(&refs, name).expect_err("nothing should match");

        assert!(matches!(
            StorageError::find(&error),
            Some(StorageError::UnknownName(_))
        ));
        Ok(())
    }

    #[rstest]
    fn unborn_head_is_unknown(refs_dir: TempDir) -> anyhow::Result<()> {
        let refs = Refs::new(refs_dir.path().to_path_buf().into_boxed_path());
        refs.update_ref("HEAD", &RefValue::symbolic("refs/heads/master"), false)?;

        assert!(resolve_name(&refs, "@").is_err());
        Ok(())
    }

    #[test]
    fn parses_parent_and_ancestor_suffixes() -> anyhow::Result<()> {
        assert_eq!(
            Revision::try_parse("master^")?,
            Revision::Parent(Box::new(Revision::Name("master".to_string())))
        );
        assert_eq!(
            Revision::try_parse("@~3")?,
            Revision::Ancestor(Box::new(Revision::Name("HEAD".to_string())), 3)
        );
        assert_eq!(
            Revision::try_parse("HEAD^^")?,
            Revision::Parent(Box::new(Revision::Parent(Box::new(Revision::Name(
                "HEAD".to_string()
            )))))
        );
        Ok(())
    }

    #[rstest]
    #[case("")]
    #[case("two words")]
    #[case("a..b")]
    fn rejects_malformed_revisions(#[case] revision: &str) {
        assert!(Revision::try_parse(revision).is_err());
    }

    proptest! {
        #[test]
        fn parsing_is_deterministic(name in "[a-z][a-z0-9_-]{0,20}") {
            let first = Revision::try_parse(&name).expect("valid name");
            let second = Revision::try_parse(&name).expect("valid name");

            prop_assert_eq!(first, second);
        }
    }
}
