use assert_fs::TempDir;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use ugit::areas::database::Database;
use ugit::artifacts::diff::patch::PatchWriter;
use ugit::artifacts::diff::tree_diff::{ChangeType, changed_files};
use ugit::artifacts::objects::object_id::ObjectId;
use ugit::artifacts::objects::object_type::ObjectType;
use ugit::artifacts::objects::tree::{FlatTree, TreeBuilder};
use ugit::errors::StorageError;

mod common;
use common::repository::{TestRepository, repo};

/// `a.txt=1, b.txt=2` as c1, then `a.txt=3` as c2
fn two_commits(repo: &TestRepository) -> (ObjectId, ObjectId) {
    repo.write("a.txt", "1");
    repo.write("b.txt", "2");
    let c1 = repo.commit_all("c1");

    repo.write("a.txt", "3");
    let c2 = repo.commit_all("c2");

    (c1, c2)
}

#[rstest]
fn first_commit_is_a_root_and_the_next_one_points_back(repo: TestRepository) -> anyhow::Result<()> {
    let (c1, c2) = two_commits(&repo);

    assert!(repo.repository.get_commit(&c1)?.parents().is_empty());
    assert_eq!(repo.repository.get_commit(&c2)?.parents(), &[c1.clone()]);
    assert_eq!(repo.head(), Some(c2));
    Ok(())
}

#[rstest]
fn history_walks_back_from_the_tip(repo: TestRepository) -> anyhow::Result<()> {
    let (c1, c2) = two_commits(&repo);

    let history = repo
        .repository
        .ancestors([c2.clone()])
        .collect::<anyhow::Result<Vec<_>>>()?;

    assert_eq!(history, vec![c2, c1]);
    Ok(())
}

#[rstest]
fn only_the_modified_file_changes(repo: TestRepository) -> anyhow::Result<()> {
    let (c1, c2) = two_commits(&repo);

    let changes = changed_files(&repo.tree_of(&c1), &repo.tree_of(&c2));

    assert_eq!(changes, vec![("a.txt".to_string(), ChangeType::Modified)]);
    Ok(())
}

#[rstest]
fn patch_mentions_only_the_modified_file(repo: TestRepository) -> anyhow::Result<()> {
    let (c1, c2) = two_commits(&repo);
    let mut patch = Vec::new();

    PatchWriter::new(repo.repository.database(), false).write_tree_diff(
        &repo.tree_of(&c1),
        &repo.tree_of(&c2),
        &mut patch,
    )?;
    let patch = String::from_utf8(patch)?;

    assert!(patch.contains("a/a.txt"));
    assert!(patch.contains("-1"));
    assert!(patch.contains("+3"));
    assert!(!patch.contains("b.txt"));
    Ok(())
}

#[rstest]
fn log_decorates_commits_with_their_refs(repo: TestRepository) -> anyhow::Result<()> {
    let (c1, c2) = two_commits(&repo);
    repo.repository.create_tag("v1", &c1)?;
    repo.output.take();

    repo.repository.log("@", Default::default())?;

    assert_eq!(
        repo.output.take(),
        format!(
            "commit {c2} (HEAD, refs/heads/master)\n\n    c2\n\ncommit {c1} (refs/tags/v1)\n\n    c1\n\n"
        )
    );
    Ok(())
}

#[rstest]
fn names_resolve_through_refs_and_ancestry(repo: TestRepository) -> anyhow::Result<()> {
    let (c1, c2) = two_commits(&repo);
    repo.repository.create_branch("feature", &c1)?;
    repo.repository.create_tag("v2", &c2)?;

    assert_eq!(repo.repository.resolve_name("@")?, c2);
    assert_eq!(repo.repository.resolve_name("feature")?, c1);
    assert_eq!(repo.repository.resolve_name("refs/tags/v2")?, c2);
    assert_eq!(repo.repository.resolve_name("master^")?, c1);
    assert_eq!(repo.repository.resolve_name("@~1")?, c1);
    assert_eq!(repo.repository.resolve_name(c1.as_ref())?, c1);

    let error = repo
        .repository
        .resolve_name("missing")
        .expect_err("no such ref");
    assert!(matches!(
        StorageError::find(&error),
        Some(StorageError::UnknownName(_))
    ));
    Ok(())
}

#[rstest]
fn branches_cannot_be_created_twice_or_with_bad_names(repo: TestRepository) -> anyhow::Result<()> {
    let (c1, _) = two_commits(&repo);

    repo.repository.create_branch("topic", &c1)?;

    for (name, reason) in [("topic", "duplicate"), ("bad..name", "malformed")] {
        let error = repo
            .repository
            .create_branch(name, &c1)
            .expect_err(reason);
        assert!(matches!(
            StorageError::find(&error),
            Some(StorageError::InvalidRef(_))
        ));
    }
    Ok(())
}

#[rstest]
fn reset_moves_the_branch_and_leaves_files_alone(repo: TestRepository) -> anyhow::Result<()> {
    let (c1, _) = two_commits(&repo);

    repo.repository.reset(c1.as_ref())?;

    assert_eq!(repo.head(), Some(c1.clone()));
    assert_eq!(repo.repository.resolve_name("master")?, c1);
    assert_eq!(repo.read("a.txt"), "3");
    Ok(())
}

#[rstest]
fn checkout_of_an_oid_detaches_head(repo: TestRepository) -> anyhow::Result<()> {
    let (c1, _) = two_commits(&repo);

    repo.repository.checkout(c1.as_ref())?;

    assert_eq!(repo.repository.refs().current_branch()?, None);
    assert_eq!(repo.head(), Some(c1));
    assert_eq!(repo.read("a.txt"), "1");
    Ok(())
}

#[rstest]
fn checkout_of_a_branch_keeps_head_symbolic(repo: TestRepository) -> anyhow::Result<()> {
    let (c1, c2) = two_commits(&repo);
    repo.repository.create_branch("old", &c1)?;

    repo.repository.checkout("old")?;
    assert_eq!(repo.repository.refs().current_branch()?, Some("old".to_string()));
    assert_eq!(repo.read("a.txt"), "1");

    repo.repository.checkout("master")?;
    assert_eq!(repo.head(), Some(c2));
    assert_eq!(repo.read("a.txt"), "3");
    Ok(())
}

#[rstest]
fn checkout_prefers_the_branch_over_a_tag_of_the_same_name(
    repo: TestRepository,
) -> anyhow::Result<()> {
    let (c1, c2) = two_commits(&repo);
    repo.repository.create_tag("v1", &c1)?;
    repo.repository.create_branch("v1", &c2)?;

    repo.repository.checkout("v1")?;

    assert_eq!(repo.repository.refs().current_branch()?, Some("v1".to_string()));
    assert_eq!(repo.head(), Some(c2.clone()));
    assert_eq!(repo.read("a.txt"), "3");
    assert_eq!(repo.index(), repo.tree_of(&c2));
    Ok(())
}

#[rstest]
fn cat_file_checks_the_expected_type(repo: TestRepository) -> anyhow::Result<()> {
    let (c1, _) = two_commits(&repo);
    repo.output.take();

    repo.repository.cat_file(c1.as_ref(), Some(ObjectType::Commit))?;
    assert!(repo.output.take().ends_with("\n\nc1\n"));

    let error = repo
        .repository
        .cat_file(c1.as_ref(), Some(ObjectType::Blob))
        .expect_err("a commit is not a blob");
    assert!(matches!(
        StorageError::find(&error),
        Some(StorageError::TypeMismatch { .. })
    ));
    Ok(())
}

/// Drop entries that would be both a file and a directory
fn without_clashes(entries: FlatTree) -> FlatTree {
    let paths = entries.keys().cloned().collect::<Vec<_>>();

    entries
        .into_iter()
        .filter(|(path, _)| {
            let prefix = format!("{path}/");
            !paths.iter().any(|other| other.starts_with(&prefix))
        })
        .collect()
}

fn flat_index() -> impl Strategy<Value = FlatTree> {
    prop::collection::btree_map("[a-c]{1,2}(/[a-c]{1,2}){0,2}", "[a-z]{0,8}", 1..12).prop_map(
        |files| {
            without_clashes(
                files
                    .into_iter()
                    .map(|(path, content)| {
                        let oid = ObjectId::hash(ObjectType::Blob, content.as_bytes());
                        (path, oid)
                    })
                    .collect(),
            )
        },
    )
}

proptest! {
    #[test]
    fn building_then_flattening_a_tree_round_trips(index in flat_index()) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let database = Database::new(dir.path().join("objects").into_boxed_path());

        let tree = TreeBuilder::build(&index)
            .and_then(|builder| builder.write(&database))
            .expect("write tree");
        let flat = database.flatten_tree(Some(&tree)).expect("flatten tree");

        prop_assert_eq!(flat, index);
    }
}
