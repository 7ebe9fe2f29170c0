use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::HashSet;
use ugit::areas::refs::RefValue;

mod common;
use common::repository::{TestRepository, repo};

#[rstest]
fn reachable_objects_cover_commits_trees_and_blobs(repo: TestRepository) -> anyhow::Result<()> {
    repo.write("a.txt", "1");
    repo.write("dir/b.txt", "2");
    let c1 = repo.commit_all("c1");
    repo.write("a.txt", "3");
    let c2 = repo.commit_all("c2");

    let objects = repo
        .repository
        .iter_objects_reachable_from([c2.clone()])
        .collect::<anyhow::Result<Vec<_>>>()?;
    let unique = objects.iter().cloned().collect::<HashSet<_>>();

    // two commits, two root trees, one shared `dir` tree, three blobs
    assert_eq!(objects.len(), 8);
    assert_eq!(unique.len(), objects.len());
    assert_eq!(objects.first(), Some(&c2));
    assert!(unique.contains(&c1));
    Ok(())
}

#[rstest]
fn fetch_copies_remote_branches(
    #[from(repo)] local: TestRepository,
    #[from(repo)] remote: TestRepository,
) -> anyhow::Result<()> {
    remote.write("a.txt", "remote");
    let tip = remote.commit_all("remote work");

    local.repository.fetch(remote.path())?;

    let (_, fetched) = local
        .repository
        .refs()
        .resolve("refs/remote/master", false)?;
    assert_eq!(fetched, RefValue::direct(&tip));
    for oid in local.repository.iter_objects_reachable_from([tip.clone()]) {
        assert!(local.repository.database().exists(&oid?));
    }
    assert_eq!(
        local.tree_of(&tip).keys().cloned().collect::<Vec<_>>(),
        vec!["a.txt".to_string()]
    );
    Ok(())
}

#[rstest]
fn push_fast_forwards_the_remote_branch(
    #[from(repo)] local: TestRepository,
    #[from(repo)] remote: TestRepository,
) -> anyhow::Result<()> {
    local.write("a.txt", "1");
    let c1 = local.commit_all("c1");
    local.repository.push(remote.path(), "master")?;
    assert_eq!(remote.head(), Some(c1));

    local.write("a.txt", "2");
    let c2 = local.commit_all("c2");
    local.repository.push(remote.path(), "master")?;

    assert_eq!(remote.head(), Some(c2.clone()));
    assert_eq!(remote.blob_text(&remote.tree_of(&c2)["a.txt"]), "2");
    Ok(())
}

#[rstest]
fn push_refuses_to_overwrite_diverged_work(
    #[from(repo)] local: TestRepository,
    #[from(repo)] remote: TestRepository,
) -> anyhow::Result<()> {
    remote.write("a.txt", "theirs");
    let theirs = remote.commit_all("theirs");
    local.write("a.txt", "ours");
    local.commit_all("ours");

    assert!(local.repository.push(remote.path(), "master").is_err());
    assert_eq!(remote.head(), Some(theirs));
    Ok(())
}
