use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;
use common::command::{
    commit_all, head_oid, init_repository_dir, read_file, repository_dir, run_ugit_command,
    ugit_commit, write_file,
};

#[rstest]
fn init_creates_the_metadata_directory(repository_dir: TempDir) -> anyhow::Result<()> {
    let meta = repository_dir.path().canonicalize()?.join(".ugit");

    run_ugit_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Initialized empty ugit repository in"))
        .stdout(predicate::str::contains(meta.display().to_string()));

    assert_eq!(
        std::fs::read_to_string(meta.join("HEAD"))?,
        "ref: refs/heads/master"
    );
    assert!(meta.join("objects").is_dir());
    assert!(meta.join("refs/tags").is_dir());
    Ok(())
}

#[rstest]
fn commands_fail_outside_a_repository(repository_dir: TempDir) {
    run_ugit_command(repository_dir.path(), &["status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found: ugit repository"));
}

#[rstest]
fn hash_object_and_cat_file_round_trip(init_repository_dir: TempDir) -> anyhow::Result<()> {
    let dir = init_repository_dir.path();
    write_file(dir, "hello.txt", "hello world\n");

    let output = run_ugit_command(dir, &["hash-object", "hello.txt"]).output()?;
    let oid = String::from_utf8(output.stdout)?.trim().to_string();

    assert_eq!(oid.len(), 40);
    run_ugit_command(dir, &["cat-file", &oid])
        .assert()
        .success()
        .stdout("hello world\n");
    run_ugit_command(dir, &["cat-file", &oid, "--type", "tree"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected a tree"));
    Ok(())
}

#[rstest]
fn commit_reports_branch_and_root(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(dir, "a.txt", "1");
    run_ugit_command(dir, &["add", "a.txt"]).assert().success();

    ugit_commit(dir, "first")
        .assert()
        .success()
        .stdout(
            predicate::str::is_match(r"^\[master \(root-commit\) [0-9a-f]{7}\] first\n$").unwrap(),
        );

    write_file(dir, "a.txt", "2");
    run_ugit_command(dir, &["add", "."]).assert().success();
    ugit_commit(dir, "second")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\[master [0-9a-f]{7}\] second\n$").unwrap());
}

#[rstest]
fn log_lists_history_newest_first(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(dir, "a.txt", "1");
    let c1 = commit_all(dir, "c1");
    write_file(dir, "a.txt", "2");
    let c2 = commit_all(dir, "c2");

    run_ugit_command(dir, &["log"])
        .assert()
        .success()
        .stdout(format!(
            "commit {c2} (HEAD, refs/heads/master)\n\n    c2\n\ncommit {c1}\n\n    c1\n\n"
        ));

    run_ugit_command(dir, &["log", "--oneline", "@^"])
        .assert()
        .success()
        .stdout(format!("{} c1\n", &c1[..7]));
}

#[rstest]
fn branch_checkout_and_status(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(dir, "a.txt", "1");
    commit_all(dir, "c1");

    run_ugit_command(dir, &["branch", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Branch feature created at"));
    run_ugit_command(dir, &["branch", "bad..name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid ref"));

    run_ugit_command(dir, &["checkout", "feature"])
        .assert()
        .success()
        .stdout("Switched to branch 'feature'\n");
    run_ugit_command(dir, &["branch"])
        .assert()
        .success()
        .stdout("* feature\n  master\n");

    write_file(dir, "a.txt", "changed");
    run_ugit_command(dir, &["status"])
        .assert()
        .success()
        .stdout(
            "On branch feature\n\nChanges not staged for commit:\n\n    modified: a.txt\n",
        );
}

#[rstest]
fn merge_with_conflicts_then_commit(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(dir, "a.txt", "base\n");
    commit_all(dir, "c1");
    run_ugit_command(dir, &["branch", "feature"]).assert().success();

    write_file(dir, "a.txt", "master\n");
    let master = commit_all(dir, "on master");

    run_ugit_command(dir, &["checkout", "feature"]).assert().success();
    write_file(dir, "a.txt", "feature\n");
    let feature = commit_all(dir, "on feature");

    run_ugit_command(dir, &["checkout", "master"]).assert().success();
    run_ugit_command(dir, &["merge", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "CONFLICT (content): Merge conflict in a.txt",
        ));
    assert_eq!(
        read_file(dir, "a.txt"),
        "<<<<<<< HEAD\nmaster\n=======\nfeature\n>>>>>>> feature\n"
    );

    run_ugit_command(dir, &["checkout", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("merge"));

    write_file(dir, "a.txt", "resolved\n");
    let merged = commit_all(dir, "merge feature");

    run_ugit_command(dir, &["cat-file", &merged])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "parent {master}\nparent {feature}\n"
        )));
    run_ugit_command(dir, &["merge-base", "master", "feature"])
        .assert()
        .success()
        .stdout(format!("{feature}\n"));
}

#[rstest]
fn fast_forward_moves_the_branch(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(dir, "a.txt", "1");
    commit_all(dir, "c1");
    run_ugit_command(dir, &["branch", "feature"]).assert().success();
    run_ugit_command(dir, &["checkout", "feature"]).assert().success();
    write_file(dir, "b.txt", "2");
    let tip = commit_all(dir, "c2");
    run_ugit_command(dir, &["checkout", "master"]).assert().success();

    run_ugit_command(dir, &["merge", "feature"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Fast-forward"));

    assert_eq!(head_oid(dir), tip);
    assert_eq!(read_file(dir, "b.txt"), "2");
}
