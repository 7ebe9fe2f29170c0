use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_ugit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

pub fn run_ugit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("ugit").expect("Failed to find ugit binary");
    cmd.envs(vec![("NO_PAGER", "1"), ("NO_COLOR", "1")]);
    cmd.env_remove("UGIT_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn ugit_commit(dir: &Path, message: &str) -> Command {
    run_ugit_command(dir, &["commit", "-m", message])
}

/// Stage everything and commit, returning the new commit's oid
pub fn commit_all(dir: &Path, message: &str) -> String {
    run_ugit_command(dir, &["add", "."]).assert().success();
    ugit_commit(dir, message).assert().success();

    head_oid(dir)
}

/// The oid HEAD resolves to, following one symbolic hop
pub fn head_oid(dir: &Path) -> String {
    let meta = dir.join(".ugit");
    let head = std::fs::read_to_string(meta.join("HEAD")).expect("Failed to read HEAD");

    match head.trim().strip_prefix("ref: ") {
        Some(target) => std::fs::read_to_string(meta.join(target))
            .expect("Failed to read branch")
            .trim()
            .to_string(),
        None => head.trim().to_string(),
    }
}

pub fn write_file(dir: &Path, path: &str, content: &str) {
    let path = dir.join(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    std::fs::write(path, content).expect("Failed to write file");
}

pub fn read_file(dir: &Path, path: &str) -> String {
    std::fs::read_to_string(dir.join(path)).expect("Failed to read file")
}
