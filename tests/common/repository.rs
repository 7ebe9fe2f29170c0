use assert_fs::TempDir;
use rstest::fixture;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use ugit::areas::repository::Repository;
use ugit::artifacts::objects::object_id::ObjectId;
use ugit::artifacts::objects::tree::FlatTree;

/// Captures what commands print
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.borrow_mut());
        String::from_utf8(bytes).expect("utf-8 output")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub struct TestRepository {
    pub dir: TempDir,
    pub repository: Repository,
    pub output: SharedBuffer,
}

impl TestRepository {
    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }

    pub fn write(&self, path: &str, content: &str) {
        let path = self.dir.path().join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(path)).expect("Failed to read file")
    }

    pub fn commit_all(&self, message: &str) -> ObjectId {
        self.repository.add(&["."]).expect("add");
        self.repository.commit(message).expect("commit")
    }

    pub fn head(&self) -> Option<ObjectId> {
        self.repository.refs().read_head().expect("read HEAD")
    }

    pub fn merge_head(&self) -> Option<ObjectId> {
        self.repository
            .refs()
            .read_merge_head()
            .expect("read MERGE_HEAD")
    }

    pub fn index(&self) -> FlatTree {
        self.repository
            .open_index()
            .expect("load index")
            .into_entries()
    }

    pub fn blob_text(&self, oid: &ObjectId) -> String {
        let blob = self
            .repository
            .database()
            .parse_object_as_blob(oid)
            .expect("load blob");
        String::from_utf8(blob.into_content().to_vec()).expect("utf-8 blob")
    }

    pub fn tree_of(&self, commit: &ObjectId) -> FlatTree {
        self.repository
            .commit_tree(Some(commit))
            .expect("flatten commit tree")
    }
}

pub fn open_test_repository(dir: TempDir) -> TestRepository {
    let output = SharedBuffer::default();
    let repository =
        Repository::new(dir.path(), Box::new(output.clone())).expect("open repository");
    repository.init().expect("init repository");
    output.take();

    TestRepository {
        dir,
        repository,
        output,
    }
}

#[fixture]
pub fn repo() -> TestRepository {
    open_test_repository(TempDir::new().expect("Failed to create temp dir"))
}
