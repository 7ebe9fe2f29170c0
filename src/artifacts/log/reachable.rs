//! Every object reachable from a set of commits
//!
//! [`ReachableObjects`] yields commits, their trees and every blob below
//! them, each oid once. An oid is handed out *before* the object is read:
//! the object is only loaded on the following call to `next`. That gap lets a
//! caller copy the object into the store being walked (see fetching) before
//! the walk needs its content.

use crate::areas::database::Database;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use std::collections::HashSet;

pub struct ReachableObjects<'d> {
    database: &'d Database,
    worklist: Vec<(ObjectId, ObjectType)>,
    /// Yielded last time, children not pushed yet
    pending: Option<(ObjectId, ObjectType)>,
    visited: HashSet<ObjectId>,
    failed: bool,
}

impl<'d> ReachableObjects<'d> {
    pub fn new(database: &'d Database, commits: impl IntoIterator<Item = ObjectId>) -> Self {
        let mut worklist = commits
            .into_iter()
            .map(|oid| (oid, ObjectType::Commit))
            .collect::<Vec<_>>();
        // the stack pops from the back, keep the callers' order
        worklist.reverse();

        ReachableObjects {
            database,
            worklist,
            pending: None,
            visited: HashSet::new(),
            failed: false,
        }
    }

    fn expand(&mut self, oid: &ObjectId, object_type: ObjectType) -> anyhow::Result<()> {
        match object_type {
            ObjectType::Commit => {
                let commit = self.database.parse_object_as_commit(oid)?;
                for parent in commit.parents().iter().rev() {
                    self.worklist.push((parent.clone(), ObjectType::Commit));
                }
                self.worklist
                    .push((commit.tree_oid().clone(), ObjectType::Tree));
            }
            ObjectType::Tree => {
                let tree = self.database.parse_object_as_tree(oid)?;
                let mut children = tree
                    .into_entries()
                    .map(|(_, entry)| (entry.oid, entry.object_type))
                    .collect::<Vec<_>>();
                children.reverse();
                self.worklist.extend(children);
            }
            ObjectType::Blob => {}
        }

        Ok(())
    }
}

impl Iterator for ReachableObjects<'_> {
    type Item = anyhow::Result<ObjectId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if let Some((oid, object_type)) = self.pending.take()
            && let Err(error) = self.expand(&oid, object_type)
        {
            self.failed = true;
            return Some(Err(error));
        }

        while let Some((oid, object_type)) = self.worklist.pop() {
            if self.visited.insert(oid.clone()) {
                self.pending = Some((oid.clone(), object_type));
                return Some(Ok(oid));
            }
        }

        None
    }
}
