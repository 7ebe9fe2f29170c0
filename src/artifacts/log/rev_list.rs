//! Ancestry traversal
//!
//! [`Ancestors`] walks the parent graph breadth first from a set of commits.
//! A commit's first parent goes to the front of the queue and any further
//! parents to the back, so a linear first-parent history comes out in order
//! before merged-in branches are visited. Every commit is yielded once.
//!
//! The walk takes a parent loader rather than a database so it can run over
//! any commit store; `Repository::ancestors` plugs in the object store.

use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{HashSet, VecDeque};

pub struct Ancestors<ParentLoaderFn>
where
    ParentLoaderFn: FnMut(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    parent_loader: ParentLoaderFn,
    queue: VecDeque<ObjectId>,
    visited: HashSet<ObjectId>,
    failed: bool,
}

impl<ParentLoaderFn> Ancestors<ParentLoaderFn>
where
    ParentLoaderFn: FnMut(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    pub fn new(starts: impl IntoIterator<Item = ObjectId>, parent_loader: ParentLoaderFn) -> Self {
        Ancestors {
            parent_loader,
            queue: starts.into_iter().collect(),
            visited: HashSet::new(),
            failed: false,
        }
    }
}

impl<ParentLoaderFn> Iterator for Ancestors<ParentLoaderFn>
where
    ParentLoaderFn: FnMut(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    type Item = anyhow::Result<ObjectId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        while let Some(oid) = self.queue.pop_front() {
            if !self.visited.insert(oid.clone()) {
                continue;
            }

            let parents = match (self.parent_loader)(&oid) {
                Ok(parents) => parents,
                Err(error) => {
                    self.failed = true;
                    return Some(Err(error));
                }
            };

            let mut parents = parents.into_iter();
            if let Some(first) = parents.next() {
                self.queue.push_front(first);
            }
            self.queue.extend(parents);

            tracing::trace!(%oid, pending = self.queue.len(), "visiting commit");
            return Some(Ok(oid));
        }

        None
    }
}
