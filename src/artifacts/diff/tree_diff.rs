//! Path-level comparison of two flattened trees

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::FlatTree;
use std::collections::BTreeSet;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeType {
    Added,
    Deleted,
    Modified,
}

impl ChangeType {
    pub fn from_oids(old: Option<&ObjectId>, new: Option<&ObjectId>) -> Option<Self> {
        match (old, new) {
            (None, Some(_)) => Some(ChangeType::Added),
            (Some(_), None) => Some(ChangeType::Deleted),
            (Some(old), Some(new)) if old != new => Some(ChangeType::Modified),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "new file",
            ChangeType::Deleted => "deleted",
            ChangeType::Modified => "modified",
        }
    }
}

impl Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every path whose oid differs between `a` and `b`, in path order
pub fn changed_files(a: &FlatTree, b: &FlatTree) -> Vec<(String, ChangeType)> {
    a.keys()
        .chain(b.keys())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter_map(|path| {
            ChangeType::from_oids(a.get(path), b.get(path)).map(|change| (path.clone(), change))
        })
        .collect()
}

/// Union of the paths of several trees, each with its oid per tree
pub fn compare_trees<'t, const N: usize>(
    trees: [&'t FlatTree; N],
) -> impl Iterator<Item = (&'t String, [Option<&'t ObjectId>; N])> {
    trees
        .into_iter()
        .flat_map(|tree| tree.keys())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(move |path| (path, trees.map(|tree| tree.get(path))))
}
