//! Diff algorithms and tree comparison
//!
//! - `diff_algorithm`: Myers' diff and hunk grouping for line-by-line comparison
//! - `diff_target`: one side of a file diff, loaded from the object store
//! - `patch`: unified-style rendering of the changes between two trees
//! - `tree_diff`: path-level classification of what changed between trees

pub mod diff_algorithm;
pub mod diff_target;
pub mod patch;
pub mod tree_diff;
