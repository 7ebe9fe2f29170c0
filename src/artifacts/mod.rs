//! Data structures and algorithms
//!
//! - `branch`: branch names and revision lookup
//! - `core`: shared utilities (pager wrapper)
//! - `database`: entry type stored in trees
//! - `diff`: Myers' diff, tree comparison and patch output
//! - `index`: on-disk index format pieces
//! - `log`: commit ancestry and reachability traversals
//! - `merge`: merge base and three-way merge
//! - `objects`: blob, tree and commit objects

pub mod branch;
pub mod core;
pub mod database;
pub mod diff;
pub mod index;
pub mod log;
pub mod merge;
pub mod objects;
