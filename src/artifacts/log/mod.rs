//! Commit graph traversal
//!
//! - `rev_list`: breadth-first ancestry walk used by log and merge-base
//! - `reachable`: every commit, tree and blob reachable from a set of commits

pub mod reachable;
pub mod rev_list;
