//! Command implementations
//!
//! Every command is an `impl Repository` block writing its output to the
//! repository's writer.
//!
//! - `plumbing`: direct object and tree manipulation (hash-object, cat-file,
//!   write-tree, read-tree, merge-base)
//! - `porcelain`: the day-to-day workflow (init, add, commit, log, merge, ...)

pub mod plumbing;
pub mod porcelain;
