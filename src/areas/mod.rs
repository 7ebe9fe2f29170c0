//! Repository areas
//!
//! - `database`: content-addressed object store under `.ugit/objects`
//! - `index`: the staged `path -> oid` snapshot
//! - `refs`: HEAD, MERGE_HEAD, branches and tags
//! - `repository`: the handle tying the areas to one root directory
//! - `workspace`: files in the working directory

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
