//! Plumbing commands
//!
//! - `hash-object`: store a file as a blob
//! - `cat-file`: print a stored object's content
//! - `write-tree`: store the index as trees
//! - `read-tree`: load a tree into the index
//! - `merge-base`: print the common ancestor of two commits

pub mod cat_file;
pub mod hash_object;
pub mod merge_base;
pub mod read_tree;
pub mod write_tree;
