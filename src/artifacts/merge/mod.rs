//! Merge algorithms
//!
//! - `merge_base`: the common ancestor a three-way merge starts from
//! - `text_merge`: line-level three-way merge with conflict markers
//! - `tree_merge`: per-path three-way merge of flattened trees

pub mod merge_base;
pub mod text_merge;
pub mod tree_merge;
