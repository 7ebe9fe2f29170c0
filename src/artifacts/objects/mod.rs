//! Object types and their serialised forms
//!
//! Everything the engine persists is one of three immutable, content
//! addressed objects:
//!
//! - **Blob**: raw file content
//! - **Tree**: a sorted listing of named blobs and subtrees
//! - **Commit**: a tree, its parent commits and a message
//!
//! On disk each object is `<type>\0<content>` and is keyed by the SHA-1 of
//! exactly those bytes.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
