//! Index file format
//!
//! The index stores the flat `path -> blob oid` mapping that the next commit's
//! tree is built from.
//!
//! ## File Format
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "UIDX" (4 bytes)
//!   - Version: 1 (4 bytes, big-endian)
//!   - Entry count (4 bytes, big-endian)
//!
//! Entries, sorted by path:
//!   - Path length (2 bytes, big-endian)
//!   - Path (UTF-8, `/`-separated)
//!   - Object id (20 bytes, binary)
//!
//! Checksum (20 bytes):
//!   - SHA-1 of all preceding bytes
//! ```

pub mod checksum;
pub mod index_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12;

/// Magic signature identifying index files
pub const SIGNATURE: &str = "UIDX";

/// Index file format version
pub const VERSION: u32 = 1;

/// Size of an object id in its binary form
pub const BINARY_OID_SIZE: usize = 20;
