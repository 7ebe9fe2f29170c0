//! Porcelain commands
//!
//! - `init`: create the metadata directory
//! - `add`: stage files and directories
//! - `commit`: record the index as a commit
//! - `log`, `show`: walk and display history
//! - `checkout`, `reset`: move HEAD
//! - `branch`, `tag`: name commits
//! - `status`, `diff`: compare HEAD, the index and the working tree
//! - `merge`: fast-forward or three-way merge into HEAD
//! - `fetch`, `push`: copy objects between local repositories

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod diff;
pub mod fetch;
pub mod init;
pub mod log;
pub mod merge;
pub mod push;
pub mod reset;
pub mod show;
pub mod status;
pub mod tag;
