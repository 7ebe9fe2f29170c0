//! Storage engine error taxonomy
//!
//! Every failure detected by the engine itself is raised as one of the
//! [`StorageError`] variants and travels up wrapped in an `anyhow::Error`.
//! Callers that need to react to a specific failure can recover it with
//! `error.downcast_ref::<StorageError>()`; everything else (permissions,
//! disk full, ...) surfaces as a plain I/O error with context attached.

use crate::artifacts::objects::object_type::ObjectType;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// An object, ref or commit that was asked for does not exist
    #[error("not found: {0}")]
    NotFound(String),

    #[error("object {oid} is a {actual}, expected a {expected}")]
    TypeMismatch {
        oid: String,
        expected: ObjectType,
        actual: ObjectType,
    },

    #[error("corrupt object {oid}: {reason}")]
    CorruptObject { oid: String, reason: String },

    #[error("corrupt tree: {0}")]
    CorruptTree(String),

    #[error("corrupt commit: {0}")]
    CorruptCommit(String),

    /// A name passed to revision lookup matched no ref and is not an oid
    #[error("unknown name: {0}")]
    UnknownName(String),

    #[error("invalid ref {0}")]
    InvalidRef(String),

    #[error("a merge with {0} is in progress; commit it first")]
    MergeInProgress(String),
}

impl StorageError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn corrupt_object(oid: impl ToString, reason: impl Into<String>) -> Self {
        Self::CorruptObject {
            oid: oid.to_string(),
            reason: reason.into(),
        }
    }

    pub fn corrupt_tree(reason: impl Into<String>) -> Self {
        Self::CorruptTree(reason.into())
    }

    pub fn corrupt_commit(reason: impl Into<String>) -> Self {
        Self::CorruptCommit(reason.into())
    }

    pub fn invalid_ref(reason: impl Into<String>) -> Self {
        Self::InvalidRef(reason.into())
    }

    /// Look for a storage error anywhere in an `anyhow` chain
    pub fn find(error: &anyhow::Error) -> Option<&StorageError> {
        error.chain().find_map(|cause| cause.downcast_ref::<StorageError>())
    }
}
