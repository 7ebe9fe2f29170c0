use crate::areas::refs::{HEADS_PREFIX, TAGS_PREFIX};
use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::errors::StorageError;
use anyhow::Context;

/// A validated short ref name, e.g. `feature/login` or `v1.0`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: impl Into<String>) -> anyhow::Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(StorageError::invalid_ref("name cannot be empty").into());
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        if re.is_match(&name) {
            Err(StorageError::invalid_ref(format!("'{name}' is not a valid name")).into())
        } else {
            Ok(Self(name))
        }
    }

    pub fn to_branch_ref(&self) -> String {
        format!("{HEADS_PREFIX}{}", self.0)
    }

    pub fn to_tag_ref(&self) -> String {
        format!("{TAGS_PREFIX}{}", self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
