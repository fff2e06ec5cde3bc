//! Build failures and soft warnings

use crate::core::MissingField;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal layout errors. A build that hits one returns no model at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The same sha appears on more than one record
    #[error("duplicate commit: {sha}")]
    DuplicateCommit { sha: String },

    /// A commit's parent chain loops back to itself
    #[error("cyclic history at commit {sha}")]
    CyclicHistory { sha: String },
}

/// Problems absorbed during a build and reported alongside the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BuildWarning {
    /// Record at `index` lacked a required field and was dropped
    MalformedCommitRecord { index: usize, missing: MissingField },
    /// `parent` of `sha` is not part of the input set
    UnresolvedParent { sha: String, parent: String },
}

impl std::fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildWarning::MalformedCommitRecord { index, missing } => {
                write!(f, "record #{} dropped: missing {:?}", index, missing)
            }
            BuildWarning::UnresolvedParent { sha, parent } => {
                write!(f, "commit {} references unknown parent {}", sha, parent)
            }
        }
    }
}
