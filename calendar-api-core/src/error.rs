//! Error types for the versioned store.

use std::fmt;

use thiserror::Error;

/// The three chained lookups needed to list the repository tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeStage {
    Ref,
    Commit,
    Tree,
}

impl fmt::Display for TreeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TreeStage::Ref => "branch ref",
            TreeStage::Commit => "branch commit",
            TreeStage::Tree => "repository tree",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while talking to the backing content store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("GitHub GET {path} -> 404: {body}")]
    NotFound { path: String, body: String },

    #[error("GitHub {operation} -> {status}: {body}")]
    Upstream {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("Could not read {stage} -> {status}: {body}")]
    Stage {
        stage: TreeStage,
        status: u16,
        body: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Could not decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_embeds_operation_and_status() {
        let err = StoreError::Upstream {
            operation: "PUT data/latest.json".to_string(),
            status: 409,
            body: "sha mismatch".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "GitHub PUT data/latest.json -> 409: sha mismatch"
        );
    }

    #[test]
    fn test_stage_message_names_stage() {
        let err = StoreError::Stage {
            stage: TreeStage::Commit,
            status: 500,
            body: String::new(),
        };
        assert!(err.to_string().starts_with("Could not read branch commit"));
    }
}
