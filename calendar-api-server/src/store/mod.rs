//! Backing store for versioned documents.
//!
//! [`ContentStore`] is the seam between the versions service and the upstream
//! content API: path-addressed JSON reads and writes plus a flat listing of
//! everything on the configured branch.

pub mod github;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use calendar_api_core::StoreResult;
use serde::Deserialize;
use serde_json::Value;

/// Kind of object a tree entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    Commit,
    #[serde(other)]
    Other,
}

/// One entry of a recursive tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::Blob
    }
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Read and parse the JSON document at `path`.
    async fn read_json(&self, path: &str) -> StoreResult<Value>;

    /// Create or replace the document at `path`, recording `message` as the commit message.
    async fn write_json(&self, path: &str, value: &Value, message: &str) -> StoreResult<()>;

    /// Every entry reachable from the head of the configured branch.
    async fn list_tree(&self) -> StoreResult<Vec<TreeEntry>>;
}
