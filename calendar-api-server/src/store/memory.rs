//! In-memory [`ContentStore`] for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use calendar_api_core::{StoreError, StoreResult, TreeStage};
use serde_json::Value;

use super::{ContentStore, EntryKind, TreeEntry};

/// A commit recorded by [`MemoryStore::write_json`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedWrite {
    pub path: String,
    pub message: String,
}

#[derive(Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<String, Value>>,
    writes: Mutex<Vec<RecordedWrite>>,
    fail_listing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose tree listing fails at the ref stage.
    pub fn with_broken_tree() -> Self {
        MemoryStore {
            fail_listing: true,
            ..Self::default()
        }
    }

    /// Seed a file without recording a write.
    pub fn insert(&self, path: &str, value: Value) {
        self.files.lock().unwrap().insert(path.to_string(), value);
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn read_json(&self, path: &str) -> StoreResult<Value> {
        self.get(path).ok_or_else(|| StoreError::NotFound {
            path: path.to_string(),
            body: r#"{"message":"Not Found"}"#.to_string(),
        })
    }

    async fn write_json(&self, path: &str, value: &Value, message: &str) -> StoreResult<()> {
        self.insert(path, value.clone());
        self.writes.lock().unwrap().push(RecordedWrite {
            path: path.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    async fn list_tree(&self) -> StoreResult<Vec<TreeEntry>> {
        if self.fail_listing {
            return Err(StoreError::Stage {
                stage: TreeStage::Ref,
                status: 404,
                body: r#"{"message":"Not Found"}"#.to_string(),
            });
        }

        let files = self.files.lock().unwrap();
        let mut entries = vec![TreeEntry {
            path: "data/versions".to_string(),
            kind: EntryKind::Tree,
        }];
        entries.extend(files.keys().map(|path| TreeEntry {
            path: path.clone(),
            kind: EntryKind::Blob,
        }));
        Ok(entries)
    }
}
