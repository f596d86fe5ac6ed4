//! Save, restore and list calendar state versions on top of a [`ContentStore`].
//!
//! Every operation is a strict sequence of store calls. Nothing here guards
//! the latest pointer against concurrent writers: two saves or restores that
//! overlap both succeed and whichever pointer write lands last wins. A failed
//! pointer write after a successful version write leaves an orphaned version
//! behind.

use std::sync::Arc;

use calendar_api_core::version_path::{self, LATEST_PATH};
use calendar_api_core::{LatestPointer, StateDocument, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::store::ContentStore;

/// Calendar data submitted for a new version.
#[derive(Debug, Clone)]
pub struct NewVersion {
    pub year: Value,
    pub days: Map<String, Value>,
    pub saved_by: Option<String>,
}

/// Outcome of a successful save.
#[derive(Debug, Clone, PartialEq)]
pub struct Saved {
    pub latest: LatestPointer,
    pub version_path: String,
}

#[derive(Clone)]
pub struct Versions {
    store: Arc<dyn ContentStore>,
}

impl Versions {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Versions { store }
    }

    async fn write_pointer(&self, pointer: &LatestPointer, message: &str) -> StoreResult<()> {
        let value = serde_json::to_value(pointer)?;
        self.store.write_json(LATEST_PATH, &value, message).await
    }

    /// The stored latest pointer, as written, and the document it references.
    pub async fn latest(&self) -> StoreResult<(Value, Value)> {
        let stored = self.store.read_json(LATEST_PATH).await?;
        let pointer = LatestPointer::deserialize(&stored).map_err(|e| StoreError::Decode {
            path: LATEST_PATH.to_string(),
            reason: e.to_string(),
        })?;

        let state = self.store.read_json(&pointer.current).await?;
        Ok((stored, state))
    }

    /// Write a new version document, then point latest at it.
    pub async fn save(&self, new: NewVersion, now: DateTime<Utc>) -> StoreResult<Saved> {
        let version_path = version_path::for_timestamp(now);
        let document = StateDocument::new(new.year, new.days, new.saved_by, now);

        let value = serde_json::to_value(&document)?;
        self.store
            .write_json(&version_path, &value, &format!("save: {}", version_path))
            .await?;

        let latest = LatestPointer::new(version_path.clone(), now);
        self.write_pointer(&latest, &format!("save: update latest -> {}", version_path))
            .await?;

        info!(%version_path, saved_by = %document.meta.saved_by, "saved new version");
        Ok(Saved {
            latest,
            version_path,
        })
    }

    /// Point latest at an existing version. Fails without writing if the version can't be read.
    pub async fn restore(&self, path: &str, now: DateTime<Utc>) -> StoreResult<LatestPointer> {
        self.store.read_json(path).await?;

        let latest = LatestPointer::new(path, now);
        self.write_pointer(&latest, &format!("restore: {}", path))
            .await?;

        info!(version_path = %path, "restored version");
        Ok(latest)
    }

    /// All version paths on the branch, newest first.
    pub async fn list(&self) -> StoreResult<Vec<String>> {
        let mut versions: Vec<String> = self
            .store
            .list_tree()
            .await?
            .into_iter()
            .filter(|entry| entry.is_file() && version_path::is_version_path(&entry.path))
            .map(|entry| entry.path)
            .collect();

        version_path::sort_descending(&mut versions);
        Ok(versions)
    }
}
