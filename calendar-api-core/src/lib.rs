//! Core types for calendar-api.
//!
//! This crate provides the storage convention shared by the server and any tooling:
//! - `StateDocument` and `LatestPointer`, the two record kinds kept in the backing repo
//! - `version_path` helpers for naming and recognising version files
//! - `codec` for the base64 content encoding used by the upstream content API

pub mod codec;
pub mod error;
pub mod state;
pub mod version_path;

pub use error::{StoreError, StoreResult, TreeStage};
pub use state::*;
