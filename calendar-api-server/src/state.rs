use std::sync::Arc;

use anyhow::Result;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::cors::CorsPolicy;
use crate::store::ContentStore;
use crate::store::github::GitHubStore;
use crate::versions::Versions;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub versions: Versions,
    pub cors: Arc<CorsPolicy>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wire the GitHub-backed store and the system clock from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let store = Arc::new(GitHubStore::new(config)?);
        let cors = CorsPolicy::from_config(config)?;
        Ok(Self::with_parts(store, cors, Arc::new(SystemClock)))
    }

    pub fn with_parts(store: Arc<dyn ContentStore>, cors: CorsPolicy, clock: Arc<dyn Clock>) -> Self {
        AppState {
            versions: Versions::new(store),
            cors: Arc::new(cors),
            clock,
        }
    }
}
