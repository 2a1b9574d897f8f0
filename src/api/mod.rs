pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::search::SearchService;
use crate::state::PropertyStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    pub public_dir: PathBuf,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(search: Arc<SearchService>, public_dir: impl Into<PathBuf>) -> Self {
        Self {
            search,
            public_dir: public_dir.into(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Set the whole-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn PropertyStore> {
        self.search.store()
    }
}
