use crate::config::QueryConfig;
use crate::services::QueryService;
use std::sync::Arc;

/// Application state shared by all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Query service over the cached dataset views
    pub query_service: Arc<dyn QueryService>,
    /// Bounds for request parameters
    pub query_config: Arc<QueryConfig>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("query_service", &"Arc<dyn QueryService>")
            .field("query_config", &self.query_config)
            .finish()
    }
}

impl AppState {
    /// Create new application state
    pub fn new(query_service: Arc<dyn QueryService>, query_config: QueryConfig) -> Self {
        Self {
            query_service,
            query_config: Arc::new(query_config),
        }
    }
}
