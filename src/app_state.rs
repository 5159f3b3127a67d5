//! Implements a struct that holds the state of the REST server.

use std::sync::Arc;

use crate::chart::{ChartKind, ChartRequest};

/// The default cap on the number of records in one request.
pub const DEFAULT_MAX_ROWS: usize = 10_000;

/// The settings the server is started with.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Requests with more records than this are rejected.
    pub max_rows: usize,

    /// The charts drawn when a request does not ask for any.
    pub default_charts: Vec<ChartRequest>,

    /// The title shown on the dashboard page.
    pub title: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            default_charts: ChartKind::ALL.into_iter().map(ChartRequest::from).collect(),
            title: "Spending Dashboard".to_owned(),
        }
    }
}

/// The state of the REST server.
///
/// The state is read-only, each request works on its own copy of the records.
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
}

impl AppState {
    /// Create the server state from `config`.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// The maximum number of records accepted in one request.
    pub fn max_rows(&self) -> usize {
        self.config.max_rows
    }

    /// The charts drawn when a request does not ask for any.
    pub fn default_charts(&self) -> &[ChartRequest] {
        &self.config.default_charts
    }

    /// The title shown on the dashboard page.
    pub fn title(&self) -> &str {
        &self.config.title
    }
}

impl From<ServerConfig> for AppState {
    fn from(config: ServerConfig) -> Self {
        Self::new(config)
    }
}
