use std::sync::Arc;

use crate::config::Config;
use crate::ingest::{ImportOrchestrator, ImportSettings};
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable datastore. Default: `PgStore`.
    pub store: Arc<dyn Store>,
    pub importer: Arc<ImportOrchestrator>,
    /// Synonym table and classifier rules shared by preview and import.
    pub settings: Arc<ImportSettings>,
    pub config: Config,
}
