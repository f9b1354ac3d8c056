// Application state module
// Shared, immutable per-process state handed to every connection

use super::types::Config;
use crate::reports::ReportService;
use crate::store::DocumentStore;

/// Application state
pub struct AppState<S> {
    pub config: Config,
    pub service: ReportService<S>,
}

impl<S: DocumentStore> AppState<S> {
    pub const fn new(config: Config, store: S) -> Self {
        Self {
            config,
            service: ReportService::new(store),
        }
    }
}
