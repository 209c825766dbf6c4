use std::sync::Arc;

use crate::config::Config;
use crate::documents::DocumentFetcher;
use crate::screening::scorer::CompatibilityScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: DocumentFetcher,
    /// Pluggable compatibility scorer. Default: LlmCompatibilityScorer.
    pub scorer: Arc<dyn CompatibilityScorer>,
    pub config: Config,
}
