use std::sync::Arc;

use crate::chat::matcher::Matcher;
use crate::config::Config;
use crate::dataset::Dataset;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    /// Embedder, candidate concurrency and the optional precomputed index.
    pub matcher: Matcher,
    pub config: Config,
}
