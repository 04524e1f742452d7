use std::sync::Arc;

use crate::llm_client::CompletionClient;
use crate::social::twitter::TwitterClient;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Injected storage interface. Production uses the flat-file `FileStore`;
    /// handlers only see the trait.
    pub store: Arc<dyn Store>,
    pub llm: CompletionClient,
    pub twitter: TwitterClient,
}
