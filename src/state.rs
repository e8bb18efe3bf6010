use std::sync::Arc;

use dashmap::DashMap;

use crate::models::DocumentRecord;
use crate::rate_limit::RateLimiter;
use crate::upstream::CompletionBackend;

// App's shared state: the limiter map and the document store are the only
// cross-request mutable pieces.
pub struct AppState {
    pub backend: Arc<dyn CompletionBackend>,
    pub rate_limiter: RateLimiter,
    pub documents: DashMap<String, DocumentRecord>,
}

impl AppState {
    pub fn new(backend: Arc<dyn CompletionBackend>, rate_limit: u32, rate_window_secs: u64) -> Self {
        Self {
            backend,
            rate_limiter: RateLimiter::new(rate_limit, rate_window_secs),
            documents: DashMap::new(),
        }
    }
}
