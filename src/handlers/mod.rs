mod ai;
mod documents;
mod health;
mod metrics;

pub use ai::{ClientId, complete_handler, generate_handler, preflight_handler, proofread_handler};
pub use documents::{load_document_handler, save_document_handler};
pub use health::health_handler;
pub use metrics::metrics_handler;
