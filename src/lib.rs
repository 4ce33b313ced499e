// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod collect;
pub mod config;
pub mod extract;
pub mod metrics;
pub mod notify;
pub mod recipients;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod validate;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::collect::types::{CollectedItem, ProviderError, ProviderHit, SearchProvider};
pub use crate::recipients::Recipient;
pub use crate::store::{Store, StoredItem};
