// src/collect/types.rs
use chrono::{DateTime, Utc};

/// One normalized hit returned by a provider backend. Every backend converts
/// its raw response into this shape before it crosses the gateway boundary.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProviderHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub published_at: Option<String>,
}

/// One collected news item as assembled by a collection run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CollectedItem {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub source_query: String,
    pub collected_at: DateTime<Utc>,
    pub sent: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider not configured: {0} missing")]
    Config(&'static str),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("unexpected upstream payload: {0}")]
    Parse(String),
}

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Issue one query and return zero or more normalized hits.
    async fn search(&self, topic: &str, desired: usize)
        -> Result<Vec<ProviderHit>, ProviderError>;

    fn name(&self) -> &'static str;

    /// Whether this backend answers the whole topic domain in a single
    /// consolidated request instead of one request per topic.
    fn consolidated(&self) -> bool {
        false
    }
}
