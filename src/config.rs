// src/config.rs
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const ENV_TOPICS_PATH: &str = "TOPICS_PATH";

/// Which provider backend answers searches for this process. Chosen once at
/// startup; not hot-swappable mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Google,
    Perplexity,
    Gemini,
}

impl ProviderKind {
    pub fn from_env_value(v: &str) -> Self {
        match v.trim().to_ascii_lowercase().as_str() {
            "" | "google" | "cse" => Self::Google,
            "perplexity" => Self::Perplexity,
            "gemini" => Self::Gemini,
            other => {
                tracing::warn!(provider = other, "unknown SEARCH_PROVIDER; using google");
                Self::Google
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub provider: ProviderKind,
    pub google_api_key: Option<String>,
    pub search_engine_id: Option<String>,
    pub perplexity_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub topics: Vec<String>,
    /// Delay between per-topic search requests.
    pub request_delay_ms: u64,
    /// Delay between per-recipient webhook sends.
    pub broadcast_delay_ms: u64,
    pub port: u16,
    /// When set, a background task re-runs collection on this interval.
    pub collect_interval_secs: Option<u64>,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        let provider = ProviderKind::from_env_value(
            &std::env::var("SEARCH_PROVIDER").unwrap_or_default(),
        );
        let topics = load_topics_default().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "topic list failed to load; using defaults");
            default_topics()
        });

        Self {
            provider,
            google_api_key: std::env::var("GOOGLE_API_KEY").ok(),
            search_engine_id: std::env::var("SEARCH_ENGINE_ID").ok(),
            perplexity_api_key: std::env::var("PERPLEXITY_API_KEY").ok(),
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            topics,
            request_delay_ms: 1_000,
            broadcast_delay_ms: 500,
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            collect_interval_secs: std::env::var("COLLECT_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }
}

/// The fixed query set a per-topic collection run walks, in order.
pub fn default_topics() -> Vec<String> {
    [
        "VTuber audition openings",
        "YouTube policy changes for streamers",
        "X Twitter changes affecting streamers",
        "VTuber growth know-how",
        "how to debut as a VTuber",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Load the topic list from an explicit TOML file (`topics = [...]`).
pub fn load_topics_from(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading topics from {}", path.display()))?;
    parse_topics(&content)
}

/// Topic list resolution order:
/// 1) $TOPICS_PATH
/// 2) config/topics.toml
/// 3) built-in defaults
pub fn load_topics_default() -> Result<Vec<String>> {
    if let Ok(p) = std::env::var(ENV_TOPICS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_topics_from(&pb);
        }
        return Err(anyhow!("TOPICS_PATH points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/topics.toml");
    if toml_p.exists() {
        return load_topics_from(&toml_p);
    }
    Ok(default_topics())
}

fn parse_topics(s: &str) -> Result<Vec<String>> {
    #[derive(serde::Deserialize)]
    struct TopicsFile {
        topics: Vec<String>,
    }
    let v: TopicsFile = toml::from_str(s).context("parsing topics toml")?;
    // Order is meaningful (it is the collection order), so trim and drop
    // empties without sorting or deduplicating.
    let topics: Vec<String> = v
        .topics
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if topics.is_empty() {
        return Err(anyhow!("topics list is empty"));
    }
    Ok(topics)
}
