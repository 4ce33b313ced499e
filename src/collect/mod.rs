// src/collect/mod.rs
pub mod providers;
pub mod types;

use std::time::Duration;

use chrono::Utc;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;

use crate::collect::types::{CollectedItem, SearchProvider};

/// Label attached as `source_query` when a consolidated provider answers the
/// whole topic domain in one request and no single topic string applies.
pub const CONSOLIDATED_LABEL: &str = "industry roundup";

/// How many ranked, deduplicated items a consolidated request asks for.
pub const CONSOLIDATED_COUNT: usize = 5;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("collect_runs_total", "Collection runs started.");
        describe_counter!("collect_items_total", "Items produced by collection runs.");
        describe_counter!(
            "collect_provider_errors_total",
            "Provider search calls that failed."
        );
        describe_counter!(
            "validate_dropped_total",
            "Generation candidates dropped by reachability checks."
        );
        describe_counter!(
            "validate_inconclusive_total",
            "Batches kept unvalidated because every candidate failed."
        );
        describe_counter!("broadcast_sent_total", "Successful webhook deliveries.");
        describe_gauge!(
            "collect_last_run_ts",
            "Unix ts when a collection run last finished."
        );
    });
}

/// Normalize a provider snippet: decode HTML entities, strip tags, collapse
/// whitespace, cap length.
pub fn normalize_snippet(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > 500 {
        out = out.chars().take(500).collect();
    }
    out
}

/// Run one collection pass against the active provider.
///
/// Structured-search providers are walked topic by topic with `delay` between
/// requests (upstream rate limits, not correctness); consolidated providers
/// get a single request for [`CONSOLIDATED_COUNT`] ranked items. A failed
/// topic is logged and skipped, never aborting the rest, and there are no
/// run-level retries: a fully failed run yields an empty, non-error result.
pub async fn run_collection(
    provider: &dyn SearchProvider,
    topics: &[String],
    delay: Duration,
) -> Vec<CollectedItem> {
    ensure_metrics_described();
    counter!("collect_runs_total").increment(1);

    let items = if provider.consolidated() {
        collect_consolidated(provider).await
    } else {
        collect_per_topic(provider, topics, delay).await
    };

    counter!("collect_items_total").increment(items.len() as u64);
    gauge!("collect_last_run_ts").set(Utc::now().timestamp().max(0) as f64);
    items
}

async fn collect_per_topic(
    provider: &dyn SearchProvider,
    topics: &[String],
    delay: Duration,
) -> Vec<CollectedItem> {
    let mut items = Vec::with_capacity(topics.len());

    for (i, topic) in topics.iter().enumerate() {
        tracing::info!(provider = provider.name(), topic = %topic, "searching");
        match provider.search(topic, 1).await {
            Ok(hits) => {
                if let Some(hit) = hits.into_iter().next() {
                    items.push(CollectedItem {
                        title: hit.title,
                        link: hit.link,
                        snippet: hit.snippet,
                        source_query: topic.clone(),
                        collected_at: Utc::now(),
                        sent: false,
                    });
                }
            }
            Err(e) => {
                tracing::warn!(provider = provider.name(), topic = %topic, error = %e, "search failed; skipping topic");
                counter!("collect_provider_errors_total").increment(1);
            }
        }

        if i + 1 < topics.len() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    items
}

async fn collect_consolidated(provider: &dyn SearchProvider) -> Vec<CollectedItem> {
    tracing::info!(provider = provider.name(), "requesting consolidated roundup");
    match provider.search(CONSOLIDATED_LABEL, CONSOLIDATED_COUNT).await {
        Ok(hits) => hits
            .into_iter()
            .map(|hit| CollectedItem {
                title: hit.title,
                link: hit.link,
                snippet: hit.snippet,
                source_query: CONSOLIDATED_LABEL.to_string(),
                collected_at: Utc::now(),
                sent: false,
            })
            .collect(),
        Err(e) => {
            tracing::warn!(provider = provider.name(), error = %e, "consolidated search failed");
            counter!("collect_provider_errors_total").increment(1);
            Vec::new()
        }
    }
}
