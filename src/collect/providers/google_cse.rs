// src/collect/providers/google_cse.rs
//
// Google Custom Search backend: a structured search index queried once per
// topic. Results are restricted to the last 7 days and sorted by date.

use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;
use serde::Deserialize;

use crate::collect::normalize_snippet;
use crate::collect::types::{ProviderHit, ProviderError, SearchProvider};

const ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct GoogleCseProvider {
    api_key: Option<String>,
    engine_id: Option<String>,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
    pagemap: Option<serde_json::Value>,
}

impl GoogleCseProvider {
    pub fn new(api_key: Option<String>, engine_id: Option<String>) -> Self {
        Self {
            api_key,
            engine_id,
            client: Client::new(),
        }
    }
}

/// The publication time hides in the page's metatags when the source site
/// exposes one; absence is normal.
fn published_from_pagemap(pagemap: &serde_json::Value) -> Option<String> {
    pagemap
        .get("metatags")?
        .get(0)?
        .get("article:published_time")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl SearchProvider for GoogleCseProvider {
    async fn search(
        &self,
        topic: &str,
        desired: usize,
    ) -> Result<Vec<ProviderHit>, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::Config("GOOGLE_API_KEY"))?;
        let cx = self
            .engine_id
            .as_deref()
            .ok_or(ProviderError::Config("SEARCH_ENGINE_ID"))?;

        let num = desired.to_string();
        let resp = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("key", key),
                ("cx", cx),
                ("q", topic),
                ("num", num.as_str()),
                ("dateRestrict", "d7"),
                ("sort", "date"),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let body: SearchResponse = resp.json().await?;
        let items = body.items.unwrap_or_default();

        let hits: Vec<ProviderHit> = items
            .into_iter()
            .filter_map(|it| {
                let link = it.link.unwrap_or_default();
                let title = it.title.unwrap_or_default();
                if link.is_empty() || title.is_empty() {
                    return None;
                }
                Some(ProviderHit {
                    title,
                    link,
                    snippet: normalize_snippet(it.snippet.as_deref().unwrap_or_default()),
                    published_at: it.pagemap.as_ref().and_then(published_from_pagemap),
                })
            })
            .collect();

        counter!("collect_provider_hits_total", "provider" => "google")
            .increment(hits.len() as u64);
        Ok(hits)
    }

    fn name(&self) -> &'static str {
        "google"
    }
}
