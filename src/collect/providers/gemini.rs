// src/collect/providers/gemini.rs
//
// Gemini backend with the Google Search grounding tool. Same consolidated
// shape as the Perplexity backend: one request, prose answer, extraction,
// reachability checks.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;
use serde::Deserialize;

use crate::collect::normalize_snippet;
use crate::collect::providers::roundup_prompt;
use crate::collect::types::{ProviderHit, ProviderError, SearchProvider};
use crate::extract::extract_items;
use crate::validate::{keep_live, LinkChecker};

const ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct GeminiProvider {
    api_key: Option<String>,
    client: Client,
    checker: Arc<dyn LinkChecker>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<ModelCandidate>,
}

#[derive(Debug, Deserialize)]
struct ModelCandidate {
    content: ModelContent,
}

#[derive(Debug, Deserialize)]
struct ModelContent {
    #[serde(default)]
    parts: Vec<ModelPart>,
}

#[derive(Debug, Deserialize)]
struct ModelPart {
    #[serde(default)]
    text: String,
}

impl GeminiProvider {
    pub fn new(api_key: Option<String>, checker: Arc<dyn LinkChecker>) -> Self {
        Self {
            api_key,
            client: Client::new(),
            checker,
        }
    }
}

#[async_trait]
impl SearchProvider for GeminiProvider {
    async fn search(
        &self,
        topic: &str,
        desired: usize,
    ) -> Result<Vec<ProviderHit>, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::Config("GEMINI_API_KEY"))?;

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": roundup_prompt(topic, desired) }] }],
            "tools": [{ "google_search": {} }]
        });

        let resp = self
            .client
            .post(ENDPOINT)
            .query(&[("key", key)])
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let gen: GenerateResponse = resp.json().await?;
        let content = gen
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| ProviderError::Parse("response carried no candidates".into()))?;

        let candidates = extract_items(&content);
        let live = keep_live(&*self.checker, candidates).await;

        let hits: Vec<ProviderHit> = live
            .into_iter()
            .filter(|c| !c.url.is_empty() && !c.title.is_empty())
            .map(|c| ProviderHit {
                title: c.title,
                link: c.url,
                snippet: normalize_snippet(&c.snippet),
                published_at: None,
            })
            .collect();

        counter!("collect_provider_hits_total", "provider" => "gemini")
            .increment(hits.len() as u64);
        Ok(hits)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }

    fn consolidated(&self) -> bool {
        true
    }
}
