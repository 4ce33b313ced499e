// src/collect/providers/perplexity.rs
//
// Perplexity backend: a generation model with built-in web grounding, asked
// for the whole topic domain in one consolidated request. The prose answer
// goes through the extraction parser, then every candidate link through the
// reachability checker.

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

const ENDPOINT: &str = "https://api.perplexity.ai/chat/completions";
const MODEL: &str = "sonar";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct PerplexityProvider {
    api_key: Option<String>,
    client: Client,
    checker: Arc<dyn LinkChecker>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl PerplexityProvider {
    pub fn new(api_key: Option<String>, checker: Arc<dyn LinkChecker>) -> Self {
        Self {
            api_key,
            client: Client::new(),
            checker,
        }
    }
}

#[async_trait]
impl SearchProvider for PerplexityProvider {
    async fn search(
        &self,
        topic: &str,
        desired: usize,
    ) -> Result<Vec<ProviderHit>, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::Config("PERPLEXITY_API_KEY"))?;

        let body = serde_json::json!({
            "model": MODEL,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a news researcher. Answer with JSON only."
                },
                { "role": "user", "content": roundup_prompt(topic, desired) }
            ]
        });

        let resp = self
            .client
            .post(ENDPOINT)
            .bearer_auth(key)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let chat: ChatResponse = resp.json().await?;
        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| ProviderError::Parse("response carried no choices".into()))?;

        // A model answer without a recoverable array is a soft miss, not an
        // error; the run just comes back with nothing from this provider.
        let candidates = extract_items(content);
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

        counter!("collect_provider_hits_total", "provider" => "perplexity")
            .increment(hits.len() as u64);
        Ok(hits)
    }

    fn name(&self) -> &'static str {
        "perplexity"
    }

    fn consolidated(&self) -> bool {
        true
    }
}
