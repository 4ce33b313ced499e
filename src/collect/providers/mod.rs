// src/collect/providers/mod.rs
pub mod gemini;
pub mod google_cse;
pub mod perplexity;

use std::sync::Arc;

use crate::collect::types::SearchProvider;
use crate::config::{ProviderKind, RelayConfig};
use crate::validate::LinkChecker;

/// Build the one active provider backend for this process. Generation
/// backends get the link checker; structured search hits come from a live
/// index and are not re-probed.
pub fn from_config(cfg: &RelayConfig, checker: Arc<dyn LinkChecker>) -> Box<dyn SearchProvider> {
    match cfg.provider {
        ProviderKind::Google => Box::new(google_cse::GoogleCseProvider::new(
            cfg.google_api_key.clone(),
            cfg.search_engine_id.clone(),
        )),
        ProviderKind::Perplexity => Box::new(perplexity::PerplexityProvider::new(
            cfg.perplexity_api_key.clone(),
            checker,
        )),
        ProviderKind::Gemini => Box::new(gemini::GeminiProvider::new(
            cfg.gemini_api_key.clone(),
            checker,
        )),
    }
}

/// Shared prompt for generation backends: they must answer with a bare JSON
/// array so the extraction parser can recover it from surrounding prose.
pub(crate) fn roundup_prompt(topic: &str, desired: usize) -> String {
    format!(
        "Search the web for the {desired} most useful news items from the last 7 days \
         about the VTuber and streaming-creator industry ({topic}): auditions, platform \
         policy changes, and practical know-how for aspiring VTubers. Rank them by \
         usefulness and remove duplicates. Respond with ONLY a JSON array, no prose, \
         where each element is {{\"title\": string, \"url\": string, \"snippet\": string}} \
         and every url is a real page you found."
    )
}
