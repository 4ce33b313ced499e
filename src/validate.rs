// src/validate.rs
//
// Live-reachability checks for links produced by generation backends.
// Structured-search hits come from a real index and skip this entirely.

use std::time::Duration;

use metrics::counter;
use reqwest::{Client, StatusCode};

use crate::extract::Candidate;

const PROBE_TIMEOUT: Duration = Duration::from_secs(6);

// Some sites answer probes from unknown agents with 403, so present a
// realistic browser identity.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[async_trait::async_trait]
pub trait LinkChecker: Send + Sync {
    /// `true` when the URL resolves to a live resource. Never errors;
    /// every transport failure is reported as `false`.
    async fn is_live(&self, url: &str) -> bool;
}

/// HTTP probe: HEAD first, then one full GET retry for servers that reject
/// bodyless requests. Anything in [200, 400) counts as live.
pub struct HttpLinkChecker {
    client: Client,
    timeout: Duration,
}

impl HttpLinkChecker {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            timeout: PROBE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

impl Default for HttpLinkChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn accepted(status: StatusCode) -> bool {
    let code = status.as_u16();
    (200..400).contains(&code)
}

#[async_trait::async_trait]
impl LinkChecker for HttpLinkChecker {
    async fn is_live(&self, url: &str) -> bool {
        // Syntactic fast-fail, before any network call.
        if url.trim().is_empty() || !has_http_scheme(url) {
            return false;
        }

        let head = self
            .client
            .head(url)
            .timeout(self.timeout)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await;
        if let Ok(resp) = head {
            if accepted(resp.status()) {
                return true;
            }
        }

        // HEAD can fail on method-not-allowed or flaky networks; retry once
        // with a full fetch under the same rules.
        let get = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await;
        match get {
            Ok(resp) => accepted(resp.status()),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "reachability probe failed");
                false
            }
        }
    }
}

/// Validate one batch of generation-model candidates.
///
/// Passing candidates are kept in order; failed ones are dropped and logged.
/// When every candidate fails, validation is treated as inconclusive and the
/// original batch is returned unvalidated: an empty run starves the whole
/// pipeline, which is worse than a possibly-stale link.
pub async fn keep_live(checker: &dyn LinkChecker, candidates: Vec<Candidate>) -> Vec<Candidate> {
    if candidates.is_empty() {
        return candidates;
    }

    let mut alive = Vec::with_capacity(candidates.len());
    for c in &candidates {
        if checker.is_live(&c.url).await {
            alive.push(c.clone());
        } else {
            tracing::warn!(url = %c.url, title = %c.title, "skipping candidate: link not reachable");
            counter!("validate_dropped_total").increment(1);
        }
    }

    if alive.is_empty() {
        tracing::warn!(
            count = candidates.len(),
            "all candidates failed reachability; keeping unvalidated batch"
        );
        counter!("validate_inconclusive_total").increment(1);
        return candidates;
    }
    alive
}
