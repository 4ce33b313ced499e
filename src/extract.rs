// src/extract.rs
//
// Recovers a structured item list from a generation model's prose answer.
// Pure text-to-list function; no network, trivially unit-testable.

/// One candidate item as emitted by a generation model.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Candidate {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: String,
}

/// Extract a JSON array of candidates embedded in model prose.
///
/// Bracket policy is greedy-outer: the span from the first `[` to the last
/// `]` is taken as the array, so fenced code blocks and surrounding chatter
/// are tolerated. A missing span or a parse failure is a soft miss and
/// yields an empty list; the raw text is kept in the log for diagnosis.
pub fn extract_items(raw: &str) -> Vec<Candidate> {
    let Some(start) = raw.find('[') else {
        tracing::warn!(raw = %raw, "no JSON array found in model response");
        return Vec::new();
    };
    let Some(end) = raw.rfind(']') else {
        tracing::warn!(raw = %raw, "unterminated JSON array in model response");
        return Vec::new();
    };
    if end <= start {
        tracing::warn!(raw = %raw, "no JSON array found in model response");
        return Vec::new();
    }

    match serde_json::from_str::<Vec<Candidate>>(&raw[start..=end]) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, raw = %raw, "model response array did not parse");
            Vec::new()
        }
    }
}
