// src/recipients.rs
//
// Broadcast recipient directory. Membership lives outside this service (the
// original roster is an operator-maintained sheet); the default directory
// reads a JSON roster file so local deployments work without extra plumbing.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "RECIPIENTS_PATH";
const DEFAULT_PATH: &str = "config/recipients.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Recipient {
    /// Discord user id used for the `<@id>` mention, when present.
    #[serde(default)]
    pub mention_id: Option<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub active: bool,
}

impl Recipient {
    /// A recipient takes part in a broadcast only when it is active and has
    /// a non-empty webhook endpoint.
    pub fn is_eligible(&self) -> bool {
        self.active
            && self
                .webhook_url
                .as_deref()
                .is_some_and(|u| !u.trim().is_empty())
    }
}

#[async_trait::async_trait]
pub trait RecipientDirectory: Send + Sync {
    async fn list(&self) -> Result<Vec<Recipient>>;
}

/// Roster file directory: `$RECIPIENTS_PATH`, falling back to
/// `config/recipients.json`. A missing roster is an empty roster, not an
/// error, so a fresh checkout boots cleanly.
pub struct FileRecipientDirectory {
    path: PathBuf,
}

impl FileRecipientDirectory {
    pub fn from_env() -> Self {
        let path = std::env::var(ENV_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PATH));
        Self { path }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl RecipientDirectory for FileRecipientDirectory {
    async fn list(&self) -> Result<Vec<Recipient>> {
        if !self.path.exists() {
            tracing::warn!(path = %self.path.display(), "recipient roster missing; broadcasting to nobody");
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading recipients from {}", self.path.display()))?;
        let recipients: Vec<Recipient> = serde_json::from_str(&content)
            .with_context(|| format!("parsing recipients from {}", self.path.display()))?;
        Ok(recipients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient(active: bool, webhook: Option<&str>) -> Recipient {
        Recipient {
            mention_id: None,
            webhook_url: webhook.map(str::to_string),
            active,
        }
    }

    #[test]
    fn eligibility_needs_active_and_webhook() {
        assert!(recipient(true, Some("https://discord.test/wh")).is_eligible());
        assert!(!recipient(false, Some("https://discord.test/wh")).is_eligible());
        assert!(!recipient(true, None).is_eligible());
        assert!(!recipient(true, Some("   ")).is_eligible());
    }

    #[tokio::test]
    async fn missing_roster_is_empty_not_fatal() {
        let dir = FileRecipientDirectory::from_path("does/not/exist.json");
        assert!(dir.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn roster_file_parses_partial_records() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("recipients.json");
        std::fs::write(
            &path,
            r#"[
                {"mention_id":"123","webhook_url":"https://discord.test/wh","active":true},
                {"active":false}
            ]"#,
        )
        .unwrap();

        let dir = FileRecipientDirectory::from_path(&path);
        let out = dir.list().await.unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[0].is_eligible());
        assert!(!out[1].is_eligible());
    }
}
