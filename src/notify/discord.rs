// src/notify/discord.rs
use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::WebhookSender;
use crate::store::StoredItem;

const EMBED_COLOR: u32 = 5_814_783; // blue

#[derive(Debug, Clone, Serialize)]
pub struct DiscordMessage {
    content: String,
    embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Clone, Serialize)]
struct DiscordEmbed {
    title: String,
    url: String,
    description: String,
    color: u32,
    fields: Vec<EmbedField>,
    footer: EmbedFooter,
    timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
struct EmbedField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Debug, Clone, Serialize)]
struct EmbedFooter {
    text: String,
}

impl DiscordMessage {
    /// Build the notification payload for one collected item, with an
    /// optional recipient mention in the message body.
    pub fn for_item(item: &StoredItem, mention_id: Option<&str>) -> Self {
        let content = mention_id
            .map(|id| format!("<@{id}>"))
            .unwrap_or_default();

        let source_query = if item.source_query.is_empty() {
            "-".to_string()
        } else {
            item.source_query.clone()
        };

        Self {
            content,
            embeds: vec![DiscordEmbed {
                title: item.title.clone(),
                url: item.link.clone(),
                description: item.snippet.clone(),
                color: EMBED_COLOR,
                fields: vec![
                    EmbedField {
                        name: "Search query".to_string(),
                        value: source_query,
                        inline: true,
                    },
                    EmbedField {
                        name: "Collected at".to_string(),
                        value: item.collected_at.clone(),
                        inline: true,
                    },
                ],
                footer: EmbedFooter {
                    text: "VTuber news relay".to_string(),
                },
                timestamp: Utc::now().to_rfc3339(),
            }],
        }
    }
}

#[derive(Clone)]
pub struct DiscordSender {
    client: Client,
    timeout: Duration,
}

impl DiscordSender {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

impl Default for DiscordSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl WebhookSender for DiscordSender {
    async fn send(&self, endpoint: &str, message: &DiscordMessage) -> Result<()> {
        self.client
            .post(endpoint)
            .timeout(self.timeout)
            .json(message)
            .send()
            .await
            .context("discord webhook post")?
            .error_for_status()
            .context("discord webhook non-2xx")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> StoredItem {
        StoredItem {
            row: 1,
            collected_at: "2026-08-24T09:00:00Z".to_string(),
            title: "New agency auditions open".to_string(),
            link: "https://example.test/auditions".to_string(),
            snippet: "Applications close Friday.".to_string(),
            source_query: "VTuber audition openings".to_string(),
            sent: false,
        }
    }

    #[test]
    fn mention_lands_in_content() {
        let msg = DiscordMessage::for_item(&item(), Some("42"));
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["content"], "<@42>");
        assert_eq!(v["embeds"][0]["title"], "New agency auditions open");
        assert_eq!(v["embeds"][0]["url"], "https://example.test/auditions");
        assert_eq!(v["embeds"][0]["fields"][0]["value"], "VTuber audition openings");
    }

    #[test]
    fn no_mention_means_empty_content() {
        let msg = DiscordMessage::for_item(&item(), None);
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["content"], "");
    }

    #[test]
    fn empty_source_query_renders_as_dash() {
        let mut it = item();
        it.source_query.clear();
        let msg = DiscordMessage::for_item(&it, None);
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["embeds"][0]["fields"][0]["value"], "-");
    }
}
