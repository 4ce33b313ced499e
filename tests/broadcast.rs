// tests/broadcast.rs
//
// Fan-out behavior: eligibility filtering, per-recipient failure isolation,
// and the explicit non-guard against double broadcasts.

use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use vtuber_news_relay::notify::{broadcast, discord::DiscordMessage, WebhookSender};
use vtuber_news_relay::{Recipient, StoredItem};

struct RecordingSender {
    fail_endpoints: Vec<&'static str>,
    attempts: Mutex<Vec<String>>,
}

impl RecordingSender {
    fn new(fail_endpoints: Vec<&'static str>) -> Self {
        Self {
            fail_endpoints,
            attempts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WebhookSender for RecordingSender {
    async fn send(&self, endpoint: &str, _message: &DiscordMessage) -> Result<()> {
        self.attempts.lock().unwrap().push(endpoint.to_string());
        if self.fail_endpoints.contains(&endpoint) {
            bail!("delivery refused");
        }
        Ok(())
    }
}

fn recipient(webhook: &str, active: bool) -> Recipient {
    Recipient {
        mention_id: Some("1".to_string()),
        webhook_url: Some(webhook.to_string()),
        active,
    }
}

fn item() -> StoredItem {
    StoredItem {
        row: 1,
        collected_at: "2026-08-24T09:00:00Z".to_string(),
        title: "t".to_string(),
        link: "https://example.test/x".to_string(),
        snippet: "s".to_string(),
        source_query: "q".to_string(),
        sent: false,
    }
}

#[tokio::test]
async fn middle_failure_does_not_block_later_recipients() {
    let sender = RecordingSender::new(vec!["https://wh.test/2"]);
    let recipients = vec![
        recipient("https://wh.test/1", true),
        recipient("https://wh.test/2", true),
        recipient("https://wh.test/3", true),
    ];

    let sent = broadcast(&sender, &recipients, &item(), Duration::ZERO).await;

    assert_eq!(sent, 2);
    // All three were attempted; #3 is not skipped because #2 failed.
    assert_eq!(
        *sender.attempts.lock().unwrap(),
        vec![
            "https://wh.test/1".to_string(),
            "https://wh.test/2".into(),
            "https://wh.test/3".into(),
        ]
    );
}

#[tokio::test]
async fn ineligible_recipients_are_never_attempted() {
    let sender = RecordingSender::new(Vec::new());
    let recipients = vec![
        recipient("https://wh.test/1", true),
        recipient("https://wh.test/2", false),
        Recipient {
            mention_id: None,
            webhook_url: None,
            active: true,
        },
        Recipient {
            mention_id: None,
            webhook_url: Some("  ".to_string()),
            active: true,
        },
    ];

    let sent = broadcast(&sender, &recipients, &item(), Duration::ZERO).await;

    assert_eq!(sent, 1);
    assert_eq!(
        *sender.attempts.lock().unwrap(),
        vec!["https://wh.test/1".to_string()]
    );
}

#[tokio::test]
async fn empty_roster_completes_with_zero_successes() {
    let sender = RecordingSender::new(Vec::new());
    let sent = broadcast(&sender, &[], &item(), Duration::ZERO).await;
    assert_eq!(sent, 0);
    assert!(sender.attempts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn double_broadcast_is_not_prevented_here() {
    // The dispatcher itself carries no memory of past sends; the already-sent
    // row check on the send operation is the only guard.
    let sender = RecordingSender::new(Vec::new());
    let recipients = vec![recipient("https://wh.test/1", true)];

    let first = broadcast(&sender, &recipients, &item(), Duration::ZERO).await;
    let second = broadcast(&sender, &recipients, &item(), Duration::ZERO).await;

    assert_eq!(first, 1);
    assert_eq!(second, 1);
    assert_eq!(sender.attempts.lock().unwrap().len(), 2);
}
