// src/notify/mod.rs
pub mod discord;

use std::time::Duration;

use metrics::counter;

use crate::notify::discord::DiscordMessage;
use crate::recipients::Recipient;
use crate::store::StoredItem;

#[async_trait::async_trait]
pub trait WebhookSender: Send + Sync {
    /// Deliver one message to one webhook endpoint. Success means the
    /// endpoint acknowledged acceptance (2xx, typically 204).
    async fn send(&self, endpoint: &str, message: &DiscordMessage) -> anyhow::Result<()>;
}

/// Fan one item out to every eligible recipient, sequentially.
///
/// A failed send is logged and the loop continues; one recipient can never
/// block delivery to the rest. `delay` is applied between sends but not
/// after the final one. Returns the number of acknowledged sends; zero is
/// still a completed broadcast, not an error.
///
/// Nothing here prevents broadcasting the same item twice; the already-sent
/// check on the send operation is the only guard.
pub async fn broadcast(
    sender: &dyn WebhookSender,
    recipients: &[Recipient],
    item: &StoredItem,
    delay: Duration,
) -> usize {
    let eligible: Vec<&Recipient> = recipients.iter().filter(|r| r.is_eligible()).collect();
    tracing::info!(
        eligible = eligible.len(),
        total = recipients.len(),
        row = item.row,
        "broadcasting item"
    );

    let mut success = 0usize;
    for (i, recipient) in eligible.iter().enumerate() {
        let message = DiscordMessage::for_item(item, recipient.mention_id.as_deref());
        // is_eligible guarantees a non-empty endpoint.
        let endpoint = recipient.webhook_url.as_deref().unwrap_or_default();

        match sender.send(endpoint, &message).await {
            Ok(()) => {
                success += 1;
                counter!("broadcast_sent_total").increment(1);
            }
            Err(e) => {
                tracing::warn!(error = %e, "webhook delivery failed; continuing");
                counter!("broadcast_failed_total").increment(1);
            }
        }

        if i + 1 < eligible.len() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    tracing::info!(success, attempted = eligible.len(), "broadcast finished");
    success
}
