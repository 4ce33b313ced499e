// tests/api_http.rs
//
// HTTP-level tests for the trigger surface without opening sockets; the
// router is exercised directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /api/collect (including the "no new items" outcome)
// - GET /api/items (latest session only)
// - POST /api/send (happy path, already-sent guard, unknown row)

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use vtuber_news_relay::api::AppState;
use vtuber_news_relay::notify::{discord::DiscordMessage, WebhookSender};
use vtuber_news_relay::recipients::RecipientDirectory;
use vtuber_news_relay::store::MemoryStore;
use vtuber_news_relay::{
    create_router, ProviderError, ProviderHit, Recipient, SearchProvider,
};

const BODY_LIMIT: usize = 1024 * 1024;

struct StubProvider {
    empty: bool,
}

#[async_trait]
impl SearchProvider for StubProvider {
    async fn search(
        &self,
        topic: &str,
        _desired: usize,
    ) -> Result<Vec<ProviderHit>, ProviderError> {
        if self.empty {
            return Ok(Vec::new());
        }
        Ok(vec![ProviderHit {
            title: format!("news about {topic}"),
            link: format!("https://example.test/{topic}"),
            snippet: "snippet".to_string(),
            published_at: None,
        }])
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

struct StaticDirectory(Vec<Recipient>);

#[async_trait]
impl RecipientDirectory for StaticDirectory {
    async fn list(&self) -> Result<Vec<Recipient>> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct CountingSender {
    sent: Mutex<usize>,
}

#[async_trait]
impl WebhookSender for CountingSender {
    async fn send(&self, _endpoint: &str, _message: &DiscordMessage) -> Result<()> {
        *self.sent.lock().unwrap() += 1;
        Ok(())
    }
}

fn test_router(provider: StubProvider, recipients: Vec<Recipient>) -> (Router, Arc<CountingSender>) {
    let sender = Arc::new(CountingSender::default());
    let state = AppState {
        provider: Arc::new(provider),
        store: Arc::new(MemoryStore::new()),
        recipients: Arc::new(StaticDirectory(recipients)),
        sender: sender.clone(),
        topics: Arc::new(vec!["auditions".to_string(), "platform changes".to_string()]),
        request_delay: Duration::ZERO,
        broadcast_delay: Duration::ZERO,
        last_collection: Arc::new(RwLock::new(None)),
    };
    (create_router(state), sender)
}

fn eligible_recipient(n: u32) -> Recipient {
    Recipient {
        mention_id: Some(n.to_string()),
        webhook_url: Some(format!("https://wh.test/{n}")),
        active: true,
    }
}

async fn read_json(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json body")
}

fn post_json(uri: &str, payload: &Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

#[tokio::test]
async fn health_reports_ok_and_no_collection_yet() {
    let (app, _) = test_router(StubProvider { empty: false }, Vec::new());

    let resp = app.oneshot(get("/health")).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    assert_eq!(v["status"], "ok");
    assert!(v["last_collection"].is_null());
}

#[tokio::test]
async fn collect_then_items_round_trip() {
    let (app, _) = test_router(StubProvider { empty: false }, Vec::new());

    let resp = app
        .clone()
        .oneshot(post_json("/api/collect", &json!({})))
        .await
        .expect("oneshot /api/collect");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = read_json(resp).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["collected"], 2);

    let resp = app.oneshot(get("/api/items")).await.expect("oneshot /api/items");
    assert_eq!(resp.status(), StatusCode::OK);
    let items = read_json(resp).await;
    let items = items.as_array().expect("items array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["sent"], false);
    assert!(items[0]["row"].is_u64());
}

#[tokio::test]
async fn empty_collection_is_a_neutral_success() {
    let (app, _) = test_router(StubProvider { empty: true }, Vec::new());

    let resp = app
        .oneshot(post_json("/api/collect", &json!({})))
        .await
        .expect("oneshot /api/collect");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = read_json(resp).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["collected"], 0);
    assert_eq!(v["message"], "no new items found");
}

#[tokio::test]
async fn send_broadcasts_marks_sent_and_blocks_repeats() {
    let recipients = vec![eligible_recipient(1), eligible_recipient(2)];
    let (app, sender) = test_router(StubProvider { empty: false }, recipients);

    let resp = app
        .clone()
        .oneshot(post_json("/api/collect", &json!({})))
        .await
        .expect("collect");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(post_json("/api/send", &json!({"row_index": 1})))
        .await
        .expect("send");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = read_json(resp).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["sent_count"], 2);
    assert_eq!(*sender.sent.lock().unwrap(), 2);

    // The row is now flagged; a second send of the same item is refused.
    let resp = app
        .oneshot(post_json("/api/send", &json!({"row_index": 1})))
        .await
        .expect("send again");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v = read_json(resp).await;
    assert_eq!(v["error"], "already sent");
    assert_eq!(*sender.sent.lock().unwrap(), 2);
}

#[tokio::test]
async fn send_unknown_row_is_not_found() {
    let (app, _) = test_router(StubProvider { empty: false }, Vec::new());

    let resp = app
        .clone()
        .oneshot(post_json("/api/collect", &json!({})))
        .await
        .expect("collect");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(post_json("/api/send", &json!({"row_index": 99})))
        .await
        .expect("send");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
