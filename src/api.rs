// src/api.rs
//
// HTTP trigger surface over the collection/broadcast core. Handlers stay
// thin: resolve collaborators out of AppState, call the core, translate the
// outcome. Collection that finds nothing is a success ("no new items"),
// never an error.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;

use crate::collect::{self, types::SearchProvider};
use crate::notify::{self, WebhookSender};
use crate::recipients::RecipientDirectory;
use crate::session::latest_session;
use crate::store::{Store, StoredItem};

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn SearchProvider>,
    pub store: Arc<dyn Store>,
    pub recipients: Arc<dyn RecipientDirectory>,
    pub sender: Arc<dyn WebhookSender>,
    pub topics: Arc<Vec<String>>,
    pub request_delay: Duration,
    pub broadcast_delay: Duration,
    pub last_collection: Arc<RwLock<Option<DateTime<Utc>>>>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/items", get(list_items))
        .route("/api/collect", post(collect_now))
        .route("/api/send", post(send_item))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

type ApiError = (StatusCode, Json<ErrorBody>);

#[derive(serde::Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            success: false,
            error: error.into(),
        }),
    )
}

fn internal(e: anyhow::Error) -> ApiError {
    tracing::error!(error = %e, "request failed");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Run one collection pass and persist whatever it found. Shared by the
/// manual trigger route and the background scheduler.
pub async fn collect_and_store(state: &AppState) -> anyhow::Result<usize> {
    let items =
        collect::run_collection(&*state.provider, &state.topics, state.request_delay).await;
    if !items.is_empty() {
        state.store.append(&items).await?;
    }
    *state
        .last_collection
        .write()
        .expect("last_collection lock poisoned") = Some(Utc::now());
    Ok(items.len())
}

#[derive(serde::Serialize)]
struct HealthResp {
    status: &'static str,
    timestamp: String,
    last_collection: Option<String>,
}

async fn health(State(state): State<AppState>) -> Json<HealthResp> {
    let last = *state
        .last_collection
        .read()
        .expect("last_collection lock poisoned");
    let last = last.map(|t| t.to_rfc3339());
    Json(HealthResp {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
        last_collection: last,
    })
}

async fn list_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredItem>>, ApiError> {
    let rows = state.store.read_all().await.map_err(internal)?;
    Ok(Json(latest_session(rows)))
}

#[derive(serde::Serialize)]
struct CollectResp {
    success: bool,
    collected: usize,
    message: String,
}

async fn collect_now(State(state): State<AppState>) -> Result<Json<CollectResp>, ApiError> {
    tracing::info!("manual collection triggered");
    let collected = collect_and_store(&state).await.map_err(internal)?;
    let message = if collected == 0 {
        "no new items found".to_string()
    } else {
        format!("collected {collected} items")
    };
    Ok(Json(CollectResp {
        success: true,
        collected,
        message,
    }))
}

#[derive(serde::Deserialize)]
struct SendReq {
    row_index: u64,
}

#[derive(serde::Serialize)]
struct SendResp {
    success: bool,
    sent_count: usize,
}

async fn send_item(
    State(state): State<AppState>,
    Json(req): Json<SendReq>,
) -> Result<Json<SendResp>, ApiError> {
    let rows = state.store.read_all().await.map_err(internal)?;

    // Only items in the most recent session are addressable for sending.
    let Some(item) = latest_session(rows)
        .into_iter()
        .find(|r| r.row == req.row_index)
    else {
        return Err(api_error(StatusCode::NOT_FOUND, "information not found"));
    };

    if item.sent {
        return Err(api_error(StatusCode::BAD_REQUEST, "already sent"));
    }

    let recipients = state.recipients.list().await.map_err(internal)?;
    let sent_count =
        notify::broadcast(&*state.sender, &recipients, &item, state.broadcast_delay).await;

    // The sent flag flips once per item, right after the broadcast completes,
    // even when only part of the roster acknowledged.
    state.store.mark_sent(item.row).await.map_err(internal)?;

    Ok(Json(SendResp {
        success: true,
        sent_count,
    }))
}
