//! Webhook transport
//!
//! One route: `POST /webhook` runs a single sync pass. The request body is
//! ignored. Success answers 200 with a fixed message; any failure answers
//! 500 with the error text.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use hostsync_core::SyncEngine;
use serde_json::{Value, json};
use tracing::{error, info};

/// Body message of a successful sync
pub const SUCCESS_MESSAGE: &str = "Hosts file updated successfully";

/// Create the webhook router around a shared engine
pub fn webhook_router(engine: Arc<SyncEngine>) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook))
        .with_state(engine)
}

async fn handle_webhook(State(engine): State<Arc<SyncEngine>>) -> (StatusCode, Json<Value>) {
    match engine.run_once().await {
        Ok(report) => {
            info!(
                record = %engine.target(),
                entries = report.entries,
                truncated = report.truncated,
                "Webhook sync completed"
            );
            (StatusCode::OK, Json(json!({ "message": SUCCESS_MESSAGE })))
        }
        Err(e) => {
            error!(record = %engine.target(), kind = e.kind(), "Webhook sync failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}
