//! Service banner and health check.

use axum::Json;
use serde_json::{Value, json};

pub(super) async fn root() -> Json<Value> {
    Json(json!({
        "message": "Data Analysis API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "/api/v1/files/upload",
            "tables": "/api/v1/files/tables",
            "chat": "/api/v1/chat/",
            "conversation": "/api/v1/chat/conversation",
        }
    }))
}

pub(super) async fn health() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}
