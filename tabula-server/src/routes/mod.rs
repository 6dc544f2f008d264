//! Route table.

mod chat;
mod files;
mod meta;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

pub use chat::{ChatRequest, ChatResponse, ConversationResponse};
pub use files::TableData;

/// Routes under `/api/v1`.
fn api_v1() -> Router<AppState> {
    Router::new()
        .route("/files/upload", post(files::upload))
        .route("/files/tables", get(files::list_tables))
        .route("/files/tables/{name}", get(files::table_info))
        .route("/files/tables/{name}/data", get(files::table_data))
        .route("/chat/", post(chat::chat))
        .route("/chat/conversation", post(chat::conversation))
}

/// Every route, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(meta::root))
        .route("/health", get(meta::health))
        .nest("/api/v1", api_v1())
}
