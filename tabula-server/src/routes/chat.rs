//! Question answering.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use tabula::agent::{ChatOutcome, FunctionCallRecord};
use tabula::message::ChatMessage;

use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::state::AppState;

/// A question, optionally continuing an earlier conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's question.
    pub question: String,
    /// Earlier messages, oldest first.
    #[serde(default)]
    pub conversation_history: Option<Vec<ChatMessage>>,
}

/// Answer with the function calls behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Final answer text.
    pub answer: String,
    /// Executed function calls, in order.
    pub function_calls: Vec<FunctionCallRecord>,
    /// Model that answered.
    pub model: String,
}

/// [`ChatResponse`] plus the full transcript for follow-up requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationResponse {
    /// The short form.
    #[serde(flatten)]
    pub response: ChatResponse,
    /// Every message of the exchange, system prompt first.
    pub conversation_history: Vec<ChatMessage>,
}

async fn run_exchange(
    state: &AppState,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<ChatOutcome> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if request.question.trim().is_empty() {
        return Err(AppError::BadRequest("question must not be empty".into()));
    }

    let exchange = state
        .analyst
        .chat(&request.question, request.conversation_history);
    match tokio::time::timeout(state.timeout, exchange).await {
        Ok(outcome) => Ok(outcome?),
        Err(_) => Err(AppError::Timeout(state.timeout.as_secs())),
    }
}

pub(super) async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<ApiResponse<ChatResponse>> {
    let outcome = run_exchange(&state, body).await?;
    let response = ChatResponse {
        answer: outcome.answer,
        function_calls: outcome.function_calls,
        model: outcome.model,
    };
    Ok(ApiResponse::ok(response, "Chat processed successfully"))
}

pub(super) async fn conversation(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<ApiResponse<ConversationResponse>> {
    let outcome = run_exchange(&state, body).await?;
    let response = ConversationResponse {
        response: ChatResponse {
            answer: outcome.answer,
            function_calls: outcome.function_calls,
            model: outcome.model,
        },
        conversation_history: outcome.transcript,
    };
    Ok(ApiResponse::ok(response, "Chat processed successfully"))
}
