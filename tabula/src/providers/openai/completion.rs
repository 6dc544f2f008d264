//! Chat Completions API implementation.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use super::client::OpenAIClient;
use crate::error::LlmError;
use crate::message::{ChatMessage, ToolCall};
use crate::providers::{ApiClient, GenerateOptions, Model, ModelResponse, TokenUsage, saturating_u32};

const PROVIDER: &str = "openai";

/// A chat completions model.
#[derive(Clone)]
pub struct CompletionModel {
    client: OpenAIClient,
    model_id: String,
}

impl std::fmt::Debug for CompletionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionModel")
            .field("model_id", &self.model_id)
            .finish_non_exhaustive()
    }
}

impl CompletionModel {
    pub(crate) fn new(client: OpenAIClient, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    fn build_request_body(
        &self,
        messages: &[ChatMessage],
        options: &GenerateOptions,
    ) -> Result<Value, LlmError> {
        let messages = serde_json::to_value(messages)
            .map_err(|e| LlmError::invalid_request(format!("Unencodable messages: {e}")))?;
        let mut body = json!({
            "model": self.model_id,
            "messages": messages,
        });

        if options.has_tools() {
            let tools: Vec<Value> = options.tools.iter().map(|t| t.to_openai()).collect();
            body["tools"] = Value::Array(tools);
            body["tool_choice"] = json!("auto");
        }
        if let Some(temperature) = options.temperature {
            body["temperature"] = json!(temperature);
        }
        Ok(body)
    }

    fn status_error(status: StatusCode, body: &str) -> LlmError {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or_else(|| body.to_owned());
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                LlmError::auth(PROVIDER, message).with_code(status.as_str())
            }
            StatusCode::TOO_MANY_REQUESTS => LlmError::rate_limited(PROVIDER),
            StatusCode::BAD_REQUEST => LlmError::invalid_request(message)
                .for_provider(PROVIDER)
                .with_code(status.as_str()),
            _ => LlmError::http_status(status.as_u16(), message).for_provider(PROVIDER),
        }
    }

    fn parse_response(json: Value) -> Result<ModelResponse, LlmError> {
        if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
            let message = error["message"].as_str().unwrap_or("unknown provider error");
            let mut err = LlmError::provider(PROVIDER, message);
            if let Some(code) = error.get("code").filter(|c| !c.is_null()) {
                err = err.with_code(code.as_str().map_or_else(|| code.to_string(), String::from));
            }
            return Err(err);
        }

        let message = json["choices"]
            .get(0)
            .map(|choice| &choice["message"])
            .filter(|m| m.is_object())
            .ok_or_else(|| LlmError::response_format("choices[0].message", json.to_string()))?;

        let content = message["content"].as_str().map(String::from);
        let mut tool_calls: Vec<ToolCall> = Vec::new();
        for (idx, call) in message["tool_calls"].as_array().into_iter().flatten().enumerate() {
            match serde_json::from_value(call.clone()) {
                Ok(call) => tool_calls.push(call),
                Err(e) => {
                    warn!(error = %e, index = idx, "Malformed tool call");
                    return Err(LlmError::response_format(
                        format!("tool_calls[{idx}] with id/function"),
                        call.to_string(),
                    )
                    .for_provider(PROVIDER));
                }
            }
        }

        let message = if tool_calls.is_empty() {
            ChatMessage::assistant(content.unwrap_or_default())
        } else {
            ChatMessage::assistant_tool_calls(content, tool_calls)
        };

        let token_usage = json.get("usage").filter(|u| u.is_object()).map(|usage| {
            TokenUsage::new(
                saturating_u32(usage["prompt_tokens"].as_u64().unwrap_or(0)),
                saturating_u32(usage["completion_tokens"].as_u64().unwrap_or(0)),
            )
        });

        let mut response = ModelResponse::new(message).with_raw(json);
        response.token_usage = token_usage;
        Ok(response)
    }
}

#[async_trait]
impl Model for CompletionModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn provider(&self) -> &'static str {
        PROVIDER
    }

    #[instrument(skip(self, messages, options), fields(model = %self.model_id, messages = messages.len()))]
    async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        options: GenerateOptions,
    ) -> Result<ModelResponse, LlmError> {
        let body = self.build_request_body(&messages, &options)?;
        let url = format!("{}/chat/completions", self.client.base_url());
        debug!(tools = options.tools.len(), "Sending chat completion request");

        let response = self
            .client
            .http_client()
            .post(&url)
            .headers(self.client.auth_headers())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, &text));
        }

        let json: Value = response.json().await?;
        Self::parse_response(json)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::LlmErrorKind;
    use crate::tool::ToolDefinition;

    async fn model_for(server: &MockServer) -> CompletionModel {
        OpenAIClient::builder()
            .api_key("test-key")
            .base_url(server.uri())
            .app_name("DataAnalysisAPI")
            .build()
            .unwrap()
            .completion_model("openai/gpt-4o-mini")
    }

    fn options() -> GenerateOptions {
        GenerateOptions::new()
            .with_tools(vec![ToolDefinition {
                name: "list_tables".into(),
                description: "List tables".into(),
                parameters: json!({"type": "object", "properties": {}, "required": []}),
            }])
    }

    #[tokio::test]
    async fn test_parses_tool_calls_and_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(header("x-title", "DataAnalysisAPI"))
            .and(body_partial_json(json!({
                "model": "openai/gpt-4o-mini",
                "tool_choice": "auto",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "list_tables", "arguments": "{}"}
                        }]
                    }
                }],
                "usage": {"prompt_tokens": 120, "completion_tokens": 8}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let model = model_for(&server).await;
        let response = model
            .generate(vec![ChatMessage::user("What tables?")], options())
            .await
            .unwrap();
        assert!(response.has_tool_calls());
        assert_eq!(response.message.tool_calls[0].name(), "list_tables");
        assert_eq!(response.message.text_content(), Some(""));
        assert_eq!(response.token_usage, Some(TokenUsage::new(120, 8)));
    }

    #[tokio::test]
    async fn test_parses_text_answer_with_null_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "Two tables.", "tool_calls": null}
                }]
            })))
            .mount(&server)
            .await;

        let response = model_for(&server)
            .await
            .generate(vec![ChatMessage::user("hi")], GenerateOptions::new())
            .await
            .unwrap();
        assert!(!response.has_tool_calls());
        assert_eq!(response.message.text_content(), Some("Two tables."));
        assert!(response.token_usage.is_none());
    }

    #[tokio::test]
    async fn test_status_mapping() {
        for (status, kind) in [
            (401, LlmErrorKind::Auth),
            (429, LlmErrorKind::RateLimited),
            (400, LlmErrorKind::InvalidRequest),
            (503, LlmErrorKind::HttpStatus),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(
                    ResponseTemplate::new(status)
                        .set_body_json(json!({"error": {"message": "nope"}})),
                )
                .mount(&server)
                .await;
            let err = model_for(&server)
                .await
                .generate(vec![ChatMessage::user("hi")], GenerateOptions::new())
                .await
                .unwrap_err();
            assert_eq!(err.kind, kind, "status {status}");
        }
    }

    #[tokio::test]
    async fn test_error_object_in_ok_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"message": "upstream overloaded", "code": 502}
            })))
            .mount(&server)
            .await;
        let err = model_for(&server)
            .await
            .generate(vec![ChatMessage::user("hi")], GenerateOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Provider);
        assert_eq!(err.code.as_deref(), Some("502"));
    }

    #[test]
    fn test_malformed_tool_call_is_response_format_error() {
        let err = CompletionModel::parse_response(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "type": "function",
                        "function": {"name": "list_tables", "arguments": "{}"}
                    }]
                }
            }]
        }))
        .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::ResponseFormat);
        assert!(err.message.contains("tool_calls[0]"));
    }

    #[tokio::test]
    async fn test_malformed_tool_call_ends_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "tool_calls": [
                            {"id": "ok", "type": "function", "function": {"name": "list_tables", "arguments": "{}"}},
                            {"id": "bad", "type": "function"}
                        ]
                    }
                }]
            })))
            .mount(&server)
            .await;
        let err = model_for(&server)
            .await
            .generate(vec![ChatMessage::user("hi")], GenerateOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::ResponseFormat);
        assert!(err.message.contains("tool_calls[1]"));
    }

    #[tokio::test]
    async fn test_missing_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;
        let err = model_for(&server)
            .await
            .generate(vec![ChatMessage::user("hi")], GenerateOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::ResponseFormat);
    }
}
