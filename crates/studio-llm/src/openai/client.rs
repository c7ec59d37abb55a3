// OpenAI-compatible chat completions over plain HTTP.
// Works against OpenAI itself and OpenRouter, which mirrors the same wire format.

use crate::streaming::parse_chat_sse_stream;
use crate::traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, EventStream, TokenUsage};
use crate::types::{Message, ToolCall};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: OPENAI_API_BASE.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Timeout for non-streaming requests. Streams are bounded by the caller.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_chat_request(
        &self,
        model: &str,
        messages: Vec<Message>,
        options: &ChatOptions,
        stream: bool,
    ) -> Result<Value> {
        let openai_messages: Vec<Value> = messages
            .into_iter()
            .map(|msg| self.convert_message(msg))
            .collect::<Result<Vec<_>>>()?;

        let mut obj = Map::new();
        obj.insert("model".to_string(), json!(model));
        obj.insert("messages".to_string(), Value::Array(openai_messages));
        obj.insert("stream".to_string(), json!(stream));

        if let Some(temp) = options.temperature {
            obj.insert("temperature".to_string(), json!(temp));
        }
        if let Some(max_tokens) = options.max_tokens {
            obj.insert("max_tokens".to_string(), json!(max_tokens));
        }
        if let Some(tools) = options.tools.as_ref().filter(|t| !t.is_empty()) {
            obj.insert("tools".to_string(), serde_json::to_value(tools)?);
            if let Some(tool_choice) = &options.tool_choice {
                obj.insert("tool_choice".to_string(), serde_json::to_value(tool_choice)?);
            }
        }
        if let Some(format) = &options.response_format {
            obj.insert("response_format".to_string(), serde_json::to_value(format)?);
        }

        Ok(Value::Object(obj))
    }

    fn convert_message(&self, message: Message) -> Result<Value> {
        let mut obj = Map::new();
        obj.insert("role".to_string(), json!(message.role()));
        match message {
            Message::System { content } | Message::Human { content } => {
                obj.insert("content".to_string(), json!(content.as_str()));
            }
            Message::AI { content, tool_calls } => {
                // Providers reject an assistant turn with neither content nor tool calls
                let content = content.map(|c| c.to_text()).unwrap_or_default();
                obj.insert("content".to_string(), json!(content));
                if let Some(tool_calls) = tool_calls {
                    obj.insert("tool_calls".to_string(), serde_json::to_value(tool_calls)?);
                }
            }
            Message::Tool { tool_call_id, content } => {
                obj.insert("tool_call_id".to_string(), json!(tool_call_id));
                obj.insert("content".to_string(), json!(content.as_str()));
            }
        }
        Ok(Value::Object(obj))
    }

    async fn post_chat(&self, payload: &Value, timeout: Option<Duration>) -> Result<reqwest::Response> {
        let mut builder = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(payload);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat API error ({}): {}", status, error_text);
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_chat_request(
            &request.model,
            request.messages,
            &request.options,
            false,
        )?;

        let response = self.post_chat(&payload, Some(self.request_timeout)).await?;

        let raw: OpenAIChatResponse = response
            .json()
            .await
            .context("Failed to parse response")?;

        let choice = raw.choices.first();
        Ok(ChatResponse {
            content: choice.and_then(|c| c.message.content.clone()),
            tool_calls: choice.and_then(|c| c.message.tool_calls.clone()),
            usage: raw.usage.as_ref().map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.and_then(|c| c.finish_reason.clone()),
            raw: serde_json::to_value(&raw)?,
        })
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        let payload = self.build_chat_request(
            &request.model,
            request.messages,
            &request.options,
            true,
        )?;

        tracing::debug!(model = %request.model, "opening chat stream");
        let response = self.post_chat(&payload, None).await?;

        Ok(parse_chat_sse_stream(response))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResponseMessage {
    pub role: String,
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ResponseFormat;
    use crate::types::{Tool, ToolChoice};

    #[test]
    fn test_build_request_with_tools() {
        let client = OpenAIClient::new("key").unwrap();
        let options = ChatOptions::new()
            .temperature(0.2)
            .tools(vec![Tool::new("smartSearch", "search", json!({"type": "object"}))])
            .tool_choice(ToolChoice::auto());

        let payload = client
            .build_chat_request("m", vec![Message::human("hi")], &options, true)
            .unwrap();

        assert_eq!(payload["stream"], json!(true));
        assert_eq!(payload["tools"][0]["function"]["name"], "smartSearch");
        assert_eq!(payload["tool_choice"], "auto");
        assert_eq!(payload["messages"][0]["role"], "user");
    }

    #[test]
    fn test_tool_choice_omitted_without_tools() {
        let client = OpenAIClient::new("key").unwrap();
        let options = ChatOptions::new().tool_choice(ToolChoice::auto());
        let payload = client
            .build_chat_request("m", vec![], &options, false)
            .unwrap();

        assert!(payload.get("tools").is_none());
        assert!(payload.get("tool_choice").is_none());
    }

    #[test]
    fn test_response_format_serialization() {
        let client = OpenAIClient::new("key").unwrap();
        let options = ChatOptions::new()
            .response_format(ResponseFormat::json_schema("plan", json!({"type": "object"})));
        let payload = client
            .build_chat_request("m", vec![], &options, false)
            .unwrap();

        assert_eq!(payload["response_format"]["type"], "json_schema");
        assert_eq!(payload["response_format"]["json_schema"]["name"], "plan");
        assert_eq!(payload["response_format"]["json_schema"]["strict"], true);
    }

    #[test]
    fn test_assistant_tool_calls_message() {
        let client = OpenAIClient::new("key").unwrap();
        let msg = Message::ai_with_tools(vec![ToolCall::new("call_1", "smartSearch", "{}")]);
        let value = client.convert_message(msg).unwrap();

        assert_eq!(value["role"], "assistant");
        assert_eq!(value["content"], "");
        assert_eq!(value["tool_calls"][0]["id"], "call_1");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OpenAIClient::new("key")
            .unwrap()
            .with_base_url("https://openrouter.ai/api/v1/");
        assert_eq!(client.base_url(), OPENROUTER_API_BASE);
    }
}
