//! Language model implementations and abstractions.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::ModelConfig;
use crate::error::{Result, TripError};
use crate::message::{Message, Role, ToolCall};
use crate::tool::ToolDescription;

/// Result of a chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelCompletion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl ModelCompletion {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }
}

/// Minimal abstraction around a chat completion provider.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete_chat(
        &self,
        messages: &[Message],
        tools: &[ToolDescription],
        stream: bool,
    ) -> Result<ModelCompletion>;
}

/// Pick a client for the configured provider.
pub fn build_model(cfg: &ModelConfig) -> Result<Arc<dyn LanguageModel>> {
    match cfg.provider.to_ascii_lowercase().as_str() {
        "gemini" | "google" => Ok(Arc::new(GeminiClient::from_config(cfg)?)),
        "openai" => Ok(Arc::new(OpenAIClient::from_config(cfg)?)),
        other => Err(TripError::Config(format!(
            "unsupported model provider `{other}`"
        ))),
    }
}

fn coalesce_error(status: reqwest::StatusCode, body: &str, provider: &str) -> TripError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return TripError::LanguageModel(format!("{provider} rate limit exceeded: {body}"));
    }
    TripError::LanguageModel(format!("{provider} request failed with {}: {body}", status))
}

fn serialize_tool_arguments(args: &Value) -> String {
    serde_json::to_string(args).unwrap_or_else(|_| args.to_string())
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .map_err(|err| TripError::LanguageModel(format!("http client error: {err}")))
}

fn non_empty(content: String) -> Option<String> {
    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gemini
// ─────────────────────────────────────────────────────────────────────────────

/// Google Gemini client using `generateContent` with function calling.
/// Default model: gemini-1.5-flash
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    model: String,
    api_key: String,
    endpoint: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn from_config(cfg: &ModelConfig) -> Result<Self> {
        let api_key = cfg
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                TripError::LanguageModel("missing Gemini API key in model config".into())
            })?;
        let endpoint = cfg
            .base_url
            .clone()
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string());
        Ok(Self {
            http: http_client()?,
            model: cfg.model.clone(),
            api_key,
            endpoint,
            temperature: cfg.temperature,
        })
    }

    fn to_contents(&self, messages: &[Message]) -> Vec<GeminiContent> {
        let mut contents: Vec<GeminiContent> = Vec::new();
        for message in messages {
            let (role, parts) = match message.role {
                Role::System => continue,
                Role::User => ("user", vec![GeminiPart::text(&message.content)]),
                Role::Assistant => {
                    let mut parts = Vec::new();
                    if !message.content.is_empty() {
                        parts.push(GeminiPart::text(&message.content));
                    }
                    for call in &message.tool_calls {
                        parts.push(GeminiPart {
                            function_call: Some(GeminiFunctionCall {
                                name: call.name.clone(),
                                args: call.arguments.clone(),
                            }),
                            ..GeminiPart::default()
                        });
                    }
                    ("model", parts)
                }
                Role::Tool => {
                    let (name, output) = match &message.tool_result {
                        Some(result) => (result.name.clone(), result.output.clone()),
                        None => (String::new(), Value::String(message.content.clone())),
                    };
                    let part = GeminiPart {
                        function_response: Some(GeminiFunctionResponse {
                            name,
                            response: json!({ "content": output }),
                        }),
                        ..GeminiPart::default()
                    };
                    ("function", vec![part])
                }
            };
            if parts.is_empty() {
                continue;
            }
            // Responses to one batch of calls travel together in a single turn.
            match contents.last_mut() {
                Some(last) if last.role == role && role == "function" => last.parts.extend(parts),
                _ => contents.push(GeminiContent {
                    role: role.to_string(),
                    parts,
                }),
            }
        }
        contents
    }

    fn to_tools(&self, tools: &[ToolDescription]) -> Option<Value> {
        if tools.is_empty() {
            return None;
        }
        let declarations: Vec<Value> = tools
            .iter()
            .map(|tool| {
                let mut decl = json!({
                    "name": tool.name,
                    "description": tool.description,
                });
                if let Some(params) = &tool.parameters {
                    decl["parameters"] = params.clone();
                }
                decl
            })
            .collect();
        Some(json!([{ "functionDeclarations": declarations }]))
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn complete_chat(
        &self,
        messages: &[Message],
        tools: &[ToolDescription],
        _stream: bool,
    ) -> Result<ModelCompletion> {
        let mut payload = json!({
            "contents": self.to_contents(messages),
            "generationConfig": { "temperature": self.temperature },
        });
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        if !system.is_empty() {
            payload["systemInstruction"] = json!({ "parts": [{ "text": system.join("\n\n") }] });
        }
        if let Some(tools) = self.to_tools(tools) {
            payload["tools"] = tools;
        }

        let resp = self
            .http
            .post(format!(
                "{}/models/{}:generateContent",
                self.endpoint.trim_end_matches('/'),
                self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| TripError::LanguageModel(format!("Gemini request error: {err}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(coalesce_error(status, &body, "gemini"));
        }

        let parsed: GeminiResponse = resp.json().await.map_err(|err| {
            TripError::LanguageModel(format!("Gemini response parse error: {err}"))
        })?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| TripError::LanguageModel("Gemini returned no candidates".into()))?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        for part in candidate.content.parts {
            if let Some(text) = part.text {
                content.push_str(&text);
            }
            if let Some(call) = part.function_call {
                tool_calls.push(ToolCall {
                    id: None,
                    name: call.name,
                    arguments: call.args,
                });
            }
        }

        Ok(ModelCompletion {
            content: non_empty(content),
            tool_calls,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// OpenAI-compatible chat completions
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct OpenAIClient {
    http: reqwest::Client,
    model: String,
    api_key: String,
    base_url: String,
    temperature: f32,
}

impl OpenAIClient {
    pub fn from_config(cfg: &ModelConfig) -> Result<Self> {
        let api_key = cfg
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                TripError::LanguageModel("missing OpenAI API key in model config".into())
            })?;
        let base_url = cfg
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string());
        Ok(Self {
            http: http_client()?,
            model: cfg.model.clone(),
            api_key,
            base_url,
            temperature: cfg.temperature,
        })
    }

    fn to_openai_messages(&self, messages: &[Message]) -> Vec<OpenAiMessage> {
        messages
            .iter()
            .map(|message| {
                let role = match message.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                    Role::Tool => "tool",
                }
                .to_string();

                let tool_calls = if message.tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        message
                            .tool_calls
                            .iter()
                            .map(|call| OpenAiToolCall {
                                id: call.id.clone(),
                                r#type: "function".to_string(),
                                function: OpenAiFunctionCall {
                                    name: call.name.clone(),
                                    arguments: serialize_tool_arguments(&call.arguments),
                                },
                            })
                            .collect(),
                    )
                };

                let content = if tool_calls.is_some() && message.content.is_empty() {
                    None
                } else {
                    Some(message.content.clone())
                };

                OpenAiMessage {
                    role,
                    content,
                    tool_call_id: message
                        .tool_result
                        .as_ref()
                        .and_then(|result| result.tool_call_id.clone()),
                    tool_calls,
                }
            })
            .collect()
    }

    fn to_openai_tools(&self, tools: &[ToolDescription]) -> Option<Vec<OpenAiTool>> {
        if tools.is_empty() {
            return None;
        }

        Some(
            tools
                .iter()
                .map(|tool| OpenAiTool {
                    r#type: "function".to_string(),
                    function: OpenAiFunction {
                        name: tool.name.clone(),
                        description: Some(tool.description.clone()),
                        parameters: tool.parameters.clone(),
                    },
                })
                .collect(),
        )
    }
}

fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn decode_line(line: &[u8]) -> Result<&str> {
    std::str::from_utf8(line)
        .map_err(|err| TripError::LanguageModel(format!("OpenAI stream is not UTF-8: {err}")))
}

/// Fold one server-sent event line into the partial completion.
fn apply_stream_line(
    line: &str,
    content: &mut String,
    pending: &mut BTreeMap<usize, OpenAiToolCallState>,
) -> Result<()> {
    let Some(data) = line.trim().strip_prefix("data: ") else {
        return Ok(());
    };
    if data == "[DONE]" {
        return Ok(());
    }
    let parsed: OpenAiStreamChunk = serde_json::from_str(data).map_err(|err| {
        TripError::LanguageModel(format!("OpenAI stream parse error `{data}`: {err}"))
    })?;

    for choice in parsed.choices {
        if let Some(delta_content) = choice.delta.content {
            content.push_str(&delta_content);
        }
        for delta_call in choice.delta.tool_calls.unwrap_or_default() {
            let state = pending.entry(delta_call.index).or_default();
            if delta_call.id.is_some() {
                state.id = delta_call.id;
            }
            if let Some(function) = delta_call.function {
                if let Some(name) = function.name {
                    state.name = Some(name);
                }
                if let Some(args) = function.arguments {
                    state.arguments.push_str(&args);
                }
            }
        }
    }
    Ok(())
}

#[async_trait]
impl LanguageModel for OpenAIClient {
    async fn complete_chat(
        &self,
        messages: &[Message],
        tools: &[ToolDescription],
        stream: bool,
    ) -> Result<ModelCompletion> {
        let tool_choice = if tools.is_empty() {
            Value::Null
        } else {
            Value::String("auto".to_string())
        };
        let payload = json!({
            "model": self.model,
            "messages": self.to_openai_messages(messages),
            "tools": self.to_openai_tools(tools),
            "tool_choice": tool_choice,
            "temperature": self.temperature,
            "stream": stream,
        });

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
            .json(&payload)
            .send()
            .await
            .map_err(|err| TripError::LanguageModel(format!("OpenAI request error: {err}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(coalesce_error(status, &body, "openai"));
        }

        if stream {
            let mut content = String::new();
            let mut pending: BTreeMap<usize, OpenAiToolCallState> = BTreeMap::new();
            // Bytes are only decoded once a whole line has arrived.
            let mut buffer: Vec<u8> = Vec::new();
            let mut stream = resp.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|err| {
                    TripError::LanguageModel(format!("OpenAI stream error: {err}"))
                })?;
                buffer.extend_from_slice(&chunk);
                while let Some(newline) = buffer.iter().position(|byte| *byte == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=newline).collect();
                    apply_stream_line(decode_line(&line)?, &mut content, &mut pending)?;
                }
            }
            apply_stream_line(decode_line(&buffer)?, &mut content, &mut pending)?;

            let tool_calls = pending
                .into_values()
                .filter_map(|state| {
                    Some(ToolCall {
                        id: state.id,
                        name: state.name?,
                        arguments: parse_arguments(&state.arguments),
                    })
                })
                .collect();

            return Ok(ModelCompletion {
                content: non_empty(content),
                tool_calls,
            });
        }

        let body: OpenAiResponse = resp.json().await.map_err(|err| {
            TripError::LanguageModel(format!("OpenAI response parse error: {err}"))
        })?;

        let first = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TripError::LanguageModel("OpenAI returned no choices".into()))?;

        let tool_calls = first
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                arguments: parse_arguments(&call.function.arguments),
                name: call.function.name,
            })
            .collect();

        Ok(ModelCompletion {
            content: first.message.content,
            tool_calls,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripted model
// ─────────────────────────────────────────────────────────────────────────────

/// A deterministic model used for tests and demos.
///
/// Each scripted response is either a JSON directive
/// (`{"action":"respond",...}`, `{"action":"call_tool",...}`,
/// `{"action":"call_tools","calls":[...]}`) or plain text, which is returned
/// as the final answer.
pub struct StubModel {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl StubModel {
    pub fn new(responses: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Every message list the model has been asked to complete.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum StubDirective {
    Respond {
        content: String,
    },
    CallTool {
        name: String,
        #[serde(default)]
        arguments: Value,
    },
    CallTools {
        calls: Vec<ToolCall>,
    },
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn complete_chat(
        &self,
        messages: &[Message],
        _tools: &[ToolDescription],
        _stream: bool,
    ) -> Result<ModelCompletion> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(messages.to_vec());
        }
        let raw = self
            .responses
            .lock()
            .map_err(|_| TripError::LanguageModel("StubModel poisoned".into()))?
            .pop_front()
            .ok_or_else(|| {
                TripError::LanguageModel("StubModel ran out of scripted responses".into())
            })?;

        Ok(match serde_json::from_str::<StubDirective>(&raw) {
            Ok(StubDirective::Respond { content }) => ModelCompletion::text(content),
            Ok(StubDirective::CallTool { name, arguments }) => {
                ModelCompletion::calls(vec![ToolCall {
                    id: None,
                    name,
                    arguments,
                }])
            }
            Ok(StubDirective::CallTools { calls }) => ModelCompletion::calls(calls),
            Err(_) => ModelCompletion::text(raw),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
}

impl GeminiPart {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiToolCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    r#type: String,
    function: OpenAiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiTool {
    r#type: String,
    function: OpenAiFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiFunction {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Default)]
struct OpenAiToolCallState {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamChunk {
    choices: Vec<OpenAiDeltaChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiDeltaChoice {
    delta: OpenAiDelta,
}

#[derive(Debug, Deserialize)]
struct OpenAiDelta {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAiToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiToolCallDelta {
    #[serde(default)]
    index: usize,
    id: Option<String>,
    #[serde(default)]
    function: Option<OpenAiFunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct OpenAiFunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}
