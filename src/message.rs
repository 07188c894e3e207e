use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub name: String,
    pub output: Value,
    #[serde(default)]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<ToolResult>,
}

impl Message {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_result: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    pub fn assistant_with_calls(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::plain(Role::Assistant, content)
        }
    }

    /// Tool output tagged with the originating call. String outputs become the
    /// message content verbatim, anything else is serialized.
    pub fn tool_with_call(name: impl Into<String>, output: Value, call_id: Option<String>) -> Self {
        let name = name.into();
        let content = match &output {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        Self {
            role: Role::Tool,
            content,
            tool_calls: Vec::new(),
            tool_result: Some(ToolResult {
                name,
                output,
                tool_call_id: call_id,
            }),
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Whether the message carries anything a model can act on.
    pub fn is_usable(&self) -> bool {
        !self.content.trim().is_empty() || self.has_tool_calls() || self.tool_result.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_message_keeps_string_output_verbatim() {
        let msg =
            Message::tool_with_call("hotels_finder", json!("Invalid tool"), Some("c1".into()));
        assert_eq!(msg.content, "Invalid tool");
        assert_eq!(msg.role, Role::Tool);
        let result = msg.tool_result.unwrap();
        assert_eq!(result.tool_call_id.as_deref(), Some("c1"));
        assert_eq!(result.name, "hotels_finder");
    }

    #[test]
    fn tool_message_serializes_structured_output() {
        let msg = Message::tool_with_call("flights_finder", json!([{"price": 420}]), None);
        assert_eq!(msg.content, r#"[{"price":420}]"#);
    }

    #[test]
    fn blank_user_message_is_not_usable() {
        assert!(!Message::user("   \n").is_usable());
        assert!(Message::user("plan a trip").is_usable());
    }
}
