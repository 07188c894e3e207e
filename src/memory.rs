use crate::message::{Message, Role};

/// Append-only conversation log for one planning session.
#[derive(Default, Clone, Debug)]
pub struct ConversationMemory {
    messages: Vec<Message>,
}

impl ConversationMemory {
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Message> + '_ {
        self.messages.iter()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Checks that every tool result answers a call made by an earlier
    /// assistant message.
    pub fn is_causally_ordered(&self) -> bool {
        let mut requested: Vec<&str> = Vec::new();
        for message in &self.messages {
            match message.role {
                Role::Assistant => {
                    requested.extend(message.tool_calls.iter().filter_map(|c| c.id.as_deref()));
                }
                Role::Tool => {
                    let answered = message
                        .tool_result
                        .as_ref()
                        .and_then(|r| r.tool_call_id.as_deref());
                    match answered {
                        Some(id) if requested.contains(&id) => {}
                        _ => return false,
                    }
                }
                Role::System | Role::User => {}
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ToolCall;
    use serde_json::json;

    fn call(id: &str) -> ToolCall {
        ToolCall {
            id: Some(id.into()),
            name: "hotels_finder".into(),
            arguments: json!({}),
        }
    }

    #[test]
    fn tool_result_after_its_call_is_ordered() {
        let mut memory = ConversationMemory::default();
        memory.push(Message::user("trip"));
        memory.push(Message::assistant_with_calls("", vec![call("a")]));
        memory.push(Message::tool_with_call("hotels_finder", json!("ok"), Some("a".into())));
        assert!(memory.is_causally_ordered());
        assert_eq!(memory.len(), 3);
    }

    #[test]
    fn orphan_tool_result_breaks_ordering() {
        let memory = ConversationMemory::with_messages(vec![
            Message::user("trip"),
            Message::tool_with_call("hotels_finder", json!("ok"), Some("a".into())),
            Message::assistant_with_calls("", vec![call("a")]),
        ]);
        assert!(!memory.is_causally_ordered());
    }
}
