use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message in the conversation transcript (provider-agnostic).
///
/// Messages are immutable once built: history trimming only ever selects
/// a suffix of the transcript and never edits content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "toolCall")]
    ToolCall {
        id: String,
        name: String,
        #[serde(default)]
        arguments: serde_json::Value,
    },
    #[serde(rename = "toolResult")]
    ToolResult {
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        content: String,
        #[serde(default, rename = "isError")]
        is_error: bool,
    },
    #[serde(rename = "image")]
    Image {
        url: String,
        #[serde(rename = "mediaType", skip_serializing_if = "Option::is_none")]
        media_type: Option<String>,
    },
}

// ── Convenience constructors ───────────────────────────────────────

impl Message {
    pub fn new(role: Role, content: MessageContent) -> Self {
        Self { role, timestamp: Utc::now(), content }
    }
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, MessageContent::Text(text.into()))
    }
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, MessageContent::Text(text.into()))
    }
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, MessageContent::Text(text.into()))
    }
    pub fn tool_call(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self::new(
            Role::Assistant,
            MessageContent::Parts(vec![ContentPart::ToolCall {
                id: id.into(),
                name: name.into(),
                arguments,
            }]),
        )
    }
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(
            Role::Tool,
            MessageContent::Parts(vec![ContentPart::ToolResult {
                tool_call_id: tool_call_id.into(),
                content: content.into(),
                is_error: false,
            }]),
        )
    }

    /// Replace the timestamp (transcripts replayed from storage keep theirs).
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl MessageContent {
    /// Extract the plain-text content (first text part, or the full text).
    pub fn text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(t) => Some(t.as_str()),
            MessageContent::Parts(parts) => parts.iter().find_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_parts() {
        let raw = r#"{
            "role": "assistant",
            "timestamp": "2025-01-01T00:00:00Z",
            "content": [
                {"type": "toolCall", "id": "1", "name": "exec", "arguments": {"cmd": "ls"}},
                {"type": "toolResult", "toolCallId": "1", "content": "file1"}
            ]
        }"#;
        let msg: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        let MessageContent::Parts(parts) = &msg.content else {
            panic!("expected parts");
        };
        assert!(matches!(&parts[0], ContentPart::ToolCall { name, .. } if name == "exec"));
        assert!(matches!(
            &parts[1],
            ContentPart::ToolResult { content, is_error: false, .. } if content == "file1"
        ));
    }

    #[test]
    fn plain_string_content_without_timestamp() {
        let msg: Message = serde_json::from_str(r#"{"role":"user","content":"hi"}"#).unwrap();
        assert_eq!(msg.content.text(), Some("hi"));
    }

    #[test]
    fn text_finds_first_text_part() {
        let content = MessageContent::Parts(vec![
            ContentPart::Image { url: "https://x/y.png".into(), media_type: None },
            ContentPart::Text { text: "caption".into() },
        ]);
        assert_eq!(content.text(), Some("caption"));
    }
}
