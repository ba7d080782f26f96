use lg_domain::message::{ContentPart, Message, MessageContent};

/// Characters per heuristic token.
pub const CHARS_PER_TOKEN: usize = 4;

/// Heuristic token cost of one message: text-bearing characters divided
/// by [`CHARS_PER_TOKEN`], rounded up.
pub fn estimate_tokens(message: &Message) -> usize {
    text_chars(message).div_ceil(CHARS_PER_TOKEN)
}

/// Count the characters of every text-bearing unit in a message: plain
/// text, text parts, compact-JSON tool-call arguments and tool-result
/// content.  Images contribute nothing.
pub fn text_chars(message: &Message) -> usize {
    match &message.content {
        MessageContent::Text(text) => text.chars().count(),
        MessageContent::Parts(parts) => parts.iter().map(part_chars).sum(),
    }
}

fn part_chars(part: &ContentPart) -> usize {
    match part {
        ContentPart::Text { text } => text.chars().count(),
        ContentPart::ToolCall { arguments, .. } if arguments.is_null() => 0,
        ContentPart::ToolCall { arguments, .. } => serde_json::to_string(arguments)
            .map(|json| json.chars().count())
            .unwrap_or(0),
        ContentPart::ToolResult { content, .. } => content.chars().count(),
        ContentPart::Image { .. } => 0,
    }
}
