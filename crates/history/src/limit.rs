use lg_domain::message::{Message, Role};
use serde::Serialize;

use crate::estimate::estimate_tokens;

/// Keep the newest messages whose combined heuristic cost fits `budget`.
///
/// Walks the transcript newest→oldest and stops at the first message that
/// would overflow the budget; everything older is dropped even if it would
/// fit on its own.  Messages are never split: if the newest message alone
/// exceeds the budget the result is empty.  A zero budget also yields an
/// empty result.
///
/// The result is a contiguous suffix of `messages` in original order, so
/// applying the function twice with the same budget changes nothing.
pub fn limit_history_tokens(messages: &[Message], budget: usize) -> &[Message] {
    if budget == 0 {
        return &messages[messages.len()..];
    }

    let mut total = 0usize;
    let mut start = messages.len();
    for (i, message) in messages.iter().enumerate().rev() {
        let cost = estimate_tokens(message);
        if total + cost > budget {
            tracing::trace!(budget, tokens = total, dropped = i + 1, "history budget reached");
            break;
        }
        total += cost;
        start = i;
    }

    &messages[start..]
}

/// Keep the suffix starting at the `max_turns`-th most recent user
/// message.  `0` disables the limit.
pub fn limit_history_turns(messages: &[Message], max_turns: usize) -> &[Message] {
    if max_turns == 0 {
        return messages;
    }

    let mut user_count = 0;
    for (i, message) in messages.iter().enumerate().rev() {
        if message.role == Role::User {
            user_count += 1;
            if user_count >= max_turns {
                return &messages[i..];
            }
        }
    }

    messages
}

/// Summary of a trim, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryBudget {
    pub kept: usize,
    pub dropped: usize,
    pub tokens: usize,
    pub budget: usize,
}

/// Describe how `kept` relates to the untrimmed `original` transcript.
pub fn budget_report(original: &[Message], kept: &[Message], budget: usize) -> HistoryBudget {
    HistoryBudget {
        kept: kept.len(),
        dropped: original.len().saturating_sub(kept.len()),
        tokens: kept.iter().map(estimate_tokens).sum(),
        budget,
    }
}
