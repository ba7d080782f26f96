//! Transcript limits applied right before an agent run.
//!
//! Token counts here are a character-length heuristic (≈ 4 characters per
//! token), not real tokenization.  Downstream budgets are tuned against
//! this heuristic, so it must stay a cheap deterministic approximation.

pub mod estimate;
pub mod limit;

pub use estimate::{estimate_tokens, text_chars, CHARS_PER_TOKEN};
pub use limit::{budget_report, limit_history_tokens, limit_history_turns, HistoryBudget};
