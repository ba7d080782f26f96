use serde::{Deserialize, Serialize};

/// Limits applied to the transcript immediately before an agent run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Heuristic token budget (≈ 4 characters per token).
    #[serde(default = "d_max_tokens")]
    pub max_tokens: usize,
    /// Keep at most this many user turns.  0 = unlimited.
    #[serde(default)]
    pub max_turns: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_tokens: d_max_tokens(),
            max_turns: 0,
        }
    }
}

fn d_max_tokens() -> usize {
    100_000
}
