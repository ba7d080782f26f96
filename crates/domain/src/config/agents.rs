use serde::{Deserialize, Serialize};

use super::limits::de_limit;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Agents
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Default ceiling for the legacy `main` lane.
pub const DEFAULT_AGENT_MAX_CONCURRENT: i64 = 4;
/// Default ceiling for the `subagent` lane.
pub const DEFAULT_SUBAGENT_MAX_CONCURRENT: i64 = 8;

/// Logical agents and their concurrency ceilings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentsConfig {
    /// Configured agents.  The first entry is the default agent used when
    /// no binding matches an inbound message.
    #[serde(default)]
    pub list: Vec<AgentEntry>,

    /// Concurrency of the legacy `main` lane.
    #[serde(default, deserialize_with = "de_limit")]
    pub max_concurrent: Option<i64>,

    /// Default per-agent lane concurrency for agents without their own
    /// `max_concurrent`.
    #[serde(default, deserialize_with = "de_limit")]
    pub session_concurrency: Option<i64>,

    #[serde(default)]
    pub subagents: SubagentsConfig,

    /// Wall-clock timeout for one agent run (milliseconds).  0 = no limit.
    #[serde(default)]
    pub run_timeout_ms: u64,
}

/// One configured agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEntry {
    pub id: String,
    /// Concurrency of this agent's `agent:<id>` lane.
    #[serde(default, deserialize_with = "de_limit")]
    pub max_concurrent: Option<i64>,
}

impl AgentEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), max_concurrent: None }
    }
}

/// Delegated sub-task limits.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SubagentsConfig {
    #[serde(default, deserialize_with = "de_limit")]
    pub max_concurrent: Option<i64>,
}

impl AgentsConfig {
    /// Concurrency of the legacy `main` lane.
    pub fn main_concurrency(&self) -> i64 {
        self.max_concurrent.unwrap_or(DEFAULT_AGENT_MAX_CONCURRENT)
    }

    /// Concurrency of the `subagent` lane.
    pub fn subagent_concurrency(&self) -> i64 {
        self.subagents.max_concurrent.unwrap_or(DEFAULT_SUBAGENT_MAX_CONCURRENT)
    }

    /// Concurrency of an agent's own lane.
    ///
    /// Resolution: the agent's `max_concurrent`, then
    /// `session_concurrency`, then the subagent ceiling, then the main
    /// lane ceiling.  Unknown agents skip the first step.
    pub fn agent_concurrency(&self, agent_id: &str) -> i64 {
        let normalized = crate::normalize_agent_id(agent_id);
        self.list
            .iter()
            .find(|a| crate::normalize_agent_id(&a.id) == normalized)
            .and_then(|a| a.max_concurrent)
            .or(self.session_concurrency)
            .or(self.subagents.max_concurrent)
            .unwrap_or_else(|| self.main_concurrency())
    }

    /// The default agent (first configured), if any.
    pub fn default_agent(&self) -> Option<&AgentEntry> {
        self.list.first()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
