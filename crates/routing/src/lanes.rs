//! Lane names.
//!
//! Lane names are never persisted but show up in logs, so their shape is
//! stable: `session:<key>`, `agent:<normalized-id>`, and the fixed
//! `main` / `cron` / `subagent` lanes.

use std::fmt;

use lg_domain::normalize_agent_id;

const SESSION_PREFIX: &str = "session:";
const AGENT_PREFIX: &str = "agent:";

/// Fixed lanes with caller-assigned meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandLane {
    /// Legacy catch-all lane.
    Main,
    /// Scheduled triggers.
    Cron,
    /// Delegated sub-tasks.
    Subagent,
}

impl CommandLane {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Cron => "cron",
            Self::Subagent => "subagent",
        }
    }
}

impl fmt::Display for CommandLane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lane that serializes one conversation.  Idempotent.
pub fn session_lane(key: &str) -> String {
    let cleaned = key.trim();
    if cleaned.is_empty() {
        return CommandLane::Main.as_str().into();
    }
    if cleaned.starts_with(SESSION_PREFIX) {
        cleaned.into()
    } else {
        format!("{SESSION_PREFIX}{cleaned}")
    }
}

/// Per-agent lane.
pub fn agent_lane(agent_id: &str) -> String {
    format!("{AGENT_PREFIX}{}", normalize_agent_id(agent_id))
}

/// Lane for an agent run: an explicit override wins, then the agent's own
/// lane, then `main`.
pub fn global_lane(explicit: Option<&str>, agent_id: Option<&str>) -> String {
    if let Some(lane) = explicit.map(str::trim).filter(|l| !l.is_empty()) {
        return lane.into();
    }
    match agent_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => agent_lane(id),
        None => CommandLane::Main.as_str().into(),
    }
}
