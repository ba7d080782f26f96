//! The seam between the dispatch core and whatever executes an agent turn.

use async_trait::async_trait;
use lg_domain::message::Message;
use serde::Serialize;
use uuid::Uuid;

/// Everything an agent run needs, after routing and history trimming.
#[derive(Debug, Clone)]
pub struct AgentRun {
    pub run_id: Uuid,
    pub agent_id: String,
    pub session_key: String,
    /// The global lane the run was admitted on.
    pub lane: String,
    pub text: String,
    /// Trimmed transcript, oldest first.
    pub history: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentReply {
    pub text: String,
}

impl AgentReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("agent \"{agent_id}\" failed: {message}")]
    Failed { agent_id: String, message: String },
}

impl RunError {
    pub fn failed(agent_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed { agent_id: agent_id.into(), message: message.into() }
    }
}

/// Executes one agent turn.  Implementations must be shareable across
/// lanes; the dispatcher calls them concurrently up to each lane's limit.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(&self, run: AgentRun) -> Result<AgentReply, RunError>;
}
