//! Shared types for the LaneGate dispatch core: the error type, the
//! transcript message model, agent identifiers and the configuration tree.

pub mod agent_id;
pub mod config;
pub mod error;
pub mod message;

pub use agent_id::{normalize_agent_id, DEFAULT_AGENT_ID};
pub use error::{Error, Result};
