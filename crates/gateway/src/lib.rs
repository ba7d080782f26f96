//! LaneGate dispatch core: lane scheduling, the agent-runner seam, and the
//! dispatcher that ties routing, lanes and history budgeting together.

pub mod cli;
pub mod dispatch;
pub mod lanes;
pub mod runner;

pub use dispatch::{DispatchError, DispatchOutcome, Dispatcher, InboundEnvelope, RoutePlan};
pub use lanes::{apply_lane_concurrency, LaneError, LanePermit, LaneScheduler, LaneSnapshot, LaneTask};
pub use runner::{AgentReply, AgentRun, AgentRunner, RunError};
