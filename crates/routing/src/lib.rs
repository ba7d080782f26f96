//! Inbound message routing for LaneGate.
//!
//! Maps an inbound `(provider, peer, account)` to an agent using the
//! ordered binding list (first match wins), derives the conversation's
//! session key, and names the execution lanes the work is admitted on.

pub mod error;
pub mod lanes;
pub mod resolve;
pub mod session_key;

pub use error::{Result, RouteError};
pub use lanes::{agent_lane, global_lane, session_lane, CommandLane};
pub use lg_domain::normalize_agent_id;
pub use resolve::{
    bindings_from_config, resolve_route, Binding, MatchRule, MatchedBy, RouteRequest, RouteResult,
};
pub use session_key::compute_session_key;
