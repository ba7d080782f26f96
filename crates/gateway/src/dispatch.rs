//! Inbound dispatch: route → session key → lanes → history budget → run.
//!
//! Every inbound message is admitted first on its conversation's
//! `session:<key>` lane (one turn at a time per conversation by default)
//! and then, while still holding that slot, on the agent's global lane.
//! History is trimmed inside both slots, immediately before the agent
//! runner is invoked.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use lg_domain::config::{Config, PeerRef};
use lg_domain::message::Message;
use lg_history::{budget_report, limit_history_tokens, limit_history_turns, HistoryBudget};
use lg_routing::{
    bindings_from_config, compute_session_key, global_lane, resolve_route, session_lane, Binding,
    RouteError, RouteRequest, RouteResult,
};

use crate::lanes::{apply_lane_concurrency, LaneError, LaneScheduler};
use crate::runner::{AgentReply, AgentRun, AgentRunner, RunError};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The normalized message a channel connector hands to the dispatcher.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundEnvelope {
    /// Connector name: `"telegram"`, `"discord"`, `"cli"`, etc.
    #[serde(alias = "channel")]
    pub provider: String,
    /// Bot account within the connector.
    #[serde(default, alias = "accountId")]
    pub account_id: Option<String>,
    #[serde(default)]
    pub peer: Option<PeerRef>,
    pub text: String,
    /// Explicit global lane, e.g. `"cron"` for scheduled triggers.
    #[serde(default)]
    pub lane: Option<String>,
}

impl InboundEnvelope {
    pub fn new(provider: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            account_id: None,
            peer: None,
            text: text.into(),
            lane: None,
        }
    }

    pub fn with_peer(mut self, peer: PeerRef) -> Self {
        self.peer = Some(peer);
        self
    }

    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn on_lane(mut self, lane: impl Into<String>) -> Self {
        self.lane = Some(lane.into());
        self
    }

    pub fn route_request(&self) -> RouteRequest {
        RouteRequest {
            provider: self.provider.clone(),
            peer: self.peer.clone(),
            account_id: self.account_id.clone(),
        }
    }
}

/// Where a message goes, before anything is queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutePlan {
    pub route: RouteResult,
    pub session_key: String,
    pub session_lane: String,
    pub lane: String,
}

impl RoutePlan {
    /// Resolve agent, session key and both lanes for `request`.
    pub fn resolve(
        config: &Config,
        bindings: &[Binding],
        request: &RouteRequest,
        explicit_lane: Option<&str>,
    ) -> Result<Self, RouteError> {
        let route = resolve_route(bindings, &config.agents.list, request)?;
        let session_key = compute_session_key(&route.agent_id, config.sessions.dm_scope, request);
        Ok(Self {
            session_lane: session_lane(&session_key),
            lane: global_lane(explicit_lane, Some(&route.agent_id)),
            session_key,
            route,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub run_id: Uuid,
    #[serde(flatten)]
    pub plan: RoutePlan,
    pub history: HistoryBudget,
    pub reply: AgentReply,
    /// When the message entered the session lane's queue.
    pub queued_at: DateTime<Utc>,
    /// When both lane slots were held and the turn began.
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Lane(#[from] LaneError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("agent \"{agent_id}\" exceeded run timeout of {timeout_ms}ms")]
    Timeout { agent_id: String, timeout_ms: u64 },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Dispatcher
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Config plus the bindings compiled from it.  Swapped as a unit on reload.
struct RoutingTable {
    config: Arc<Config>,
    bindings: Vec<Binding>,
}

impl RoutingTable {
    fn new(config: Config) -> Self {
        let bindings = bindings_from_config(&config.bindings);
        Self { config: Arc::new(config), bindings }
    }
}

pub struct Dispatcher {
    table: RwLock<Arc<RoutingTable>>,
    scheduler: Arc<LaneScheduler>,
    runner: Arc<dyn AgentRunner>,
}

impl Dispatcher {
    /// Build a dispatcher and push the configured lane limits onto
    /// `scheduler`.
    pub fn new(config: Config, scheduler: Arc<LaneScheduler>, runner: Arc<dyn AgentRunner>) -> Self {
        apply_lane_concurrency(&scheduler, &config);
        Self {
            table: RwLock::new(Arc::new(RoutingTable::new(config))),
            scheduler,
            runner,
        }
    }

    pub fn scheduler(&self) -> &Arc<LaneScheduler> {
        &self.scheduler
    }

    pub fn config(&self) -> Arc<Config> {
        self.table.read().config.clone()
    }

    /// Swap in a new config.  In-flight dispatches finish against the
    /// config they started with.
    pub fn reload(&self, config: Config) {
        apply_lane_concurrency(&self.scheduler, &config);
        let table = Arc::new(RoutingTable::new(config));
        tracing::info!(
            agents = table.config.agents.list.len(),
            bindings = table.bindings.len(),
            "dispatcher config reloaded"
        );
        *self.table.write() = table;
    }

    /// Resolve where `envelope` would go without queueing anything.
    pub fn plan(&self, envelope: &InboundEnvelope) -> Result<RoutePlan, RouteError> {
        let table = self.table.read().clone();
        RoutePlan::resolve(&table.config, &table.bindings, &envelope.route_request(), envelope.lane.as_deref())
    }

    /// Route `envelope`, wait for its lanes, trim `history` and run the
    /// agent.
    pub async fn dispatch(
        &self,
        envelope: InboundEnvelope,
        history: Vec<Message>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let table = self.table.read().clone();
        let plan = RoutePlan::resolve(
            &table.config,
            &table.bindings,
            &envelope.route_request(),
            envelope.lane.as_deref(),
        )?;

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "dispatch",
            %run_id,
            agent_id = %plan.route.agent_id,
            matched_by = %plan.route.matched_by,
            lane = %plan.lane,
        );

        async {
            let queued_at = Utc::now();
            let clock = Instant::now();

            let turn = self.invoke(run_id, &plan, &table.config, envelope.text, history);
            let admitted = if plan.lane == plan.session_lane {
                // Explicit lane names the session lane itself: one slot.
                self.scheduler.run(&plan.session_lane, turn).await
            } else {
                let on_agent_lane = self.scheduler.run(&plan.lane, turn);
                self.scheduler.run(&plan.session_lane, on_agent_lane).await.and_then(|r| r)
            };
            self.scheduler.prune_lane(&plan.session_lane);
            let (reply, budget, started_at) = admitted??;

            tracing::info!(
                duration_ms = clock.elapsed().as_millis() as u64,
                waited_ms = (started_at - queued_at).num_milliseconds().max(0),
                "dispatch finished"
            );

            Ok::<_, DispatchError>(DispatchOutcome {
                run_id,
                plan: plan.clone(),
                history: budget,
                reply,
                queued_at,
                started_at,
                finished_at: Utc::now(),
            })
        }
        .instrument(span)
        .await
    }

    /// Runs inside both lane slots.  Returns the reply, the history budget
    /// and the time the turn was admitted.
    async fn invoke(
        &self,
        run_id: Uuid,
        plan: &RoutePlan,
        config: &Config,
        text: String,
        history: Vec<Message>,
    ) -> Result<(AgentReply, HistoryBudget, DateTime<Utc>), DispatchError> {
        let started_at = Utc::now();
        let limits = &config.history;
        let by_turns = limit_history_turns(&history, limits.max_turns);
        let kept = limit_history_tokens(by_turns, limits.max_tokens);
        let budget = budget_report(&history, kept, limits.max_tokens);
        if budget.dropped > 0 {
            tracing::debug!(
                kept = budget.kept,
                dropped = budget.dropped,
                tokens = budget.tokens,
                budget = budget.budget,
                "history trimmed"
            );
        }

        let run = AgentRun {
            run_id,
            agent_id: plan.route.agent_id.clone(),
            session_key: plan.session_key.clone(),
            lane: plan.lane.clone(),
            text,
            history: kept.to_vec(),
        };

        let timeout_ms = config.agents.run_timeout_ms;
        let reply = if timeout_ms == 0 {
            self.runner.run(run).await?
        } else {
            tokio::time::timeout(Duration::from_millis(timeout_ms), self.runner.run(run))
                .await
                .map_err(|_| DispatchError::Timeout {
                    agent_id: plan.route.agent_id.clone(),
                    timeout_ms,
                })??
        };

        Ok((reply, budget, started_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lg_domain::config::{AgentEntry, BindingConfig, DmScope};
    use lg_routing::MatchedBy;

    fn config() -> Config {
        let mut config = Config::default();
        config.agents.list = vec![AgentEntry::new("admin"), AgentEntry::new("team")];
        config.bindings = vec![
            BindingConfig::peer("admin", "telegram", PeerRef::dm("883350587")),
            BindingConfig::account("team", "telegram", "*"),
        ];
        config
    }

    fn plan(config: &Config, envelope: &InboundEnvelope) -> RoutePlan {
        let bindings = bindings_from_config(&config.bindings);
        RoutePlan::resolve(config, &bindings, &envelope.route_request(), envelope.lane.as_deref())
            .unwrap()
    }

    #[test]
    fn plan_for_bound_peer() {
        let envelope = InboundEnvelope::new("telegram", "hi").with_peer(PeerRef::dm("883350587"));
        let plan = plan(&config(), &envelope);

        assert_eq!(plan.route.agent_id, "admin");
        assert_eq!(plan.route.matched_by, MatchedBy::PeerExact);
        assert_eq!(plan.session_key, "agent:admin:telegram:dm:883350587");
        assert_eq!(plan.session_lane, "session:agent:admin:telegram:dm:883350587");
        assert_eq!(plan.lane, "agent:admin");
    }

    #[test]
    fn plan_respects_dm_scope_and_lane_override() {
        let mut config = config();
        config.sessions.dm_scope = DmScope::Main;
        let envelope = InboundEnvelope::new("telegram", "tick")
            .with_peer(PeerRef::dm("5"))
            .on_lane("cron");
        let plan = plan(&config, &envelope);

        assert_eq!(plan.route.agent_id, "team");
        assert_eq!(plan.session_key, "agent:team:main");
        assert_eq!(plan.lane, "cron");
    }

    #[test]
    fn envelope_accepts_channel_alias() {
        let envelope: InboundEnvelope = serde_json::from_str(
            r#"{"channel":"telegram","accountId":"bot","peer":{"kind":"dm","id":"1"},"text":"hi"}"#,
        )
        .unwrap();
        assert_eq!(envelope.provider, "telegram");
        assert_eq!(envelope.account_id.as_deref(), Some("bot"));
        assert_eq!(envelope.peer, Some(PeerRef::dm("1")));
        assert!(envelope.lane.is_none());
    }

    #[test]
    fn outcome_serializes_flat() {
        let envelope = InboundEnvelope::new("telegram", "hi").with_peer(PeerRef::dm("883350587"));
        let outcome = DispatchOutcome {
            run_id: Uuid::nil(),
            plan: plan(&config(), &envelope),
            history: HistoryBudget { kept: 0, dropped: 0, tokens: 0, budget: 10 },
            reply: AgentReply::new("ok"),
            queued_at: Utc::now(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json["queued_at"].is_string());
        assert_eq!(json["session_lane"], "session:agent:admin:telegram:dm:883350587");
        assert_eq!(json["route"]["matched_by"], "peer-exact");
        assert_eq!(json["reply"]["text"], "ok");
    }
}
