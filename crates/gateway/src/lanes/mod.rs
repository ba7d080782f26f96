//! Execution lanes: named FIFO queues with per-lane concurrency limits.

pub mod scheduler;

use lg_domain::config::Config;
use lg_routing::{agent_lane, CommandLane};

pub use scheduler::{LaneError, LanePermit, LaneScheduler, LaneSnapshot, LaneTask};

/// Push the configured limits onto the well-known lanes.
///
/// Sets `cron`, `subagent` and `main`, plus one `agent:<id>` lane per
/// configured agent.  Returns the `(lane, effective limit)` pairs in the
/// order they were applied.  Safe to call again after a config reload;
/// lanes not mentioned keep their current limit.
pub fn apply_lane_concurrency(scheduler: &LaneScheduler, config: &Config) -> Vec<(String, usize)> {
    let mut applied = Vec::with_capacity(config.agents.list.len() + 3);

    let fixed = [
        (CommandLane::Cron, config.cron.concurrency()),
        (CommandLane::Subagent, config.agents.subagent_concurrency()),
        (CommandLane::Main, config.agents.main_concurrency()),
    ];
    for (lane, limit) in fixed {
        let effective = scheduler.set_concurrency(lane.as_str(), limit);
        applied.push((lane.as_str().to_owned(), effective));
    }

    for agent in &config.agents.list {
        let lane = agent_lane(&agent.id);
        let effective = scheduler.set_concurrency(&lane, config.agents.agent_concurrency(&agent.id));
        applied.push((lane, effective));
    }

    tracing::info!(lanes = applied.len(), "lane concurrency applied");
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use lg_domain::config::AgentEntry;

    fn limit(s: &LaneScheduler, lane: &str) -> usize {
        s.lane_snapshot(lane).unwrap().limit
    }

    #[test]
    fn defaults_are_applied() {
        let mut config = Config::default();
        config.agents.list = vec![AgentEntry::new("admin")];

        let s = LaneScheduler::new();
        let applied = apply_lane_concurrency(&s, &config);

        assert_eq!(applied.len(), 4);
        assert_eq!(limit(&s, "cron"), 1);
        assert_eq!(limit(&s, "subagent"), 8);
        assert_eq!(limit(&s, "main"), 4);
        // Nothing set for the agent: falls through to the main lane limit.
        assert_eq!(limit(&s, "agent:admin"), 4);
    }

    #[test]
    fn per_agent_limits_win() {
        let mut config = Config::default();
        let mut admin = AgentEntry::new("Admin");
        admin.max_concurrent = Some(2);
        config.agents.list = vec![admin, AgentEntry::new("team")];
        config.agents.session_concurrency = Some(6);
        config.cron.max_concurrent_runs = Some(3);

        let s = LaneScheduler::new();
        apply_lane_concurrency(&s, &config);

        assert_eq!(limit(&s, "agent:admin"), 2);
        assert_eq!(limit(&s, "agent:team"), 6);
        assert_eq!(limit(&s, "cron"), 3);
    }

    #[test]
    fn invalid_values_are_clamped() {
        let mut config = Config::default();
        config.cron.max_concurrent_runs = Some(0);
        config.agents.max_concurrent = Some(-2);

        let s = LaneScheduler::new();
        let applied = apply_lane_concurrency(&s, &config);

        assert!(applied.contains(&("cron".to_owned(), 1)));
        assert!(applied.contains(&("main".to_owned(), 1)));
    }
}
