//! `lanegate route`: dry-run routing for one inbound message.

use lg_domain::config::{Config, PeerRef};
use lg_routing::{bindings_from_config, RouteRequest};

use crate::dispatch::RoutePlan;

const PEER_KINDS: [&str; 3] = ["dm", "group", "channel"];

/// Parse `kind:id`.  Anything without a recognised kind prefix is a DM
/// peer id, so ids that themselves contain `:` still work.
pub fn parse_peer(raw: &str) -> Result<PeerRef, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("peer must not be empty".into());
    }
    match raw.split_once(':') {
        Some((kind, id)) if PEER_KINDS.contains(&kind.to_ascii_lowercase().as_str()) => {
            if id.trim().is_empty() {
                Err(format!("peer id missing after \"{kind}:\""))
            } else {
                Ok(PeerRef::new(kind.to_ascii_lowercase(), id.trim()))
            }
        }
        _ => Ok(PeerRef::dm(raw)),
    }
}

pub fn plan(config: &Config, request: &RouteRequest, lane: Option<&str>) -> anyhow::Result<RoutePlan> {
    let bindings = bindings_from_config(&config.bindings);
    Ok(RoutePlan::resolve(config, &bindings, request, lane)?)
}

pub fn run(config: &Config, request: RouteRequest, lane: Option<&str>, json: bool) -> anyhow::Result<()> {
    let plan = plan(config, &request, lane)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!("agent        {}", plan.route.agent_id);
        println!("matched by   {}", plan.route.matched_by);
        println!("session key  {}", plan.session_key);
        println!("session lane {}", plan.session_lane);
        println!("lane         {}", plan.lane);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lg_domain::config::{AgentEntry, BindingConfig};
    use lg_routing::MatchedBy;

    #[test]
    fn parses_peer_forms() {
        assert_eq!(parse_peer("dm:42").unwrap(), PeerRef::dm("42"));
        assert_eq!(parse_peer("Group:-100").unwrap(), PeerRef::new("group", "-100"));
        assert_eq!(parse_peer("42").unwrap(), PeerRef::dm("42"));
        assert_eq!(parse_peer("user:with:colons").unwrap(), PeerRef::dm("user:with:colons"));
        assert!(parse_peer("").is_err());
        assert!(parse_peer("channel:").is_err());
    }

    #[test]
    fn plans_default_route() {
        let mut config = Config::default();
        config.agents.list = vec![AgentEntry::new("admin"), AgentEntry::new("team")];
        config.bindings = vec![BindingConfig::peer("admin", "telegram", PeerRef::dm("1"))];

        let request = RouteRequest::new("discord").with_peer(PeerRef::dm("1"));
        let plan = plan(&config, &request, None).unwrap();
        assert_eq!(plan.route.agent_id, "admin");
        assert_eq!(plan.route.matched_by, MatchedBy::Default);
    }

    #[test]
    fn no_agents_is_an_error() {
        let err = plan(&Config::default(), &RouteRequest::new("telegram"), None).unwrap_err();
        assert!(err.to_string().contains("no agents configured"));
    }
}
