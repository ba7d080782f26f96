use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Routing bindings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Account selector that matches every account on a provider.
pub const ACCOUNT_WILDCARD: &str = "*";

/// A raw binding entry as written in the config file.
///
/// Every field is optional so that one malformed entry never prevents the
/// rest of the config from loading; the router skips entries for which
/// [`BindingConfig::missing_field`] reports a gap.
///
/// ```toml
/// [[bindings]]
/// agent_id = "admin"
/// match = { provider = "telegram", peer = { kind = "dm", id = "883350587" } }
///
/// [[bindings]]
/// agent_id = "team"
/// match = { provider = "telegram", account_id = "*" }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BindingConfig {
    #[serde(default, alias = "agentId")]
    pub agent_id: Option<String>,
    #[serde(default, rename = "match")]
    pub rule: Option<MatchConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Connector name: `"telegram"`, `"discord"`, `"whatsapp"`, …
    #[serde(default, alias = "channel")]
    pub provider: Option<String>,
    #[serde(default)]
    pub peer: Option<PeerMatch>,
    /// Bot account id, or `"*"` for any account.
    #[serde(default, alias = "accountId")]
    pub account_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeerMatch {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

/// The peer that sent an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRef {
    /// `"dm"`, `"group"` or `"channel"`.
    pub kind: String,
    pub id: String,
}

impl PeerRef {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self { kind: kind.into(), id: id.into() }
    }

    pub fn dm(id: impl Into<String>) -> Self {
        Self::new("dm", id)
    }

    pub fn is_direct(&self) -> bool {
        self.kind.trim().eq_ignore_ascii_case("dm")
    }
}

impl BindingConfig {
    /// Convenience constructor for a peer-exact binding.
    pub fn peer(agent_id: &str, provider: &str, peer: PeerRef) -> Self {
        Self {
            agent_id: Some(agent_id.into()),
            rule: Some(MatchConfig {
                provider: Some(provider.into()),
                peer: Some(PeerMatch { kind: Some(peer.kind), id: Some(peer.id) }),
                account_id: None,
            }),
        }
    }

    /// Convenience constructor for an account binding (`"*"` = wildcard).
    pub fn account(agent_id: &str, provider: &str, account_id: &str) -> Self {
        Self {
            agent_id: Some(agent_id.into()),
            rule: Some(MatchConfig {
                provider: Some(provider.into()),
                peer: None,
                account_id: Some(account_id.into()),
            }),
        }
    }

    /// Name of the first required field that is absent or blank, or
    /// `None` when the entry is usable.
    ///
    /// A binding needs an agent id, a provider, and either a complete peer
    /// (`kind` + `id`) or an account id.
    pub fn missing_field(&self) -> Option<&'static str> {
        if blank(self.agent_id.as_deref()) {
            return Some("agent_id");
        }
        let Some(rule) = &self.rule else {
            return Some("match");
        };
        if blank(rule.provider.as_deref()) {
            return Some("match.provider");
        }
        match &rule.peer {
            Some(peer) if blank(peer.kind.as_deref()) => Some("match.peer.kind"),
            Some(peer) if blank(peer.id.as_deref()) => Some("match.peer.id"),
            Some(_) => None,
            None if blank(rule.account_id.as_deref()) => Some("match.peer or match.account_id"),
            None => None,
        }
    }
}

fn blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
