//! Agent route resolution.
//!
//! Bindings are evaluated strictly in configured order and the first one
//! that matches wins, regardless of how specific a later binding is.  An
//! admin peer binding placed before a provider-wide catch-all therefore
//! takes precedence, and a catch-all placed first shadows everything after
//! it.  When nothing matches, the first configured agent handles the
//! message.

use std::fmt;

use lg_domain::config::{AgentEntry, BindingConfig, PeerRef, ACCOUNT_WILDCARD};
use lg_domain::normalize_agent_id;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteError};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A validated binding: which agent handles messages matching `rule`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Normalized agent id.
    pub agent_id: String,
    pub rule: MatchRule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRule {
    /// A specific peer on a provider.
    Peer { provider: String, peer: PeerRef },
    /// Any peer on any account of a provider (`account_id = "*"`).
    AccountWildcard { provider: String },
    /// Any peer on one bot account of a provider.
    Account { provider: String, account_id: String },
}

/// How a route was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchedBy {
    PeerExact,
    AccountExact,
    AccountWildcard,
    Default,
}

impl MatchedBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PeerExact => "peer-exact",
            Self::AccountExact => "account-exact",
            Self::AccountWildcard => "account-wildcard",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for MatchedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The routing-relevant part of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub provider: String,
    #[serde(default)]
    pub peer: Option<PeerRef>,
    #[serde(default)]
    pub account_id: Option<String>,
}

impl RouteRequest {
    pub fn new(provider: impl Into<String>) -> Self {
        Self { provider: provider.into(), peer: None, account_id: None }
    }

    pub fn with_peer(mut self, peer: PeerRef) -> Self {
        self.peer = Some(peer);
        self
    }

    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }
}

/// Resolved route: which agent handles this message and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteResult {
    pub agent_id: String,
    pub matched_by: MatchedBy,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Binding conversion
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

impl Binding {
    /// Build a binding from a raw config entry.  Returns `None` for
    /// entries with missing fields.
    ///
    /// A peer constraint takes precedence over an account id when both are
    /// present.
    pub fn from_config(cfg: &BindingConfig) -> Option<Self> {
        if cfg.missing_field().is_some() {
            return None;
        }
        let rule = cfg.rule.as_ref()?;
        let provider = rule.provider.as_deref()?.trim().to_ascii_lowercase();

        let rule = match (&rule.peer, rule.account_id.as_deref().map(str::trim)) {
            (Some(peer), _) => MatchRule::Peer {
                provider,
                peer: PeerRef::new(peer.kind.as_deref()?.trim(), peer.id.as_deref()?.trim()),
            },
            (None, Some(ACCOUNT_WILDCARD)) => MatchRule::AccountWildcard { provider },
            (None, Some(account)) => MatchRule::Account {
                provider,
                account_id: account.to_owned(),
            },
            (None, None) => return None,
        };

        Some(Self {
            agent_id: normalize_agent_id(cfg.agent_id.as_deref()?),
            rule,
        })
    }

    /// Check this binding against a request.
    fn matches(&self, request: &RouteRequest) -> Option<MatchedBy> {
        let provider = match &self.rule {
            MatchRule::Peer { provider, .. }
            | MatchRule::AccountWildcard { provider }
            | MatchRule::Account { provider, .. } => provider,
        };
        if !provider.eq_ignore_ascii_case(request.provider.trim()) {
            return None;
        }

        match &self.rule {
            MatchRule::Peer { peer, .. } => {
                let req = request.peer.as_ref()?;
                let same = peer.kind.eq_ignore_ascii_case(req.kind.trim())
                    && peer.id == req.id.trim();
                same.then_some(MatchedBy::PeerExact)
            }
            MatchRule::AccountWildcard { .. } => Some(MatchedBy::AccountWildcard),
            MatchRule::Account { account_id, .. } => {
                let req = request.account_id.as_deref()?.trim();
                (account_id == req).then_some(MatchedBy::AccountExact)
            }
        }
    }
}

/// Convert raw config entries into bindings, preserving order and
/// skipping malformed entries.
pub fn bindings_from_config(configs: &[BindingConfig]) -> Vec<Binding> {
    configs
        .iter()
        .enumerate()
        .filter_map(|(index, cfg)| {
            let binding = Binding::from_config(cfg);
            if binding.is_none() {
                tracing::debug!(
                    index,
                    missing = cfg.missing_field().unwrap_or("match"),
                    "skipping malformed binding"
                );
            }
            binding
        })
        .collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Resolution
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Resolve which agent should handle a message.
///
/// Scans `bindings` from the start on every call and returns the first
/// match.  Falls back to the first entry of `agents` with
/// [`MatchedBy::Default`]; fails only when nothing matches and `agents`
/// is empty.
pub fn resolve_route(
    bindings: &[Binding],
    agents: &[AgentEntry],
    request: &RouteRequest,
) -> Result<RouteResult> {
    let matched = bindings
        .iter()
        .find_map(|b| b.matches(request).map(|by| (b, by)));

    let route = match matched {
        Some((binding, matched_by)) => {
            let known = agents
                .iter()
                .any(|a| normalize_agent_id(&a.id) == binding.agent_id);
            if !known {
                tracing::warn!(
                    agent_id = %binding.agent_id,
                    "binding routes to an agent that is not in agents.list"
                );
            }
            RouteResult {
                agent_id: binding.agent_id.clone(),
                matched_by,
            }
        }
        None => {
            let default = agents.first().ok_or_else(|| RouteError::NoAgents {
                provider: request.provider.clone(),
            })?;
            RouteResult {
                agent_id: normalize_agent_id(&default.id),
                matched_by: MatchedBy::Default,
            }
        }
    };

    tracing::debug!(
        provider = %request.provider,
        peer = request.peer.as_ref().map(|p| p.id.as_str()),
        account_id = request.account_id.as_deref(),
        agent_id = %route.agent_id,
        matched_by = %route.matched_by,
        "route resolved"
    );

    Ok(route)
}
