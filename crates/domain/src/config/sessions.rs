use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Session keying configuration. Controls how inbound messages map to
/// session keys (and therefore to `session:<key>` lanes).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionsConfig {
    /// DM scoping strategy.  `per_provider_peer` is the safe default for
    /// multi-user inboxes (prevents cross-user context leakage).
    #[serde(default)]
    pub dm_scope: DmScope,
}

/// How DM sessions are scoped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DmScope {
    /// `agent:<agentId>:main`: one shared DM session.
    Main,
    /// `agent:<agentId>:dm:<peerId>`: isolated per peer.
    PerPeer,
    /// `agent:<agentId>:<provider>:dm:<peerId>`: isolated per provider+peer.
    #[default]
    PerProviderPeer,
    /// `agent:<agentId>:<provider>:<accountId>:dm:<peerId>`: full isolation.
    PerAccountProviderPeer,
}
