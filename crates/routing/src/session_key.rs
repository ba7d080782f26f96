//! Session key computation.
//!
//! Key templates:
//! - `agent:<agentId>:main`                                  (DM scope = main)
//! - `agent:<agentId>:dm:<peerId>`                           (DM scope = per-peer)
//! - `agent:<agentId>:<provider>:dm:<peerId>`                (DM scope = per-provider-peer)
//! - `agent:<agentId>:<provider>:<accountId>:dm:<peerId>`    (DM scope = per-account-provider-peer)
//! - `agent:<agentId>:<provider>:<kind>:<peerId>`            (groups and channels)

use lg_domain::config::DmScope;
use lg_domain::normalize_agent_id;

use crate::resolve::RouteRequest;

/// Compute a stable session key for a routed message.  The key
/// determines which `session:<key>` lane serializes the conversation.
pub fn compute_session_key(agent_id: &str, dm_scope: DmScope, request: &RouteRequest) -> String {
    let base = format!("agent:{}", normalize_agent_id(agent_id));
    let provider = normalized_or(&request.provider, "default");

    // Groups and channels always isolate by their own id.
    if let Some(peer) = request.peer.as_ref().filter(|p| !p.is_direct()) {
        let kind = normalized_or(&peer.kind, "group");
        return format!("{base}:{provider}:{kind}:{}", peer.id.trim());
    }

    let peer = request
        .peer
        .as_ref()
        .map(|p| p.id.trim())
        .filter(|id| !id.is_empty())
        .unwrap_or("unknown");

    match dm_scope {
        DmScope::Main => format!("{base}:main"),
        DmScope::PerPeer => format!("{base}:dm:{peer}"),
        DmScope::PerProviderPeer => format!("{base}:{provider}:dm:{peer}"),
        DmScope::PerAccountProviderPeer => {
            let acct = request
                .account_id
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .unwrap_or("default");
            format!("{base}:{provider}:{acct}:dm:{peer}")
        }
    }
}

fn normalized_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.into()
    } else {
        trimmed.to_ascii_lowercase()
    }
}
