mod agents;
mod bindings;
mod history;
mod limits;
mod lanes;
mod sessions;

pub use agents::*;
pub use bindings::*;
pub use history::*;
pub use lanes::*;
pub use sessions::*;

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::normalize_agent_id;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub agents: AgentsConfig,
    /// Ordered routing rules.  Order is significant: the first binding
    /// that matches an inbound message wins.
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
    #[serde(default)]
    pub cron: CronConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Config {
    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            agents = config.agents.list.len(),
            bindings = config.bindings.len(),
            "config loaded"
        );
        Ok(config)
    }

    /// Load `path` when it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { severity: ConfigSeverity::Error, field: field.into(), message: message.into() }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { severity: ConfigSeverity::Warning, field: field.into(), message: message.into() }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Nothing here is fatal at runtime except an empty agent list: bad
    /// bindings are skipped and bad limits are clamped, but operators
    /// should hear about both.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.agents.list.is_empty() {
            errors.push(ConfigError::error(
                "agents.list",
                "no agents configured; messages without a matching binding cannot be routed",
            ));
        }

        let mut seen = HashSet::new();
        for (i, agent) in self.agents.list.iter().enumerate() {
            if agent.id.trim().is_empty() {
                errors.push(ConfigError::error(
                    format!("agents.list[{i}].id"),
                    "agent id must not be empty",
                ));
                continue;
            }
            let id = normalize_agent_id(&agent.id);
            if !seen.insert(id.clone()) {
                errors.push(ConfigError::warning(
                    format!("agents.list[{i}].id"),
                    format!("duplicate agent id \"{id}\" (after normalization)"),
                ));
            }
            check_limit(&mut errors, &format!("agents.list[{i}].max_concurrent"), agent.max_concurrent);
        }

        for (i, binding) in self.bindings.iter().enumerate() {
            match binding.missing_field() {
                Some(field) => errors.push(ConfigError::warning(
                    format!("bindings[{i}]"),
                    format!("missing {field}; binding will be skipped"),
                )),
                None => {
                    let id = normalize_agent_id(binding.agent_id.as_deref().unwrap_or_default());
                    if !seen.contains(&id) {
                        errors.push(ConfigError::warning(
                            format!("bindings[{i}].agent_id"),
                            format!("agent \"{id}\" is not in agents.list"),
                        ));
                    }
                }
            }
        }

        check_limit(&mut errors, "agents.max_concurrent", self.agents.max_concurrent);
        check_limit(&mut errors, "agents.session_concurrency", self.agents.session_concurrency);
        check_limit(&mut errors, "agents.subagents.max_concurrent", self.agents.subagents.max_concurrent);
        check_limit(&mut errors, "cron.max_concurrent_runs", self.cron.max_concurrent_runs);

        if self.history.max_tokens == 0 {
            errors.push(ConfigError::warning(
                "history.max_tokens",
                "a zero token budget drops the entire history on every turn",
            ));
        }

        errors
    }
}

fn check_limit(errors: &mut Vec<ConfigError>, field: &str, value: Option<i64>) {
    if let Some(v) = value {
        if v < 1 {
            errors.push(ConfigError::warning(
                field,
                format!("concurrency {v} is below 1 and will be clamped to 1"),
            ));
        }
    }
}
