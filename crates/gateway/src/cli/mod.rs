pub mod config;
pub mod history;
pub mod lanes;
pub mod route;

use clap::{Parser, Subcommand};

/// LaneGate: routing and lane scheduling for multi-channel agents.
#[derive(Debug, Parser)]
#[command(name = "lanegate", version, about)]
pub struct Cli {
    /// Config file (overrides `LG_CONFIG`).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Emit logs as JSON instead of compact text.
    #[arg(long, global = true)]
    pub log_json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show which agent, session and lanes an inbound message would get.
    Route {
        /// Provider the message arrived on (e.g. "telegram").
        provider: String,
        /// Sender as `kind:id` (e.g. "dm:42", "group:-100"); a bare id is a DM.
        #[arg(long, value_parser = route::parse_peer)]
        peer: Option<lg_domain::config::PeerRef>,
        /// Bot account the message arrived on.
        #[arg(long)]
        account: Option<String>,
        /// Explicit global lane (e.g. "cron").
        #[arg(long)]
        lane: Option<String>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the lane limits the current config produces.
    Lanes {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Trim a JSON transcript to the configured history budget.
    History {
        /// Path to a JSON array of messages.
        file: String,
        /// Token budget (defaults to `history.max_tokens`).
        #[arg(long)]
        budget: Option<usize>,
        /// Max user turns (defaults to `history.max_turns`; 0 = unlimited).
        #[arg(long)]
        turns: Option<usize>,
        /// Print the kept messages as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from `path`, else `LG_CONFIG`, else
/// `config.toml`.  A missing file yields the defaults.  Returns the parsed
/// [`Config`](lg_domain::config::Config) and the path that was used.
pub fn load_config(path: Option<&str>) -> anyhow::Result<(lg_domain::config::Config, String)> {
    let config_path = match path {
        Some(p) => p.to_owned(),
        None => std::env::var("LG_CONFIG").unwrap_or_else(|_| "config.toml".into()),
    };

    let config = lg_domain::config::Config::load_or_default(std::path::Path::new(&config_path))
        .map_err(|e| anyhow::anyhow!("loading {config_path}: {e}"))?;

    Ok((config, config_path))
}
