use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use lg_gateway::cli::{self, Cli, Command, ConfigCommand};
use lg_routing::RouteRequest;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        init_json_tracing();
    } else {
        init_cli_tracing();
    }

    match cli.command {
        Command::Route { provider, peer, account, lane, json } => {
            let (config, _) = cli::load_config(cli.config.as_deref())?;
            let request = RouteRequest { provider, peer, account_id: account };
            cli::route::run(&config, request, lane.as_deref(), json)
        }
        Command::Lanes { json } => {
            let (config, _) = cli::load_config(cli.config.as_deref())?;
            cli::lanes::show(&config, json)
        }
        Command::History { file, budget, turns, json } => {
            let (config, _) = cli::load_config(cli.config.as_deref())?;
            cli::history::run(&config, &file, budget, turns, json)
        }
        Command::Config(ConfigCommand::Validate) => {
            let (config, config_path) = cli::load_config(cli.config.as_deref())?;
            if !cli::config::validate(&config, &config_path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => {
            let (config, _) = cli::load_config(cli.config.as_deref())?;
            cli::config::show(&config)
        }
        Command::Version => {
            println!("lanegate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Structured JSON logs on stderr, for running under a log collector.
fn init_json_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lg_gateway=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();
}

/// Compact stderr-only tracing for one-shot commands.
///
/// Defaults to `warn` so diagnostics do not pollute stdout.
fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
