//! `lanegate history`: apply the history budget to a transcript file.

use anyhow::Context;
use lg_domain::config::Config;
use lg_domain::message::Message;
use lg_history::{budget_report, limit_history_tokens, limit_history_turns, HistoryBudget};

pub fn read_transcript(path: &str) -> anyhow::Result<Vec<Message>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))
}

/// Trim `messages` by turns then tokens.  Flags override the config.
pub fn trim<'a>(
    config: &Config,
    messages: &'a [Message],
    budget: Option<usize>,
    turns: Option<usize>,
) -> (&'a [Message], HistoryBudget) {
    let budget = budget.unwrap_or(config.history.max_tokens);
    let turns = turns.unwrap_or(config.history.max_turns);
    let kept = limit_history_tokens(limit_history_turns(messages, turns), budget);
    (kept, budget_report(messages, kept, budget))
}

pub fn run(
    config: &Config,
    path: &str,
    budget: Option<usize>,
    turns: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let messages = read_transcript(path)?;
    let (kept, report) = trim(config, &messages, budget, turns);
    if json {
        println!("{}", serde_json::to_string_pretty(kept)?);
    } else {
        println!(
            "kept {} of {} message(s), ~{} of {} tokens ({} dropped)",
            report.kept,
            messages.len(),
            report.tokens,
            report.budget,
            report.dropped
        );
    }
    Ok(())
}
