//! `lanegate lanes`: show the lane limits a config produces.

use lg_domain::config::Config;

use crate::lanes::{apply_lane_concurrency, LaneScheduler, LaneSnapshot};

pub fn snapshot(config: &Config) -> Vec<LaneSnapshot> {
    let scheduler = LaneScheduler::new();
    apply_lane_concurrency(&scheduler, config);
    scheduler.snapshot()
}

pub fn show(config: &Config, json: bool) -> anyhow::Result<()> {
    let lanes = snapshot(config);
    if json {
        println!("{}", serde_json::to_string_pretty(&lanes)?);
        return Ok(());
    }

    let width = lanes.iter().map(|l| l.name.len()).max().unwrap_or(0).max(4);
    println!("{:<width$}  LIMIT", "LANE");
    for lane in &lanes {
        println!("{:<width$}  {}", lane.name, lane.limit);
    }
    Ok(())
}
