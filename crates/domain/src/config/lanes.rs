use serde::{Deserialize, Serialize};

use super::limits::de_limit;

/// Default ceiling for the `cron` lane (scheduled triggers run one at a time).
pub const DEFAULT_CRON_MAX_CONCURRENT_RUNS: i64 = 1;

/// Scheduled-trigger settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CronConfig {
    /// Concurrency of the `cron` lane.
    #[serde(default, deserialize_with = "de_limit")]
    pub max_concurrent_runs: Option<i64>,
}

impl CronConfig {
    pub fn concurrency(&self) -> i64 {
        self.max_concurrent_runs.unwrap_or(DEFAULT_CRON_MAX_CONCURRENT_RUNS)
    }
}
