use std::time::Duration;

use crate::core::host::DEFAULT_SAMPLE_WINDOW;
use crate::core::snapshot::PollInterval;
use crate::error::Result;

/// Runtime settings for one console run.
///
/// Nothing is persisted: every run starts from these defaults and the
/// command-line flags.
#[derive(Debug, Clone)]
pub struct ConsoleSettings {
    pub interval: PollInterval,
    pub sample_window: Duration,
    pub max_ticks: Option<u64>,
    pub json: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            interval: PollInterval::default(),
            sample_window: DEFAULT_SAMPLE_WINDOW,
            max_ticks: None,
            json: false,
        }
    }
}

impl ConsoleSettings {
    pub fn with_interval_secs(mut self, secs: u64) -> Result<Self> {
        self.interval = PollInterval::from_secs(secs)?;
        Ok(self)
    }

    pub fn with_sample_window_ms(mut self, ms: u64) -> Self {
        self.sample_window = Duration::from_millis(ms);
        self
    }

    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks.filter(|&n| n > 0);
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}
