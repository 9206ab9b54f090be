use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing knobs for typed entry and bounded waits.
///
/// Inter-character and settle delays are fixed constants per run, not
/// adaptive; they affect timing only, never a field's final value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pacing {
    /// Delay between individual keystrokes during typed entry.
    #[serde(default = "default_inter_key_delay_ms")]
    pub inter_key_delay_ms: u64,
    /// Delay after the final keystroke, allowing keystroke-driven validation
    /// or formatting to settle.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Upper bound for `wait_for` polling loops.
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
    /// Polling interval inside `wait_for`.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            inter_key_delay_ms: default_inter_key_delay_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            wait_timeout_ms: default_wait_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_inter_key_delay_ms() -> u64 {
    80
}

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_wait_timeout_ms() -> u64 {
    5000
}

fn default_poll_interval_ms() -> u64 {
    250
}

impl Pacing {
    pub fn inter_key_delay(&self) -> Duration {
        Duration::from_millis(self.inter_key_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
