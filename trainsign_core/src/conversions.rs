//! `From` implementations bridging `trainsign_config` types to `trainsign_core` types.

use std::time::Duration;

use crate::config::{ButtonMap, ResilienceCfg, TimingCfg};
use crate::error::SignError;
use crate::lines::{LineDescriptor, LineRegistry};
use crate::resilience::EnvCredentials;

// ── TimingCfg ────────────────────────────────────────────────────────────────

impl From<&trainsign_config::Timing> for TimingCfg {
    fn from(c: &trainsign_config::Timing) -> Self {
        Self {
            poll: Duration::from_millis(c.poll_ms),
            fetch_interval: Duration::from_secs(c.fetch_interval_s),
            sync_interval: Duration::from_secs(c.sync_interval_s),
        }
    }
}

// ── ResilienceCfg ────────────────────────────────────────────────────────────

impl From<&trainsign_config::Resilience> for ResilienceCfg {
    fn from(c: &trainsign_config::Resilience) -> Self {
        Self {
            error_reset_threshold: c.error_reset_threshold,
            settle: Duration::from_millis(c.settle_ms),
        }
    }
}

// ── ButtonMap ────────────────────────────────────────────────────────────────

impl From<&trainsign_config::Buttons> for ButtonMap {
    fn from(c: &trainsign_config::Buttons) -> Self {
        Self {
            up: c.up.clone(),
            down: c.down.clone(),
        }
    }
}

// ── Credentials ──────────────────────────────────────────────────────────────

impl From<&trainsign_config::Wifi> for EnvCredentials {
    fn from(c: &trainsign_config::Wifi) -> Self {
        Self {
            ssid_var: c.ssid_env.clone(),
            password_var: c.password_env.clone(),
        }
    }
}

// ── Lines ────────────────────────────────────────────────────────────────────

impl From<&trainsign_config::LineEntry> for LineDescriptor {
    fn from(c: &trainsign_config::LineEntry) -> Self {
        Self::new(&c.id, &c.stop_id, &c.station, &c.north, &c.south, &c.logo)
    }
}

impl TryFrom<&trainsign_config::Config> for LineRegistry {
    type Error = SignError;

    fn try_from(c: &trainsign_config::Config) -> Result<Self, Self::Error> {
        LineRegistry::new(c.lines.iter().map(LineDescriptor::from).collect())
    }
}
