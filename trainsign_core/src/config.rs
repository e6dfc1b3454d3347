//! Runtime configuration for the sign loop.
//!
//! These are the structs `SignController` and the runner consume. They are
//! separate from the TOML-deserialized config in `trainsign_config`.

use std::time::Duration;

use trainsign_traits::ButtonEdges;

use crate::error::SignError;
use crate::lines::LineRegistry;

/// Loop cadence.
#[derive(Debug, Clone)]
pub struct TimingCfg {
    /// Input poll quantum; the loop sleeps this long between iterations.
    pub poll: Duration,
    /// Minimum spacing between feed fetches (also the failure backoff).
    pub fetch_interval: Duration,
    /// Minimum spacing between wall-clock resyncs.
    pub sync_interval: Duration,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            poll: Duration::from_millis(100),
            fetch_interval: Duration::from_secs(30),
            sync_interval: Duration::from_secs(30),
        }
    }
}

/// Escalation policy knobs.
#[derive(Debug, Clone)]
pub struct ResilienceCfg {
    /// A full device reset happens once the error counter exceeds this.
    pub error_reset_threshold: u32,
    /// Wait between a coprocessor reset and the retry.
    pub settle: Duration,
}

impl Default for ResilienceCfg {
    fn default() -> Self {
        Self {
            error_reset_threshold: 3,
            settle: Duration::from_secs(2),
        }
    }
}

/// Which line each front-panel button selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonMap {
    pub up: String,
    pub down: String,
}

impl Default for ButtonMap {
    fn default() -> Self {
        Self {
            up: "L".into(),
            down: "G".into(),
        }
    }
}

impl ButtonMap {
    /// Line requested by this poll's edges. When both buttons fell in the
    /// same poll the up button wins.
    pub fn resolve(&self, edges: ButtonEdges) -> Option<&str> {
        if edges.up {
            Some(self.up.as_str())
        } else if edges.down {
            Some(self.down.as_str())
        } else {
            None
        }
    }

    /// Fail fast if a button points at a line the registry does not have.
    pub fn check(&self, registry: &LineRegistry) -> Result<(), SignError> {
        registry.lookup(&self.up)?;
        registry.lookup(&self.down)?;
        Ok(())
    }
}
