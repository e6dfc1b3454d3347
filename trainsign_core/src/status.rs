//! Outcome of each controller tick.

use crate::error::SignError;
use crate::filter::ArrivalTriple;
use crate::resilience::Recovery;

/// Public status of a single loop iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickStatus {
    /// Nothing was due.
    Idle,
    /// Wall clock resynced; no fetch was due.
    Synced,
    /// New arrivals were pushed to the display.
    Refreshed {
        north: ArrivalTriple,
        south: ArrivalTriple,
    },
    /// Sync or fetch failed; recovery ran and the interval was consumed.
    Failed {
        error: SignError,
        errors: u32,
        recovery: Recovery,
    },
    /// Error budget exhausted. The caller must reset the device now.
    ResetRequired { errors: u32 },
}
