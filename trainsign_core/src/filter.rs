//! Upcoming-arrival filtering and the fixed three-slot display row.

use chrono::NaiveDateTime;

use crate::arrival::{ArrivalOffset, minutes_until};
use crate::error::SignError;

/// Rendered form of an empty slot.
pub const EMPTY_SLOT: &str = "-";

/// Number of arrivals shown per direction.
pub const TRIPLE_LEN: usize = 3;

/// Minute offsets for trains that have not left yet, in feed order.
///
/// The feed is assumed to be chronological already; nothing is re-sorted.
/// The first unparseable timestamp aborts the whole list.
pub fn filter_upcoming<S: AsRef<str>>(
    now: NaiveDateTime,
    arrivals: &[S],
) -> Result<Vec<ArrivalOffset>, SignError> {
    let mut out = Vec::with_capacity(arrivals.len());
    for raw in arrivals {
        let minutes = minutes_until(now, raw.as_ref())?;
        if minutes >= 0 {
            out.push(minutes);
        }
    }
    Ok(out)
}

/// A single display slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Slot {
    Minutes(ArrivalOffset),
    #[default]
    Empty,
}

impl core::fmt::Display for Slot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Slot::Minutes(m) => write!(f, "{m}"),
            Slot::Empty => f.write_str(EMPTY_SLOT),
        }
    }
}

/// Exactly three slots; renders as `"12,18,25"` or `"-,-,-"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArrivalTriple([Slot; TRIPLE_LEN]);

impl ArrivalTriple {
    pub const EMPTY: Self = Self([Slot::Empty; TRIPLE_LEN]);

    pub fn slots(&self) -> &[Slot; TRIPLE_LEN] {
        &self.0
    }

    pub fn to_strings(&self) -> [String; TRIPLE_LEN] {
        [
            self.0[0].to_string(),
            self.0[1].to_string(),
            self.0[2].to_string(),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|s| matches!(s, Slot::Empty))
    }
}

impl core::fmt::Display for ArrivalTriple {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{},{},{}", self.0[0], self.0[1], self.0[2])
    }
}

/// First three offsets in order; short input pads with empty slots and
/// anything past the third is dropped.
pub fn to_triple(offsets: &[ArrivalOffset]) -> ArrivalTriple {
    let mut slots = [Slot::Empty; TRIPLE_LEN];
    for (slot, &m) in slots.iter_mut().zip(offsets) {
        *slot = Slot::Minutes(m);
    }
    ArrivalTriple(slots)
}
