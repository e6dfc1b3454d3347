//! The sign's state machine.
//!
//! Between fetches the controller idles; when an interval is due it performs
//! the network work synchronously inside `tick`, so nothing else in the loop
//! runs until the call returns. All mutable state lives in `SignState` and is
//! only touched through `&mut self`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use trainsign_traits::{Clock, DataSource, DisplaySink, LinkClient, RawArrival, TimeSync};

use crate::config::TimingCfg;
use crate::error::SignError;
use crate::filter::{ArrivalTriple, filter_upcoming, to_triple};
use crate::hw_error::{map_source_error, map_sync_error};
use crate::lines::{LineDescriptor, LineRegistry};
use crate::resilience::{Recovery, ResilienceManager};
use crate::status::TickStatus;

/// Mutable loop state. One instance, owned by the controller.
#[derive(Debug, Clone)]
pub struct SignState {
    pub(crate) active: LineDescriptor,
    pub(crate) last_fetch: Option<Instant>,
    pub(crate) last_sync: Option<Instant>,
    pub(crate) sync_failed: bool,
    pub(crate) error_count: u32,
}

impl SignState {
    pub fn new(active: LineDescriptor) -> Self {
        Self {
            active,
            last_fetch: None,
            last_sync: None,
            sync_failed: false,
            error_count: 0,
        }
    }

    pub fn active(&self) -> &LineDescriptor {
        &self.active
    }

    /// Last fetch attempt, successful or not. `None` forces a fetch.
    pub fn last_fetch(&self) -> Option<Instant> {
        self.last_fetch
    }

    /// Last successful clock sync.
    pub fn last_sync(&self) -> Option<Instant> {
        self.last_sync
    }

    /// The clock has never synced, or the latest attempt failed. Such a
    /// sync is only retried together with a due fetch.
    pub fn sync_behind(&self) -> bool {
        self.last_sync.is_none() || self.sync_failed
    }

    /// Consecutive failed refreshes since the last success.
    pub fn error_count(&self) -> u32 {
        self.error_count
    }
}

#[inline]
fn due(last: Option<Instant>, interval: Duration, now: Instant) -> bool {
    last.is_none_or(|t| now.saturating_duration_since(t) >= interval)
}

/// Time strings for records on `route`, in feed order. Matching records
/// without a time are skipped.
fn times_for<'a>(records: &'a [RawArrival], route: &str) -> Vec<&'a str> {
    records
        .iter()
        .filter(|r| r.route == route)
        .filter_map(|r| r.time.as_deref())
        .collect()
}

pub struct SignController<D, S, L, T> {
    source: D,
    display: S,
    link: L,
    time: T,
    registry: LineRegistry,
    timing: TimingCfg,
    resilience: ResilienceManager,
    clock: Arc<dyn Clock + Send + Sync>,
    state: SignState,
}

impl<D, S, L, T> core::fmt::Debug for SignController<D, S, L, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SignController")
            .field("line", &self.state.active.id)
            .field("errors", &self.state.error_count)
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

impl<D, S, L, T> SignController<D, S, L, T>
where
    D: DataSource,
    S: DisplaySink,
    L: LinkClient,
    T: TimeSync,
{
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        source: D,
        display: S,
        link: L,
        time: T,
        registry: LineRegistry,
        active: LineDescriptor,
        timing: TimingCfg,
        resilience: ResilienceManager,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            source,
            display,
            link,
            time,
            registry,
            timing,
            resilience,
            clock,
            state: SignState::new(active),
        }
    }

    /// Paint the startup screen for the active line.
    pub fn begin(&mut self) {
        let line = &self.state.active;
        tracing::info!(line = %line.id, stop_id = %line.stop_id, station = %line.station, "sign start");
        self.display.show_logo(&line.logo);
        self.display.set_labels(&line.north_label, &line.south_label);
        let empty = ArrivalTriple::EMPTY.to_string();
        self.display.set_arrivals(&empty, &empty);
    }

    /// Make `new_id` the active line. Returns `false` when it already is.
    ///
    /// Swaps the logo and labels, blanks both arrival rows and forces a fetch
    /// on the next tick. Unknown ids fail before anything changes.
    pub fn switch_line(&mut self, new_id: &str) -> Result<bool, SignError> {
        if new_id == self.state.active.id {
            return Ok(false);
        }
        let next = self.registry.lookup(new_id)?.clone();
        tracing::info!(from = %self.state.active.id, to = %next.id, stop_id = %next.stop_id, "switch line");

        self.display.show_logo(&next.logo);
        self.display.set_labels(&next.north_label, &next.south_label);
        let empty = ArrivalTriple::EMPTY.to_string();
        self.display.set_arrivals(&empty, &empty);

        self.state.active = next;
        self.state.last_fetch = None;
        Ok(true)
    }

    /// One loop iteration: resync and refetch when due, recover on failure.
    pub fn tick(&mut self, now: Instant, now_wall: NaiveDateTime) -> TickStatus {
        let fetch_due = due(self.state.last_fetch, self.timing.fetch_interval, now);
        let sync_due = due(self.state.last_sync, self.timing.sync_interval, now)
            && (fetch_due || !self.state.sync_behind());
        if !sync_due && !fetch_due {
            return TickStatus::Idle;
        }

        match self.refresh(now, now_wall, sync_due, fetch_due) {
            Ok(Some((north, south))) => {
                self.state.error_count = 0;
                self.state.last_fetch = Some(now);
                TickStatus::Refreshed { north, south }
            }
            Ok(None) => TickStatus::Synced,
            Err(error) => self.fail(now, error, fetch_due),
        }
    }

    fn refresh(
        &mut self,
        now: Instant,
        now_wall: NaiveDateTime,
        sync_due: bool,
        fetch_due: bool,
    ) -> Result<Option<(ArrivalTriple, ArrivalTriple)>, SignError> {
        let mut wall = now_wall;
        if sync_due {
            if let Err(e) = self.time.sync() {
                self.state.sync_failed = true;
                return Err(map_sync_error(&*e));
            }
            self.state.sync_failed = false;
            self.state.last_sync = Some(now);
            wall = self.time.now();
            tracing::debug!(%wall, "clock synced");
        }
        if !fetch_due {
            return Ok(None);
        }

        let line = &self.state.active;
        let stop = self
            .source
            .fetch(&line.stop_id)
            .map_err(|e| map_source_error(&*e))?;
        let north_offsets = filter_upcoming(wall, &times_for(&stop.north, &line.id))?;
        let south_offsets = filter_upcoming(wall, &times_for(&stop.south, &line.id))?;
        let north = to_triple(&north_offsets);
        let south = to_triple(&south_offsets);

        self.display
            .set_arrivals(&north.to_string(), &south.to_string());
        tracing::info!(line = %line.id, %north, %south, "fetch ok");
        Ok(Some((north, south)))
    }

    /// Count the failure and run recovery. A due fetch is consumed so the
    /// fetch interval doubles as backoff; an undue one keeps its schedule.
    fn fail(&mut self, now: Instant, error: SignError, fetch_due: bool) -> TickStatus {
        self.state.error_count = self.state.error_count.saturating_add(1);
        if fetch_due {
            self.state.last_fetch = Some(now);
        }
        let errors = self.state.error_count;
        tracing::warn!(
            error = %error,
            category = ?error.category(),
            errors,
            line = %self.state.active.id,
            "refresh failed"
        );
        match self.resilience.handle_failure(errors, &mut self.link) {
            Recovery::DeviceReset => TickStatus::ResetRequired { errors },
            recovery => TickStatus::Failed {
                error,
                errors,
                recovery,
            },
        }
    }

    /// Current wall time from the time-sync collaborator.
    pub fn wall_now(&self) -> NaiveDateTime {
        self.time.now()
    }
}

impl<D, S, L, T> SignController<D, S, L, T> {
    pub fn state(&self) -> &SignState {
        &self.state
    }

    pub fn active_line(&self) -> &LineDescriptor {
        &self.state.active
    }

    pub fn registry(&self) -> &LineRegistry {
        &self.registry
    }

    pub fn timing(&self) -> &TimingCfg {
        &self.timing
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    pub fn display(&self) -> &S {
        &self.display
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn time_sync(&self) -> &T {
        &self.time
    }

    pub fn time_sync_mut(&mut self) -> &mut T {
        &mut self.time
    }
}
