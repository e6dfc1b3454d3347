//! Collaborator implementations for the arrival sign.
//!
//! Simulated pieces are always built. Real network access sits behind the
//! `http` feature and Raspberry Pi buttons behind `hardware`.

pub mod debounce;
pub mod error;
pub mod feed;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;
#[cfg(feature = "http")]
pub mod http;
pub mod input;

use std::io::Write;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use chrono::{Local, NaiveDateTime, TimeDelta};
use trainsign_traits::{
    BoxError, Credentials, DataSource, DeviceReset, DisplaySink, LinkClient, RawArrival,
    StopArrivals, TimeSync,
};

use crate::error::HwError;

pub use debounce::Debouncer;
pub use input::StdinInput;

/// Exit status used when the process stands in for a device reset.
pub const RESET_EXIT_CODE: i32 = 75;

/// Route id a stop id belongs to: its leading letters ("L11" -> "L").
fn route_of(stop_id: &str) -> &str {
    let end = stop_id
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(stop_id.len());
    &stop_id[..end]
}

/// Generated feed: a train every `headway` in both directions, starting one
/// headway in the past, plus a train of another route to be filtered out.
pub struct SimulatedDataSource {
    headway: Duration,
    fail_every: Option<u32>,
    fetches: u32,
}

impl SimulatedDataSource {
    pub fn new() -> Self {
        Self {
            headway: Duration::from_secs(240),
            fail_every: None,
            fetches: 0,
        }
    }

    pub fn with_headway(mut self, headway: Duration) -> Self {
        self.headway = headway.max(Duration::from_secs(1));
        self
    }

    /// Every `n`-th fetch fails; `1` fails them all.
    pub fn with_fail_every(mut self, n: u32) -> Self {
        self.fail_every = Some(n.max(1));
        self
    }

    /// Feed generated against an explicit wall time.
    pub fn feed_at(&self, now: NaiveDateTime, stop_id: &str) -> StopArrivals {
        let route = route_of(stop_id);
        let step = TimeDelta::from_std(self.headway).unwrap_or(TimeDelta::minutes(4));
        let times = |phase: i32| -> Vec<RawArrival> {
            (-1..5)
                .map(|k| {
                    let at = now + step * k + TimeDelta::seconds(i64::from(phase));
                    RawArrival::new(route, at.format("%Y-%m-%dT%H:%M:%S").to_string())
                })
                .collect()
        };
        let mut north = times(0);
        north.insert(2, RawArrival::new("X", now.format("%Y-%m-%dT%H:%M:%S").to_string()));
        StopArrivals {
            north,
            south: times(90),
        }
    }
}

impl Default for SimulatedDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for SimulatedDataSource {
    fn fetch(&mut self, stop_id: &str) -> Result<StopArrivals, BoxError> {
        self.fetches = self.fetches.saturating_add(1);
        if let Some(n) = self.fail_every
            && self.fetches % n == 0
        {
            return Err(Box::new(HwError::Transport(
                "simulated feed outage".into(),
            )));
        }
        Ok(self.feed_at(Local::now().naive_local(), stop_id))
    }
}

/// Link that is always up unless told otherwise.
#[derive(Debug)]
pub struct SimulatedLink {
    connected: bool,
}

impl SimulatedLink {
    pub fn new(connected: bool) -> Self {
        Self { connected }
    }
}

impl Default for SimulatedLink {
    fn default() -> Self {
        Self::new(true)
    }
}

impl LinkClient for SimulatedLink {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn reconnect(&mut self, credentials: &Credentials) -> Result<(), BoxError> {
        tracing::info!(ssid = %credentials.ssid, "simulated reconnect");
        self.connected = true;
        Ok(())
    }

    fn hard_reset(&mut self) -> Result<(), BoxError> {
        tracing::info!("simulated coprocessor reset");
        self.connected = false;
        Ok(())
    }
}

/// Host network probe. "Connected" means a TCP connection to the feed's
/// host succeeds; the host OS owns the actual radio.
#[derive(Debug, Clone)]
pub struct HostLink {
    target: String,
    timeout: Duration,
}

impl HostLink {
    /// `target` is `host:port`.
    pub fn new(target: impl Into<String>, timeout: Duration) -> Self {
        Self {
            target: target.into(),
            timeout,
        }
    }

    /// Probe target for an `http(s)://host[:port]/...` URL.
    pub fn for_url(url: &str, timeout: Duration) -> Self {
        let (scheme, rest) = url.split_once("://").unwrap_or(("https", url));
        let authority = rest.split('/').next().unwrap_or(rest);
        let target = if authority.contains(':') {
            authority.to_string()
        } else {
            let port = if scheme == "http" { 80 } else { 443 };
            format!("{authority}:{port}")
        };
        Self::new(target, timeout)
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    fn probe(&self) -> Result<(), HwError> {
        let addrs: Vec<SocketAddr> = self.target.to_socket_addrs()?.collect();
        let mut last = HwError::Link(format!("{} did not resolve", self.target));
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(_) => return Ok(()),
                Err(e) => last = HwError::Io(e),
            }
        }
        Err(last)
    }
}

impl LinkClient for HostLink {
    fn is_connected(&self) -> bool {
        self.probe().is_ok()
    }

    fn reconnect(&mut self, _credentials: &Credentials) -> Result<(), BoxError> {
        self.probe()
            .map_err(|e| Box::new(HwError::Link(format!("{}: {e}", self.target))) as BoxError)
    }

    fn hard_reset(&mut self) -> Result<(), BoxError> {
        tracing::warn!(probe = %self.target, "no coprocessor on host, reset skipped");
        Ok(())
    }
}

/// Text rendering of the matrix panel. Every arrivals update reprints the
/// whole panel.
pub struct ConsoleDisplay<W: Write = std::io::Stdout> {
    out: W,
    logo: String,
    north_label: String,
    south_label: String,
}

impl ConsoleDisplay<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            logo: String::new(),
            north_label: String::new(),
            south_label: String::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySink for ConsoleDisplay<W> {
    fn show_logo(&mut self, logo: &str) {
        self.logo = logo.to_string();
    }

    fn set_labels(&mut self, north: &str, south: &str) {
        self.north_label = north.to_string();
        self.south_label = south.to_string();
    }

    fn set_arrivals(&mut self, north: &str, south: &str) {
        let width = self.north_label.len().max(self.south_label.len());
        let res = writeln!(
            self.out,
            "[{}]\n  {:<width$}  {north}\n  {:<width$}  {south}",
            self.logo, self.north_label, self.south_label
        )
        .and_then(|()| self.out.flush());
        if let Err(e) = res {
            tracing::debug!(error = %e, "console display write failed");
        }
    }
}

/// Host wall clock. The OS keeps it in sync, so `sync` only checks that the
/// clock looks plausible.
#[derive(Debug, Default)]
pub struct SystemTimeSync;

impl TimeSync for SystemTimeSync {
    fn sync(&mut self) -> Result<(), BoxError> {
        let now = Local::now();
        if now.timestamp() <= 0 {
            return Err(Box::new(HwError::Io(std::io::Error::other(
                "system clock is not set",
            ))));
        }
        Ok(())
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Ends the process with `RESET_EXIT_CODE` so a supervisor restarts it.
///
/// `process::exit` skips destructors, so anything that buffers (a
/// non-blocking log writer, for one) registers a `before_exit` hook.
#[derive(Default)]
pub struct ProcessReset {
    before_exit: Option<Box<dyn FnMut() + Send>>,
}

impl std::fmt::Debug for ProcessReset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessReset")
            .field("before_exit", &self.before_exit.is_some())
            .finish()
    }
}

impl ProcessReset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_exit(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.before_exit = Some(Box::new(hook));
        self
    }

    /// Log the reset and run the hook once. Called by `reset` right before exiting.
    fn prepare(&mut self) {
        tracing::error!(code = RESET_EXIT_CODE, "device reset: exiting");
        if let Some(mut hook) = self.before_exit.take() {
            hook();
        }
    }
}

impl DeviceReset for ProcessReset {
    fn reset(&mut self) {
        self.prepare();
        std::process::exit(RESET_EXIT_CODE);
    }
}
