#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use trainsign_core::{SignController, SignError, SignOptions, TimingCfg, build_controller};
use trainsign_traits::{
    BoxError, ButtonEdges, Credentials, DataSource, DisplaySink, InputSource, LinkClient,
    ManualClock, RawArrival, StopArrivals, TimeSync,
};

pub fn wall(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(h, m, s))
        .unwrap()
}

pub fn stop(north: &[(&str, &str)], south: &[(&str, &str)]) -> StopArrivals {
    let conv = |v: &[(&str, &str)]| {
        v.iter()
            .map(|(r, t)| RawArrival::new(*r, *t))
            .collect::<Vec<_>>()
    };
    StopArrivals {
        north: conv(north),
        south: conv(south),
    }
}

/// Replays scripted responses; fails once the script runs out.
#[derive(Default)]
pub struct ScriptSource {
    pub responses: VecDeque<Result<StopArrivals, String>>,
    pub fetches: Vec<String>,
    /// Returned when the script is exhausted; `None` means fail.
    pub fallback: Option<StopArrivals>,
}

impl ScriptSource {
    pub fn ok(resp: StopArrivals) -> Self {
        Self {
            responses: VecDeque::from([Ok(resp)]),
            ..Default::default()
        }
    }

    pub fn always(resp: StopArrivals) -> Self {
        Self {
            fallback: Some(resp),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }
}

impl DataSource for ScriptSource {
    fn fetch(&mut self, stop_id: &str) -> Result<StopArrivals, BoxError> {
        self.fetches.push(stop_id.to_string());
        match self.responses.pop_front() {
            Some(Ok(s)) => Ok(s),
            Some(Err(msg)) => Err(Box::new(std::io::Error::other(msg))),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| -> BoxError { Box::new(std::io::Error::other("connection refused")) }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paint {
    Logo(String),
    Labels(String, String),
    Arrivals(String, String),
}

#[derive(Default)]
pub struct SpyDisplay {
    pub calls: Vec<Paint>,
}

impl SpyDisplay {
    pub fn last_arrivals(&self) -> Option<(&str, &str)> {
        self.calls.iter().rev().find_map(|c| match c {
            Paint::Arrivals(n, s) => Some((n.as_str(), s.as_str())),
            _ => None,
        })
    }
}

impl DisplaySink for SpyDisplay {
    fn show_logo(&mut self, logo: &str) {
        self.calls.push(Paint::Logo(logo.into()));
    }
    fn set_labels(&mut self, north: &str, south: &str) {
        self.calls.push(Paint::Labels(north.into(), south.into()));
    }
    fn set_arrivals(&mut self, north: &str, south: &str) {
        self.calls.push(Paint::Arrivals(north.into(), south.into()));
    }
}

pub struct FakeLink {
    pub connected: bool,
    pub reconnect_ok: bool,
    pub reconnects: u32,
    pub hard_resets: u32,
    /// `is_connected` calls.
    pub probes: Cell<u32>,
}

impl FakeLink {
    pub fn up() -> Self {
        Self {
            connected: true,
            reconnect_ok: true,
            reconnects: 0,
            hard_resets: 0,
            probes: Cell::new(0),
        }
    }

    pub fn down(reconnect_ok: bool) -> Self {
        Self {
            connected: false,
            reconnect_ok,
            reconnects: 0,
            hard_resets: 0,
            probes: Cell::new(0),
        }
    }
}

impl LinkClient for FakeLink {
    fn is_connected(&self) -> bool {
        self.probes.set(self.probes.get() + 1);
        self.connected
    }
    fn reconnect(&mut self, _c: &Credentials) -> Result<(), BoxError> {
        self.reconnects += 1;
        if self.reconnect_ok {
            self.connected = true;
            Ok(())
        } else {
            Err(Box::new(std::io::Error::other("no AP")))
        }
    }
    fn hard_reset(&mut self) -> Result<(), BoxError> {
        self.hard_resets += 1;
        Ok(())
    }
}

pub struct FixedTime {
    pub wall: NaiveDateTime,
    pub fail: bool,
    pub syncs: u32,
}

impl FixedTime {
    pub fn at(wall: NaiveDateTime) -> Self {
        Self {
            wall,
            fail: false,
            syncs: 0,
        }
    }
}

impl TimeSync for FixedTime {
    fn sync(&mut self) -> Result<(), BoxError> {
        self.syncs += 1;
        if self.fail {
            Err(Box::new(std::io::Error::other("ntp unreachable")))
        } else {
            Ok(())
        }
    }
    fn now(&self) -> NaiveDateTime {
        self.wall
    }
}

#[derive(Default)]
pub struct ScriptInput {
    pub edges: VecDeque<ButtonEdges>,
}

impl InputSource for ScriptInput {
    fn poll(&mut self) -> ButtonEdges {
        self.edges.pop_front().unwrap_or(ButtonEdges::NONE)
    }
}

pub type TestSign = SignController<ScriptSource, SpyDisplay, FakeLink, FixedTime>;

pub fn options(clock: &ManualClock) -> SignOptions {
    SignOptions {
        clock: Some(Arc::new(clock.clone())),
        credentials: Some(Box::new(|| -> Result<Credentials, SignError> {
            Ok(Credentials {
                ssid: "home".into(),
                password: "pw".into(),
            })
        })),
        ..Default::default()
    }
}

pub fn sign_with(source: ScriptSource, link: FakeLink, clock: &ManualClock) -> TestSign {
    build_controller(
        source,
        SpyDisplay::default(),
        link,
        FixedTime::at(wall(12, 0, 0)),
        options(clock),
    )
    .unwrap()
}

pub fn sign(source: ScriptSource, clock: &ManualClock) -> TestSign {
    sign_with(source, FakeLink::up(), clock)
}

/// Sign with explicit fetch and sync intervals and a 100 ms poll.
pub fn sign_timed(
    source: ScriptSource,
    time: FixedTime,
    fetch_s: u64,
    sync_s: u64,
    clock: &ManualClock,
) -> TestSign {
    let opts = SignOptions {
        timing: Some(TimingCfg {
            poll: Duration::from_millis(100),
            fetch_interval: Duration::from_secs(fetch_s),
            sync_interval: Duration::from_secs(sync_s),
        }),
        ..options(clock)
    };
    build_controller(source, SpyDisplay::default(), FakeLink::up(), time, opts).unwrap()
}
