//! Collaborator seams for the arrival sign.
//!
//! Everything the sign talks to that is not arrival arithmetic or loop policy
//! sits behind one of these traits: the arrival feed, the matrix display, the
//! two front-panel buttons, the wireless link, the wall-clock sync and the
//! device reset line. Errors cross these boundaries boxed; the core maps them
//! to its own taxonomy.

pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

use chrono::NaiveDateTime;

/// Error type used at every collaborator boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One predicted arrival as delivered by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawArrival {
    /// Route identifier, compared against the active line id.
    pub route: String,
    /// Extended ISO-8601 timestamp, possibly with a UTC offset suffix.
    /// The feed occasionally omits it; such records never reach the display.
    pub time: Option<String>,
}

impl RawArrival {
    pub fn new(route: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            time: Some(time.into()),
        }
    }

    /// Record with a route but no predicted time.
    pub fn untimed(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            time: None,
        }
    }
}

/// Arrivals for a single stop, split by direction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StopArrivals {
    pub north: Vec<RawArrival>,
    pub south: Vec<RawArrival>,
}

/// Wireless credentials, read fresh for every reconnect attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub ssid: String,
    pub password: String,
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Debounced "pressed" edges observed during one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonEdges {
    pub up: bool,
    pub down: bool,
}

impl ButtonEdges {
    pub const NONE: Self = Self {
        up: false,
        down: false,
    };

    #[inline]
    pub fn any(self) -> bool {
        self.up || self.down
    }
}

/// Source of arrival predictions for a stop.
pub trait DataSource {
    fn fetch(&mut self, stop_id: &str) -> Result<StopArrivals, BoxError>;
}

/// The matrix panel. Accepts pre-formatted strings only.
pub trait DisplaySink {
    /// Show the logo asset at its fixed position, replacing the previous one.
    fn show_logo(&mut self, logo: &str);
    /// Direction labels (northbound, southbound).
    fn set_labels(&mut self, north: &str, south: &str);
    /// Comma-joined arrival rows such as `"12,18,25"` or `"-,-,-"`.
    fn set_arrivals(&mut self, north: &str, south: &str);
}

/// Front-panel buttons.
pub trait InputSource {
    fn poll(&mut self) -> ButtonEdges;
}

/// The wireless coprocessor as seen from the main controller.
pub trait LinkClient {
    fn is_connected(&self) -> bool;
    fn reconnect(&mut self, credentials: &Credentials) -> Result<(), BoxError>;
    /// Power-cycle or reinitialize the coprocessor.
    fn hard_reset(&mut self) -> Result<(), BoxError>;
}

/// Wall-clock source that can be resynchronized over the network.
pub trait TimeSync {
    fn sync(&mut self) -> Result<(), BoxError>;
    /// Current local wall time, timezone-naive.
    fn now(&self) -> NaiveDateTime;
}

/// Full device reset. Real implementations do not return.
pub trait DeviceReset {
    fn reset(&mut self);
}

impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn fetch(&mut self, stop_id: &str) -> Result<StopArrivals, BoxError> {
        (**self).fetch(stop_id)
    }
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn show_logo(&mut self, logo: &str) {
        (**self).show_logo(logo);
    }
    fn set_labels(&mut self, north: &str, south: &str) {
        (**self).set_labels(north, south);
    }
    fn set_arrivals(&mut self, north: &str, south: &str) {
        (**self).set_arrivals(north, south);
    }
}

impl<T: InputSource + ?Sized> InputSource for Box<T> {
    fn poll(&mut self) -> ButtonEdges {
        (**self).poll()
    }
}

impl<T: LinkClient + ?Sized> LinkClient for Box<T> {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
    fn reconnect(&mut self, credentials: &Credentials) -> Result<(), BoxError> {
        (**self).reconnect(credentials)
    }
    fn hard_reset(&mut self) -> Result<(), BoxError> {
        (**self).hard_reset()
    }
}

impl<T: TimeSync + ?Sized> TimeSync for Box<T> {
    fn sync(&mut self) -> Result<(), BoxError> {
        (**self).sync()
    }
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

impl<T: DeviceReset + ?Sized> DeviceReset for Box<T> {
    fn reset(&mut self) {
        (**self).reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_hides_password() {
        let c = Credentials {
            ssid: "home".into(),
            password: "hunter2".into(),
        };
        let s = format!("{c:?}");
        assert!(s.contains("home"));
        assert!(!s.contains("hunter2"));
    }

    #[test]
    fn button_edges_any() {
        assert!(!ButtonEdges::NONE.any());
        assert!(
            ButtonEdges {
                up: false,
                down: true
            }
            .any()
        );
    }
}
