#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the arrival sign.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section is optional; an empty file reproduces the reference
//!   two-line sign (L at Graham Av, G at Metro Av).
use serde::Deserialize;
use std::collections::HashSet;

/// One entry of the `[[lines]]` registry.
///
/// Example:
/// [[lines]]
/// id = "L"
/// stop_id = "L11"
/// station = "L-Graham Av"
/// north = "Manhattan"
/// south = "Canarsie"
/// logo = "l-dashboard.bmp"
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LineEntry {
    pub id: String,
    pub stop_id: String,
    #[serde(default)]
    pub station: String,
    pub north: String,
    pub south: String,
    pub logo: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Buttons {
    /// Line selected by the "up" button; wins when both fire in one poll.
    pub up: String,
    /// Line selected by the "down" button.
    pub down: String,
}

impl Default for Buttons {
    fn default() -> Self {
        Self {
            up: "L".into(),
            down: "G".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Input poll quantum (ms); keeps button response snappy.
    pub poll_ms: u64,
    /// Feed refresh interval (s). The upstream feed updates about every 30 s.
    pub fetch_interval_s: u64,
    /// Wall-clock resync interval (s).
    pub sync_interval_s: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_ms: 100,
            fetch_interval_s: 30,
            sync_interval_s: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Resilience {
    /// Consecutive failures tolerated before a full device reset.
    pub error_reset_threshold: u32,
    /// Wait after a coprocessor reset before reconnecting (ms).
    pub settle_ms: u64,
}

impl Default for Resilience {
    fn default() -> Self {
        Self {
            error_reset_threshold: 3,
            settle_ms: 2000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Source {
    /// Base URL of the arrivals API; requests go to `{base_url}/by-id/{stop_id}`.
    pub base_url: String,
    /// Per-request timeout (ms).
    pub timeout_ms: u64,
}

impl Default for Source {
    fn default() -> Self {
        Self {
            base_url: "https://api.wheresthefuckingtrain.com".into(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Wifi {
    /// Environment variable holding the SSID.
    pub ssid_env: String,
    /// Environment variable holding the passphrase.
    pub password_env: String,
}

impl Default for Wifi {
    fn default() -> Self {
        Self {
            ssid_env: "CIRCUITPY_WIFI_SSID".into(),
            password_env: "CIRCUITPY_WIFI_PASSWORD".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Input {
    /// Consecutive identical samples required before a level change counts.
    pub debounce_samples: u8,
    /// BCM pin for the "up" button (active low, internal pull-up).
    pub up_pin: Option<u8>,
    /// BCM pin for the "down" button (active low, internal pull-up).
    pub down_pin: Option<u8>,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            debounce_samples: 3,
            up_pin: None,
            down_pin: None,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Line shown at startup.
    pub default_line: String,
    pub lines: Vec<LineEntry>,
    pub buttons: Buttons,
    pub timing: Timing,
    pub resilience: Resilience,
    pub source: Source,
    pub wifi: Wifi,
    pub input: Input,
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_line: "L".into(),
            lines: default_lines(),
            buttons: Buttons::default(),
            timing: Timing::default(),
            resilience: Resilience::default(),
            source: Source::default(),
            wifi: Wifi::default(),
            input: Input::default(),
            logging: Logging::default(),
        }
    }
}

/// The two stations of the reference sign.
pub fn default_lines() -> Vec<LineEntry> {
    vec![
        LineEntry {
            id: "L".into(),
            stop_id: "L11".into(),
            station: "L-Graham Av".into(),
            north: "Manhattan".into(),
            south: "Canarsie".into(),
            logo: "l-dashboard.bmp".into(),
        },
        LineEntry {
            id: "G".into(),
            stop_id: "G29".into(),
            station: "G-Metro Av".into(),
            north: "Queens".into(),
            south: "Church Av".into(),
            logo: "g-dashboard.bmp".into(),
        },
    ]
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {}", path.display(), e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn line(&self, id: &str) -> Option<&LineEntry> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // Lines
        if self.lines.is_empty() {
            eyre::bail!("lines must contain at least one entry");
        }
        let mut seen = HashSet::new();
        for (idx, line) in self.lines.iter().enumerate() {
            if line.id.trim().is_empty() {
                eyre::bail!("lines[{idx}].id must not be empty");
            }
            if line.stop_id.trim().is_empty() {
                eyre::bail!("lines[{idx}].stop_id must not be empty");
            }
            if line.logo.trim().is_empty() {
                eyre::bail!("lines[{idx}].logo must not be empty");
            }
            if !seen.insert(line.id.as_str()) {
                eyre::bail!("lines contains duplicate id {:?}", line.id);
            }
        }
        if self.line(&self.default_line).is_none() {
            eyre::bail!("default_line {:?} is not a configured line", self.default_line);
        }

        // Buttons
        if self.line(&self.buttons.up).is_none() {
            eyre::bail!("buttons.up {:?} is not a configured line", self.buttons.up);
        }
        if self.line(&self.buttons.down).is_none() {
            eyre::bail!(
                "buttons.down {:?} is not a configured line",
                self.buttons.down
            );
        }

        // Timing
        if self.timing.poll_ms == 0 {
            eyre::bail!("timing.poll_ms must be >= 1");
        }
        if self.timing.poll_ms > 1000 {
            eyre::bail!("timing.poll_ms must be <= 1000 to keep buttons responsive");
        }
        if self.timing.fetch_interval_s == 0 {
            eyre::bail!("timing.fetch_interval_s must be >= 1");
        }
        if self.timing.sync_interval_s == 0 {
            eyre::bail!("timing.sync_interval_s must be >= 1");
        }
        if self.timing.fetch_interval_s > 24 * 60 * 60 || self.timing.sync_interval_s > 24 * 60 * 60
        {
            eyre::bail!("timing intervals are unreasonably large (>24h)");
        }

        // Resilience
        if self.resilience.settle_ms > 60_000 {
            eyre::bail!("resilience.settle_ms is unreasonably large (>60s)");
        }

        // Source
        let url = self.source.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            eyre::bail!("source.base_url must start with http:// or https://");
        }
        if self.source.timeout_ms == 0 {
            eyre::bail!("source.timeout_ms must be >= 1");
        }

        // Wifi
        if self.wifi.ssid_env.trim().is_empty() || self.wifi.password_env.trim().is_empty() {
            eyre::bail!("wifi.ssid_env and wifi.password_env must name environment variables");
        }

        // Input
        if self.input.debounce_samples == 0 {
            eyre::bail!("input.debounce_samples must be >= 1");
        }
        if let (Some(up), Some(down)) = (self.input.up_pin, self.input.down_pin)
            && up == down
        {
            eyre::bail!("input.up_pin and input.down_pin must differ");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
