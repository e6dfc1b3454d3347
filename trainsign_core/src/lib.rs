#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core sign logic (hardware-agnostic).
//!
//! Everything that touches the network, the panel, the radio or the wall clock
//! goes through the traits in `trainsign_traits`.
//!
//! ## Architecture
//!
//! - **Arrivals**: timestamp parsing and minute offsets (`arrival`, `filter`)
//! - **Lines**: the registry of selectable lines (`lines`)
//! - **Control**: the sign state machine (`SignController`)
//! - **Recovery**: escalating reconnect / reset policy (`resilience`)
//! - **Loop**: button polling and pacing (`runner`)
//!
//! Minute offsets round half to even, so a train exactly 90 s away shows `2`
//! and one 30 s away shows `0`.

pub mod arrival;
pub mod builder;
pub mod config;
pub mod controller;
mod conversions;
pub mod error;
pub mod filter;
pub mod hw_error;
pub mod lines;
pub mod mocks;
pub mod resilience;
pub mod runner;
pub mod status;

pub use arrival::{ArrivalOffset, minutes_until, parse_timestamp};
pub use builder::{Missing, Set, Sign, SignBuilder, SignOptions, build_controller};
pub use config::{ButtonMap, ResilienceCfg, TimingCfg};
pub use controller::{SignController, SignState};
pub use error::{BuildError, ErrorCategory, Result, SignError};
pub use filter::{ArrivalTriple, EMPTY_SLOT, Slot, filter_upcoming, to_triple};
pub use lines::{LineDescriptor, LineRegistry};
pub use resilience::{CredentialSource, EnvCredentials, Recovery, ResilienceManager};
pub use runner::{RunExit, RunParams, run};
pub use status::TickStatus;
