//! Type-state builder for `Sign` and generic `build_controller` constructor.
//!
//! The builder enforces at compile time that the data source, display, link
//! client and time sync are provided before `build()` is available.
//! `try_build()` is always available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;

use trainsign_traits::clock::{Clock, MonotonicClock};
use trainsign_traits::{DataSource, DisplaySink, LinkClient, TimeSync};

use crate::config::{ResilienceCfg, TimingCfg};
use crate::controller::SignController;
use crate::error::{BuildError, Result};
use crate::lines::LineRegistry;
use crate::resilience::{CredentialSource, EnvCredentials, ResilienceManager};

/// Boxed, dynamically dispatched controller used by the CLI.
pub type Sign = SignController<
    Box<dyn DataSource>,
    Box<dyn DisplaySink>,
    Box<dyn LinkClient>,
    Box<dyn TimeSync>,
>;

impl Sign {
    /// Start building a boxed controller.
    pub fn builder() -> SignBuilder<Missing, Missing, Missing, Missing> {
        SignBuilder::default()
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Everything besides the four collaborators. All optional.
#[derive(Default)]
pub struct SignOptions {
    pub registry: Option<LineRegistry>,
    pub default_line: Option<String>,
    pub timing: Option<TimingCfg>,
    pub resilience: Option<ResilienceCfg>,
    pub credentials: Option<Box<dyn CredentialSource>>,
    pub clock: Option<Arc<dyn Clock + Send + Sync>>,
}

/// Builder for `Sign`. Everything is validated on `build()`.
pub struct SignBuilder<Src, Disp, Lnk, Tm> {
    source: Option<Box<dyn DataSource>>,
    display: Option<Box<dyn DisplaySink>>,
    link: Option<Box<dyn LinkClient>>,
    time: Option<Box<dyn TimeSync>>,
    opts: SignOptions,
    _marker: PhantomData<(Src, Disp, Lnk, Tm)>,
}

impl Default for SignBuilder<Missing, Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            source: None,
            display: None,
            link: None,
            time: None,
            opts: SignOptions::default(),
            _marker: PhantomData,
        }
    }
}

/// Validate options and assemble a controller in its initial state.
///
/// Shared by `SignBuilder::try_build()` and `build_controller()`.
fn validate_and_build<D, S, L, T>(
    source: D,
    display: S,
    link: L,
    time: T,
    opts: SignOptions,
) -> Result<SignController<D, S, L, T>>
where
    D: DataSource,
    S: DisplaySink,
    L: LinkClient,
    T: TimeSync,
{
    let timing = opts.timing.unwrap_or_default();
    if timing.poll.is_zero() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "poll interval must be > 0",
        )));
    }
    if timing.fetch_interval.is_zero() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "fetch interval must be > 0",
        )));
    }
    if timing.sync_interval.is_zero() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "sync interval must be > 0",
        )));
    }

    let registry = opts.registry.unwrap_or_default();
    let default_line = opts.default_line.unwrap_or_else(|| "L".to_string());
    let active = registry.lookup(&default_line)?.clone();

    let clock: Arc<dyn Clock + Send + Sync> = match opts.clock {
        Some(c) => c,
        None => Arc::new(MonotonicClock::new()),
    };
    let credentials = opts
        .credentials
        .unwrap_or_else(|| Box::new(EnvCredentials::default()));
    let resilience = ResilienceManager::new(
        opts.resilience.unwrap_or_default(),
        credentials,
        Arc::clone(&clock),
    );

    Ok(SignController::from_parts(
        source, display, link, time, registry, active, timing, resilience, clock,
    ))
}

impl<Src, Disp, Lnk, Tm> SignBuilder<Src, Disp, Lnk, Tm> {
    /// Fallible build available in any type-state; reports the first missing piece.
    pub fn try_build(self) -> Result<Sign> {
        let source = self
            .source
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSource))?;
        let display = self
            .display
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDisplay))?;
        let link = self
            .link
            .ok_or_else(|| eyre::Report::new(BuildError::MissingLink))?;
        let time = self
            .time
            .ok_or_else(|| eyre::Report::new(BuildError::MissingTimeSync))?;
        validate_and_build(source, display, link, time, self.opts)
    }

    fn retype<A, B, C, E>(self) -> SignBuilder<A, B, C, E> {
        SignBuilder {
            source: self.source,
            display: self.display,
            link: self.link,
            time: self.time,
            opts: self.opts,
            _marker: PhantomData,
        }
    }
}

/// Chainable setters that do not affect type-state.
impl<Src, Disp, Lnk, Tm> SignBuilder<Src, Disp, Lnk, Tm> {
    pub fn with_registry(mut self, registry: LineRegistry) -> Self {
        self.opts.registry = Some(registry);
        self
    }
    pub fn with_default_line(mut self, id: impl Into<String>) -> Self {
        self.opts.default_line = Some(id.into());
        self
    }
    pub fn with_timing(mut self, timing: TimingCfg) -> Self {
        self.opts.timing = Some(timing);
        self
    }
    pub fn with_resilience(mut self, resilience: ResilienceCfg) -> Self {
        self.opts.resilience = Some(resilience);
        self
    }
    /// Defaults to `EnvCredentials::default()`.
    pub fn with_credentials(mut self, credentials: impl CredentialSource + 'static) -> Self {
        self.opts.credentials = Some(Box::new(credentials));
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.opts.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<Disp, Lnk, Tm> SignBuilder<Missing, Disp, Lnk, Tm> {
    pub fn with_source(
        mut self,
        source: impl DataSource + 'static,
    ) -> SignBuilder<Set, Disp, Lnk, Tm> {
        self.source = Some(Box::new(source));
        self.retype()
    }
}

impl<Src, Lnk, Tm> SignBuilder<Src, Missing, Lnk, Tm> {
    pub fn with_display(
        mut self,
        display: impl DisplaySink + 'static,
    ) -> SignBuilder<Src, Set, Lnk, Tm> {
        self.display = Some(Box::new(display));
        self.retype()
    }
}

impl<Src, Disp, Tm> SignBuilder<Src, Disp, Missing, Tm> {
    pub fn with_link(mut self, link: impl LinkClient + 'static) -> SignBuilder<Src, Disp, Set, Tm> {
        self.link = Some(Box::new(link));
        self.retype()
    }
}

impl<Src, Disp, Lnk> SignBuilder<Src, Disp, Lnk, Missing> {
    pub fn with_time_sync(
        mut self,
        time: impl TimeSync + 'static,
    ) -> SignBuilder<Src, Disp, Lnk, Set> {
        self.time = Some(Box::new(time));
        self.retype()
    }
}

impl SignBuilder<Set, Set, Set, Set> {
    /// Validate and build. Only available once all four collaborators are set.
    pub fn build(self) -> Result<Sign> {
        self.try_build()
    }
}

/// Build a statically dispatched controller from concrete collaborators.
///
/// Delegates to the same validation as the builder.
pub fn build_controller<D, S, L, T>(
    source: D,
    display: S,
    link: L,
    time: T,
    opts: SignOptions,
) -> Result<SignController<D, S, L, T>>
where
    D: DataSource,
    S: DisplaySink,
    L: LinkClient,
    T: TimeSync,
{
    validate_and_build(source, display, link, time, opts)
}
