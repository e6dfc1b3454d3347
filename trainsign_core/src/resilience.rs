//! Escalating recovery after a failed sync or fetch.
//!
//! Order of escalation, cheapest first:
//! 1. link still up: nothing to do, the next interval retries
//! 2. link down: reconnect with fresh credentials
//! 3. reconnect failed: hard-reset the coprocessor, settle, reconnect once more
//! 4. too many consecutive failures: full device reset
//!
//! Failures inside 2 and 3 are logged and swallowed; they only show up again
//! through the next tick's error counter.

use std::sync::Arc;

use trainsign_traits::{Clock, Credentials, LinkClient};

use crate::config::ResilienceCfg;
use crate::error::SignError;
use crate::hw_error::map_link_error;

/// Where wireless credentials come from. Consulted on every recovery.
pub trait CredentialSource {
    fn credentials(&self) -> Result<Credentials, SignError>;
}

impl<F> CredentialSource for F
where
    F: Fn() -> Result<Credentials, SignError>,
{
    fn credentials(&self) -> Result<Credentials, SignError> {
        self()
    }
}

/// Credentials read from two environment variables.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    pub ssid_var: String,
    pub password_var: String,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self {
            ssid_var: "CIRCUITPY_WIFI_SSID".into(),
            password_var: "CIRCUITPY_WIFI_PASSWORD".into(),
        }
    }
}

impl CredentialSource for EnvCredentials {
    fn credentials(&self) -> Result<Credentials, SignError> {
        let read = |var: &str| {
            std::env::var(var).map_err(|e| SignError::Config(format!("{var}: {e}")))
        };
        Ok(Credentials {
            ssid: read(&self.ssid_var)?,
            password: read(&self.password_var)?,
        })
    }
}

/// Outcome of one `handle_failure` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Link was up; the failure was above the link layer.
    LinkHealthy,
    /// First reconnect attempt succeeded.
    Reconnected,
    /// Reconnect succeeded after a coprocessor reset.
    ReconnectedAfterReset,
    /// Both attempts failed (or no credentials); left to the next tick.
    ReconnectFailed,
    /// Error budget exhausted; the device must restart.
    DeviceReset,
}

pub struct ResilienceManager {
    cfg: ResilienceCfg,
    credentials: Box<dyn CredentialSource>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl core::fmt::Debug for ResilienceManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResilienceManager")
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

impl ResilienceManager {
    pub fn new(
        cfg: ResilienceCfg,
        credentials: Box<dyn CredentialSource>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            cfg,
            credentials,
            clock,
        }
    }

    pub fn cfg(&self) -> &ResilienceCfg {
        &self.cfg
    }

    /// Decide and perform recovery for the `error_counter`-th consecutive failure.
    pub fn handle_failure<L: LinkClient + ?Sized>(
        &self,
        error_counter: u32,
        link: &mut L,
    ) -> Recovery {
        if error_counter > self.cfg.error_reset_threshold {
            tracing::error!(
                errors = error_counter,
                threshold = self.cfg.error_reset_threshold,
                "error budget exhausted, device reset"
            );
            return Recovery::DeviceReset;
        }
        // One probe per failure: on a host link this is a blocking connect.
        let link_connected = link.is_connected();
        if link_connected {
            tracing::debug!(errors = error_counter, link_connected, "link up, failure was transient");
            return Recovery::LinkHealthy;
        }

        let creds = match self.credentials.credentials() {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "no wireless credentials, cannot reconnect");
                return Recovery::ReconnectFailed;
            }
        };

        tracing::info!(ssid = %creds.ssid, link_connected, "link down, reconnecting");
        let Err(first) = Self::reconnect(link, &creds) else {
            tracing::info!("reconnect ok");
            return Recovery::Reconnected;
        };
        tracing::warn!(error = %first, "reconnect failed, resetting coprocessor");

        let retry = link
            .hard_reset()
            .map_err(|e| map_link_error(&*e))
            .and_then(|()| {
                self.clock.sleep(self.cfg.settle);
                Self::reconnect(link, &creds)
            });
        match retry {
            Ok(()) => {
                tracing::info!("reconnect ok after coprocessor reset");
                Recovery::ReconnectedAfterReset
            }
            Err(e) => {
                tracing::error!(error = %e, "coprocessor reset did not restore link");
                Recovery::ReconnectFailed
            }
        }
    }

    fn reconnect<L: LinkClient + ?Sized>(
        link: &mut L,
        creds: &Credentials,
    ) -> Result<(), SignError> {
        link.reconnect(creds).map_err(|e| map_link_error(&*e))
    }
}
