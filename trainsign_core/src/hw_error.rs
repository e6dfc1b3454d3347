//! Maps `Box<dyn Error>` from trait boundaries to typed `SignError`.
//!
//! The traits in `trainsign_traits` use `Box<dyn Error + Send + Sync>` so any
//! transport or radio driver can plug in; this module converts those to our
//! typed error enum, with an optional feature-gated path for
//! `trainsign_hardware::HwError` downcasting.

use crate::error::SignError;

#[cfg(feature = "hardware-errors")]
fn map_known(e: &(dyn std::error::Error + 'static)) -> Option<SignError> {
    use trainsign_hardware::error::HwError;
    let hw = e.downcast_ref::<HwError>()?;
    Some(match hw {
        HwError::Timeout => SignError::Timeout,
        HwError::Malformed(msg) => SignError::MalformedResponse(msg.clone()),
        HwError::Status(code) => SignError::Transport(format!("http status {code}")),
        HwError::Link(msg) => SignError::Link(msg.clone()),
        other => SignError::Transport(other.to_string()),
    })
}

#[cfg(not(feature = "hardware-errors"))]
fn map_known(_e: &(dyn std::error::Error + 'static)) -> Option<SignError> {
    None
}

#[inline]
fn looks_like_timeout(s: &str) -> bool {
    let lower = s.to_lowercase();
    lower.contains("timeout") || lower.contains("timed out")
}

/// Map a data-source error. Unknown errors become `Transport`.
pub fn map_source_error(e: &(dyn std::error::Error + 'static)) -> SignError {
    if let Some(mapped) = map_known(e) {
        return mapped;
    }
    let s = e.to_string();
    if looks_like_timeout(&s) {
        SignError::Timeout
    } else {
        SignError::Transport(s)
    }
}

/// Map a link-client error. Everything is a `Link` error except timeouts.
pub fn map_link_error(e: &(dyn std::error::Error + 'static)) -> SignError {
    match map_known(e) {
        Some(SignError::Timeout) => SignError::Timeout,
        Some(SignError::Link(msg)) => SignError::Link(msg),
        Some(other) => SignError::Link(other.to_string()),
        None => SignError::Link(e.to_string()),
    }
}

/// Map a time-sync error.
pub fn map_sync_error(e: &(dyn std::error::Error + 'static)) -> SignError {
    match map_known(e) {
        Some(SignError::Timeout) => SignError::Timeout,
        Some(other) => SignError::ClockSync(other.to_string()),
        None => {
            let s = e.to_string();
            if looks_like_timeout(&s) {
                SignError::Timeout
            } else {
                SignError::ClockSync(s)
            }
        }
    }
}
