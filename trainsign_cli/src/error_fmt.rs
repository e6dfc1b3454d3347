//! Human-readable error descriptions and structured JSON error formatting.

use trainsign_core::{BuildError, ErrorCategory, SignError};

pub const EXIT_OTHER: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_UNKNOWN_LINE: i32 = 3;
pub const EXIT_FEED: i32 = 4;
pub use trainsign_hardware::RESET_EXIT_CODE as EXIT_RESET;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: A zero or out-of-range value in [timing].\nHow to fix: Edit the config file, then rerun."
            ),
            other => format!(
                "What happened: The sign could not be assembled ({other}).\nLikely causes: A collaborator failed to initialize.\nHow to fix: Re-run with --log-level=debug for details."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<SignError>() {
        return match se {
            SignError::UnknownLine(id) => format!(
                "What happened: Line {id:?} is not configured.\nLikely causes: A typo in --line, default_line or [buttons].\nHow to fix: Run `trainsign lines` to see the configured ids."
            ),
            SignError::Config(msg) => format!(
                "What happened: Configuration is invalid ({msg}).\nLikely causes: A missing or malformed value in the TOML, or an unset environment variable.\nHow to fix: Fix the named key and rerun `trainsign self-check`."
            ),
            SignError::Timeout => "What happened: The arrivals feed did not answer in time.\nLikely causes: Slow or missing network, or source.timeout_ms set too low.\nHow to fix: Check connectivity or raise source.timeout_ms.".to_string(),
            SignError::Link(msg) => format!(
                "What happened: The network link is down ({msg}).\nLikely causes: No connectivity or wrong wireless credentials.\nHow to fix: Check the network and the variables named in [wifi]."
            ),
            SignError::DeviceResetRequired(n) => format!(
                "What happened: {n} consecutive refreshes failed and the device reset was requested.\nLikely causes: Feed outage or a dead link.\nHow to fix: The supervisor should restart the sign; check the logs for the failing step."
            ),
            other => match other.category() {
                ErrorCategory::Feed => format!(
                    "What happened: The arrivals feed returned data we cannot read ({other}).\nLikely causes: The API changed shape or returned an error page.\nHow to fix: Check source.base_url; re-run with --log-level=debug."
                ),
                _ => format!(
                    "What happened: {other}.\nLikely causes: Transient network trouble.\nHow to fix: Retry; re-run with --log-level=debug for more detail."
                ),
            },
        };
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: config 2, unknown line 3, feed or network 4, reset 75, other 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(_) => EXIT_CONFIG,
            _ => EXIT_OTHER,
        };
    }
    if let Some(se) = err.downcast_ref::<SignError>() {
        return match se {
            SignError::UnknownLine(_) => EXIT_UNKNOWN_LINE,
            SignError::DeviceResetRequired(_) => EXIT_RESET,
            other => match other.category() {
                ErrorCategory::Config => EXIT_CONFIG,
                ErrorCategory::Feed | ErrorCategory::Transient => EXIT_FEED,
                ErrorCategory::Terminal => EXIT_RESET,
            },
        };
    }
    EXIT_OTHER
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    match err.downcast_ref::<SignError>() {
        Some(SignError::Parse { .. }) => "Parse",
        Some(SignError::UnknownLine(_)) => "UnknownLine",
        Some(SignError::Transport(_)) => "Transport",
        Some(SignError::Timeout) => "Timeout",
        Some(SignError::MalformedResponse(_)) => "MalformedResponse",
        Some(SignError::Link(_)) => "Link",
        Some(SignError::ClockSync(_)) => "ClockSync",
        Some(SignError::DeviceResetRequired(_)) => "DeviceResetRequired",
        Some(SignError::Config(_)) => "Config",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
