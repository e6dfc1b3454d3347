use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignError {
    #[error("invalid timestamp {input:?}: {reason}")]
    Parse { input: String, reason: String },
    #[error("unknown line: {0}")]
    UnknownLine(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("timeout waiting for data source")]
    Timeout,
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("link error: {0}")]
    Link(String),
    #[error("clock sync failed: {0}")]
    ClockSync(String),
    #[error("device reset required after {0} consecutive failures")]
    DeviceResetRequired(u32),
    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse classification used for logging and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The feed delivered something we cannot interpret.
    Feed,
    /// Network, timeout or link trouble; retried on the next interval.
    Transient,
    /// Programmer or configuration error; fails fast.
    Config,
    /// Escalation to a full device reset.
    Terminal,
}

impl SignError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SignError::Parse { .. } | SignError::MalformedResponse(_) => ErrorCategory::Feed,
            SignError::Transport(_)
            | SignError::Timeout
            | SignError::Link(_)
            | SignError::ClockSync(_) => ErrorCategory::Transient,
            SignError::UnknownLine(_) | SignError::Config(_) => ErrorCategory::Config,
            SignError::DeviceResetRequired(_) => ErrorCategory::Terminal,
        }
    }

    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        SignError::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing data source")]
    MissingSource,
    #[error("missing display")]
    MissingDisplay,
    #[error("missing link client")]
    MissingLink,
    #[error("missing time sync")]
    MissingTimeSync,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
