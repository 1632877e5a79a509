//! Common error types.

use thiserror::Error;

use crate::handle::NativeHandle;
use crate::process::ProcessRole;

/// Violations of the native/managed binding protocol.
///
/// These are programming errors. Callers on the native-facing side treat them
/// as fatal in debug builds and refuse the call in release builds.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
    #[error("native counterpart already bound to {current}, refusing {attempted}")]
    DoubleBind {
        current: NativeHandle,
        attempted: NativeHandle,
    },

    #[error("no native counterpart is bound")]
    Unbound,

    #[error("native side passed a null handle")]
    NullHandle,

    #[error("native counterpart {0} was destroyed without clearing its handle")]
    NotCleared(NativeHandle),

    #[error("native handle {handle} is already bound to tab {owner}")]
    HandleInUse { handle: NativeHandle, owner: u32 },
}

/// Errors raised while sequencing browser-process startup.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("only the browser process may start the native runtime (role: {0})")]
    NotBrowserProcess(ProcessRole),

    #[error("native runtime error: {0}")]
    Runtime(String),

    #[error("shell already failed or was torn down")]
    ShellClosed,

    #[error("invalid startup address {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Top-level application error.
#[derive(Error, Debug)]
pub enum AppError {
    /// The application image is inconsistent with the running process.
    /// The only safe response is to terminate.
    #[error("application out of date: {0}")]
    StaleApplication(String),

    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("instance state error: {0}")]
    State(#[from] serde_json::Error),
}

pub type EmbedResult<T> = Result<T, AppError>;

impl StartupError {
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}

impl AppError {
    pub fn stale(msg: impl Into<String>) -> Self {
        Self::StaleApplication(msg.into())
    }

    /// Whether the process must exit instead of continuing.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::StaleApplication(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_stale_application_is_fatal() {
        assert!(AppError::stale("resources moved").is_fatal());
        assert!(!AppError::from(StartupError::runtime("boom")).is_fatal());
    }

    #[test]
    fn test_bridge_error_converts_to_startup_error() {
        let err: StartupError = BridgeError::Unbound.into();
        assert!(matches!(err, StartupError::Bridge(BridgeError::Unbound)));
        assert_eq!(err.to_string(), "no native counterpart is bound");
    }
}
