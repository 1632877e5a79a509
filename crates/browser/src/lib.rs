//! Oxide Shell - embedding glue for a native browser runtime.
//!
//! This crate sequences the managed side of an embedded browser:
//! - Process bootstrap and role classification
//! - One-shot browser-process startup
//! - Shell lifecycle and startup address selection
//! - Launch failure reporting
//! - Saved instance state

pub mod application;
pub mod config;
pub mod instance_state;
pub mod launch_failed;
pub mod runtime;
pub mod shell;
pub mod simulated;
pub mod startup;

pub use application::Application;
pub use config::ShellConfig;
pub use instance_state::{InstanceState, StateValue, ACTIVE_URL_KEY};
pub use launch_failed::{FailureStage, LaunchFailureReport};
pub use runtime::{NativeRuntime, NativeSignal, StartupCompletion, StartupRequest};
pub use shell::{resolve_startup_url, ShellController, ShellPhase, ShellPresenter, ShellServices};
pub use simulated::{NativeCall, SimulatedRuntime};
pub use startup::{
    StartDisposition, StartupCoordinator, StartupObserver, StartupOutcome, StartupState,
};

/// Shell version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
