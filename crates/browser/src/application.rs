//! Process bootstrap.
//!
//! Runs once when a process of the application starts, before any shell is
//! created. Every process classifies itself; only the browser process does
//! the browser-specific setup.

use std::sync::Arc;

use common::{AppError, EmbedResult, ProcessRole, ProcessState};

use crate::config::ShellConfig;
use crate::runtime::NativeRuntime;

/// A bootstrapped application process.
#[derive(Debug)]
pub struct Application {
    process_name: String,
    role: ProcessRole,
    process: Arc<ProcessState>,
}

impl Application {
    /// Classify `process_name` and prepare the native runtime for it.
    ///
    /// Fails with [`AppError::StaleApplication`] when the browser process
    /// cannot reach its resources, which happens when the application was
    /// replaced underneath a running process.
    pub fn attach(
        process_name: &str,
        config: &ShellConfig,
        runtime: &dyn NativeRuntime,
        process: Arc<ProcessState>,
    ) -> EmbedResult<Self> {
        let role = process.init_role(ProcessRole::classify(process_name));
        tracing::info!(process = process_name, %role, "attaching application");

        if let Some(process_type) = role.library_process_type() {
            runtime.set_library_process_type(process_type);
        }

        if role.is_browser() {
            if !runtime.resources_available() {
                tracing::error!(process = process_name, "application resources unavailable");
                return Err(AppError::stale(
                    "application resources are unreachable, restart required",
                ));
            }
            runtime.set_private_data_directory_suffix(&config.private_data_directory_suffix);
            runtime.init_command_line(&config.command_line_file);
        }

        Ok(Self {
            process_name: process_name.to_string(),
            role,
            process,
        })
    }

    pub fn role(&self) -> ProcessRole {
        self.role
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    /// Process-wide state shared with every shell in this process.
    pub fn process_state(&self) -> &Arc<ProcessState> {
        &self.process
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::SimulatedRuntime;
    use common::LibraryProcessType;

    #[test]
    fn test_browser_bootstrap() {
        let runtime = SimulatedRuntime::new();
        let config = ShellConfig::default();
        let app = Application::attach(
            "org.oxide.shell",
            &config,
            &runtime,
            Arc::new(ProcessState::new()),
        )
        .unwrap();

        assert_eq!(app.role(), ProcessRole::Browser);
        assert_eq!(app.process_state().role(), Some(ProcessRole::Browser));
        assert_eq!(runtime.process_type(), Some(LibraryProcessType::Browser));
        assert_eq!(
            runtime.data_directory_suffix().as_deref(),
            Some(config.private_data_directory_suffix.as_str())
        );
    }

    #[test]
    fn test_child_bootstrap_skips_browser_setup() {
        let runtime = SimulatedRuntime::new();
        let app = Application::attach(
            "org.oxide.shell:sandboxed_process3",
            &ShellConfig::default(),
            &runtime,
            Arc::new(ProcessState::new()),
        )
        .unwrap();

        assert_eq!(app.role(), ProcessRole::SandboxedChild);
        assert!(runtime.process_type().is_none());
        assert!(runtime.data_directory_suffix().is_none());
    }

    #[test]
    fn test_isolated_child_sets_child_type() {
        let runtime = SimulatedRuntime::new();
        let app = Application::attach(
            "org.oxide.shell:isolated",
            &ShellConfig::default(),
            &runtime,
            Arc::new(ProcessState::new()),
        )
        .unwrap();

        assert_eq!(app.role(), ProcessRole::IsolatedChild);
        assert_eq!(runtime.process_type(), Some(LibraryProcessType::Child));
        assert!(runtime.data_directory_suffix().is_none());
    }

    #[test]
    fn test_stale_application() {
        let runtime = SimulatedRuntime::new().with_missing_resources();
        let result = Application::attach(
            "org.oxide.shell",
            &ShellConfig::default(),
            &runtime,
            Arc::new(ProcessState::new()),
        );

        assert!(matches!(result, Err(AppError::StaleApplication(_))));
        assert!(runtime.data_directory_suffix().is_none());
    }
}
