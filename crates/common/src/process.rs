//! Process roles and process-wide state.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::OnceCell;

/// Separator between the package name and a secondary-process qualifier.
const PROCESS_QUALIFIER_SEPARATOR: char = ':';

/// Tag carried by privileged child processes.
const PRIVILEGED_PROCESS_TAG: &str = "privileged_process";

/// Tag carried by sandboxed child processes.
const SANDBOXED_PROCESS_TAG: &str = "sandboxed_process";

/// Role of the hosting process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProcessRole {
    /// Main process. The only role allowed to start the native runtime.
    Browser,
    /// Privileged child (GPU, network service).
    PrivilegedChild,
    /// Sandboxed child (renderer).
    SandboxedChild,
    /// Isolated service process.
    IsolatedChild,
}

/// Process type reported to the native library loader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LibraryProcessType {
    Browser,
    Child,
}

impl ProcessRole {
    /// Classify a process from its name.
    ///
    /// Names without a qualifier belong to the browser process. Qualified
    /// names are matched against the known child tags and default to an
    /// isolated service otherwise.
    pub fn classify(process_name: &str) -> Self {
        if !process_name.contains(PROCESS_QUALIFIER_SEPARATOR) {
            return Self::Browser;
        }
        if process_name.contains(PRIVILEGED_PROCESS_TAG) {
            Self::PrivilegedChild
        } else if process_name.contains(SANDBOXED_PROCESS_TAG) {
            Self::SandboxedChild
        } else {
            Self::IsolatedChild
        }
    }

    /// Check if this is the browser process.
    pub fn is_browser(&self) -> bool {
        matches!(self, Self::Browser)
    }

    /// The library process type to assign at bootstrap, if any.
    ///
    /// Privileged and sandboxed children get theirs from the spawning process
    /// when they are bound, so nothing is assigned here.
    pub fn library_process_type(&self) -> Option<LibraryProcessType> {
        match self {
            Self::Browser => Some(LibraryProcessType::Browser),
            Self::IsolatedChild => Some(LibraryProcessType::Child),
            Self::PrivilegedChild | Self::SandboxedChild => None,
        }
    }
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Browser => "browser",
            Self::PrivilegedChild => "privileged-child",
            Self::SandboxedChild => "sandboxed-child",
            Self::IsolatedChild => "isolated-child",
        };
        f.write_str(name)
    }
}

/// Process-scoped state shared by the bootstrap and failure paths.
///
/// Both fields are set at most once and never reset for the lifetime of the
/// process. Construct one per process and pass it around explicitly.
#[derive(Debug, Default)]
pub struct ProcessState {
    role: OnceCell<ProcessRole>,
    launch_failure_reported: AtomicBool,
}

impl ProcessState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the process role. Returns the role that is in effect, which is
    /// the first one recorded.
    pub fn init_role(&self, role: ProcessRole) -> ProcessRole {
        let current = *self.role.get_or_init(|| role);
        if current != role {
            tracing::warn!(%current, ignored = %role, "process role already initialized");
        }
        current
    }

    /// The recorded role, if bootstrap has run.
    pub fn role(&self) -> Option<ProcessRole> {
        self.role.get().copied()
    }

    /// Mark the launch failure as reported.
    ///
    /// Returns `true` only for the first caller in this process.
    pub fn claim_launch_failure_report(&self) -> bool {
        !self.launch_failure_reported.swap(true, Ordering::AcqRel)
    }

    /// Check if a launch failure was already reported.
    pub fn launch_failure_reported(&self) -> bool {
        self.launch_failure_reported.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unqualified_name_is_browser() {
        assert_eq!(ProcessRole::classify("foo"), ProcessRole::Browser);
        assert_eq!(ProcessRole::classify("org.oxide.shell"), ProcessRole::Browser);
    }

    #[test]
    fn test_child_tags() {
        assert_eq!(
            ProcessRole::classify("foo:sandboxed_process0"),
            ProcessRole::SandboxedChild
        );
        assert_eq!(
            ProcessRole::classify("foo:privileged_process1"),
            ProcessRole::PrivilegedChild
        );
        assert_eq!(
            ProcessRole::classify("foo:isolated_svc3"),
            ProcessRole::IsolatedChild
        );
    }

    #[test]
    fn test_only_isolated_child_gets_child_type() {
        assert_eq!(
            ProcessRole::IsolatedChild.library_process_type(),
            Some(LibraryProcessType::Child)
        );
        assert_eq!(ProcessRole::SandboxedChild.library_process_type(), None);
        assert_eq!(ProcessRole::PrivilegedChild.library_process_type(), None);
        assert_eq!(
            ProcessRole::Browser.library_process_type(),
            Some(LibraryProcessType::Browser)
        );
    }

    #[test]
    fn test_role_is_init_once() {
        let state = ProcessState::new();
        assert_eq!(state.role(), None);

        assert_eq!(state.init_role(ProcessRole::Browser), ProcessRole::Browser);
        assert_eq!(
            state.init_role(ProcessRole::SandboxedChild),
            ProcessRole::Browser
        );
        assert_eq!(state.role(), Some(ProcessRole::Browser));
    }

    #[test]
    fn test_launch_failure_claimed_once() {
        let state = ProcessState::new();
        assert!(!state.launch_failure_reported());

        assert!(state.claim_launch_failure_report());
        assert!(!state.claim_launch_failure_report());
        assert!(state.launch_failure_reported());
    }
}
