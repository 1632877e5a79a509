//! Seam to the native runtime.
//!
//! The library loader, the browser-process startup controller and the
//! command-line store live on the native side. This module describes the
//! narrow surface the shell consumes.

use common::{LibraryProcessType, StartupError};
use tokio::sync::mpsc::UnboundedSender;

pub use ui::NativeTabBridge;

/// Completion reported by the native runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativeSignal {
    Success,
    Failure,
}

/// Parameters of a browser-process startup request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StartupRequest {
    /// Process type the native side initializes as.
    pub process_type: LibraryProcessType,
    /// Launch the GPU process alongside the browser process.
    pub start_gpu_process: bool,
    /// Bring up only the minimal browser (no full UI services).
    pub start_minimal_browser: bool,
}

impl Default for StartupRequest {
    fn default() -> Self {
        Self {
            process_type: LibraryProcessType::Browser,
            start_gpu_process: true,
            start_minimal_browser: false,
        }
    }
}

/// Channel through which the native side reports startup completion.
///
/// Clones share the same channel. The native side may signal more than once;
/// the coordinator keeps only the first signal.
#[derive(Clone, Debug)]
pub struct StartupCompletion {
    tx: UnboundedSender<NativeSignal>,
}

impl StartupCompletion {
    pub(crate) fn new(tx: UnboundedSender<NativeSignal>) -> Self {
        Self { tx }
    }

    /// Report that the browser process started.
    pub fn succeed(&self) {
        self.signal(NativeSignal::Success);
    }

    /// Report that the browser process failed to start.
    pub fn fail(&self) {
        self.signal(NativeSignal::Failure);
    }

    pub fn signal(&self, signal: NativeSignal) {
        if self.tx.send(signal).is_err() {
            tracing::debug!(?signal, "startup coordinator gone, dropping signal");
        }
    }
}

/// Native library loader and startup controller.
pub trait NativeRuntime: Send + Sync {
    /// Load and initialize the native library. Synchronous.
    fn ensure_initialized(&self) -> Result<(), StartupError>;

    /// Tell the loader which kind of process is loading the library.
    fn set_library_process_type(&self, process_type: LibraryProcessType);

    /// Suffix of the private data directory.
    fn set_private_data_directory_suffix(&self, suffix: &str);

    /// Read the command-line file from private storage into the
    /// process-wide argument list.
    fn init_command_line(&self, file_name: &str);

    /// Whether the application's resources can be reached.
    fn resources_available(&self) -> bool;

    /// Start the browser process on a worker and report through `completion`.
    ///
    /// Must not block the caller.
    fn start_browser_processes_async(&self, request: StartupRequest, completion: StartupCompletion);
}
