//! In-process stand-in for the native runtime.
//!
//! Used by the `oxide-shell` binary and by tests. Startup runs on a worker
//! thread when a delay is configured and inline otherwise; either way the
//! completion goes through the coordinator's channel.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

use common::{LibraryProcessType, NativeHandle, StartupError};
use parking_lot::{Mutex, RwLock};
use ui::{ContentSurface, SurfaceId, Tab, TabId};
use url::Url;

use crate::runtime::{
    NativeRuntime, NativeSignal, NativeTabBridge, StartupCompletion, StartupRequest,
};

/// First handle value handed out. Step keeps values pointer-aligned.
const FIRST_HANDLE: usize = 0x1000;
const HANDLE_STEP: usize = 0x10;

/// A call the managed side made into the simulated runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NativeCall {
    InitTab(TabId, NativeHandle),
    LoadUrl(NativeHandle, Url),
    AttachSurface(NativeHandle, SurfaceId),
    DestroyTab(NativeHandle),
}

/// Simulated native runtime and tab bridge.
pub struct SimulatedRuntime {
    outcome: NativeSignal,
    delay: Option<Duration>,
    redeliveries: usize,
    library_loads: bool,
    resources_available: bool,
    command_line_dir: Option<PathBuf>,
    process_type: Mutex<Option<LibraryProcessType>>,
    data_directory_suffix: Mutex<Option<String>>,
    command_line: RwLock<Vec<String>>,
    startup_requests: Mutex<Vec<StartupRequest>>,
    next_handle: AtomicUsize,
    tabs: Mutex<HashMap<NativeHandle, Weak<Tab>>>,
    calls: Mutex<Vec<NativeCall>>,
}

impl SimulatedRuntime {
    /// Runtime that starts successfully and signals inline.
    pub fn new() -> Self {
        Self {
            outcome: NativeSignal::Success,
            delay: None,
            redeliveries: 0,
            library_loads: true,
            resources_available: true,
            command_line_dir: None,
            process_type: Mutex::new(None),
            data_directory_suffix: Mutex::new(None),
            command_line: RwLock::new(Vec::new()),
            startup_requests: Mutex::new(Vec::new()),
            next_handle: AtomicUsize::new(FIRST_HANDLE),
            tabs: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Set the startup outcome.
    pub fn with_outcome(mut self, outcome: NativeSignal) -> Self {
        self.outcome = outcome;
        self
    }

    /// Report from a worker thread after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Send the completion signal `count` extra times.
    pub fn with_redeliveries(mut self, count: usize) -> Self {
        self.redeliveries = count;
        self
    }

    /// Make `ensure_initialized` fail.
    pub fn with_library_load_failure(mut self) -> Self {
        self.library_loads = false;
        self
    }

    /// Make the application resources unreachable.
    pub fn with_missing_resources(mut self) -> Self {
        self.resources_available = false;
        self
    }

    /// Directory holding the command-line file.
    pub fn with_command_line_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.command_line_dir = Some(dir.into());
        self
    }

    pub fn process_type(&self) -> Option<LibraryProcessType> {
        *self.process_type.lock()
    }

    pub fn data_directory_suffix(&self) -> Option<String> {
        self.data_directory_suffix.lock().clone()
    }

    /// Arguments ingested from the command-line file.
    pub fn command_line(&self) -> Vec<String> {
        self.command_line.read().clone()
    }

    pub fn startup_requests(&self) -> Vec<StartupRequest> {
        self.startup_requests.lock().clone()
    }

    /// Calls made through the tab bridge, in order.
    pub fn calls(&self) -> Vec<NativeCall> {
        self.calls.lock().clone()
    }

    /// Number of native tab counterparts alive.
    pub fn live_tabs(&self) -> usize {
        self.tabs.lock().len()
    }

    fn allocate_handle(&self) -> NativeHandle {
        let raw = self.next_handle.fetch_add(HANDLE_STEP, Ordering::Relaxed);
        NativeHandle::from_raw(raw).unwrap_or_else(|| unreachable!("handles start above zero"))
    }

    fn record(&self, call: NativeCall) {
        tracing::trace!(?call, "native call");
        self.calls.lock().push(call);
    }
}

impl Default for SimulatedRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeRuntime for SimulatedRuntime {
    fn ensure_initialized(&self) -> Result<(), StartupError> {
        if self.library_loads {
            Ok(())
        } else {
            Err(StartupError::runtime("native library could not be loaded"))
        }
    }

    fn set_library_process_type(&self, process_type: LibraryProcessType) {
        *self.process_type.lock() = Some(process_type);
    }

    fn set_private_data_directory_suffix(&self, suffix: &str) {
        *self.data_directory_suffix.lock() = Some(suffix.to_string());
    }

    fn init_command_line(&self, file_name: &str) {
        let Some(dir) = &self.command_line_dir else {
            return;
        };
        let path = dir.join(file_name);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let args: Vec<String> = contents.split_whitespace().map(String::from).collect();
                tracing::info!(path = %path.display(), count = args.len(), "command line ingested");
                *self.command_line.write() = args;
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "no command-line file");
            }
        }
    }

    fn resources_available(&self) -> bool {
        self.resources_available
    }

    fn start_browser_processes_async(&self, request: StartupRequest, completion: StartupCompletion) {
        self.startup_requests.lock().push(request);
        let outcome = self.outcome;
        let deliveries = 1 + self.redeliveries;
        let report = move || {
            for _ in 0..deliveries {
                completion.signal(outcome);
            }
        };

        match self.delay {
            Some(delay) => {
                thread::spawn(move || {
                    thread::sleep(delay);
                    report();
                });
            }
            None => report(),
        }
    }
}

impl NativeTabBridge for SimulatedRuntime {
    fn init_tab(&self, tab: &Arc<Tab>, id: TabId) {
        let handle = self.allocate_handle();
        self.record(NativeCall::InitTab(id, handle));
        self.tabs.lock().insert(handle, Arc::downgrade(tab));
        if tab.set_native_ptr(handle.as_raw()).is_err() {
            self.tabs.lock().remove(&handle);
        }
    }

    fn load_url(&self, handle: NativeHandle, url: &Url) {
        self.record(NativeCall::LoadUrl(handle, url.clone()));
    }

    fn attach_surface(&self, handle: NativeHandle, surface: &ContentSurface) {
        self.record(NativeCall::AttachSurface(handle, surface.id()));
    }

    fn destroy_tab(&self, handle: NativeHandle) {
        self.record(NativeCall::DestroyTab(handle));
        let tab = self.tabs.lock().remove(&handle);
        if let Some(tab) = tab.and_then(|weak| weak.upgrade()) {
            if let Err(err) = tab.clear_native_ptr() {
                tracing::warn!(tab = %tab.id(), %handle, error = %err, "counterpart clear refused");
            }
        }
    }
}
