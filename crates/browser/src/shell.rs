//! Shell controller.
//!
//! Drives browser-process startup, decides which address the first tab
//! loads, and handles the failure path. All methods run on the UI loop.

use std::sync::{Arc, Weak};

use common::{ProcessState, StartupError};
use parking_lot::Mutex;
use ui::notice::{self, Notice};
use ui::{
    ContentSurface, HandleLedger, RenderPreferenceProvider, SurfaceId, Tab, TabDelegate, TabModel,
};
use url::Url;

use crate::config::ShellConfig;
use crate::instance_state::{InstanceState, ACTIVE_URL_KEY};
use crate::launch_failed::{self, FailureStage, LaunchFailureReport};
use crate::runtime::{NativeRuntime, NativeTabBridge};
use crate::startup::{
    StartDisposition, StartupCoordinator, StartupObserver, StartupOutcome, StartupState,
};

/// Presentation layer the shell drives.
pub trait ShellPresenter: Send {
    /// Show a tab whose native counterpart is bound and navigating.
    fn attach_tab(&mut self, tab: &Arc<Tab>);

    /// Show a dismiss-only notice.
    fn show_notice(&mut self, notice: Notice);

    /// Deliver a launch-failure diagnostic report.
    fn report_diagnostic(&mut self, report: &LaunchFailureReport);

    /// Close the current UI flow.
    fn finish(&mut self);
}

/// Lifecycle of a shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellPhase {
    /// Constructed, startup not requested.
    Created,
    /// Waiting for the browser process.
    Starting,
    /// A tab is mounted.
    Running,
    /// Startup failed and the flow was closed.
    Failed,
    /// Torn down. Late callbacks are ignored.
    Finished,
}

/// Process-scoped services a shell needs.
///
/// Build one per process and clone it into every shell, so that startup runs
/// once and handle exclusivity holds across shells.
#[derive(Clone)]
pub struct ShellServices {
    pub runtime: Arc<dyn NativeRuntime>,
    pub bridge: Arc<dyn NativeTabBridge>,
    pub process: Arc<ProcessState>,
    pub startup: Arc<StartupCoordinator>,
    pub ledger: Arc<HandleLedger>,
    pub preferences: Option<Arc<dyn RenderPreferenceProvider>>,
}

impl ShellServices {
    /// Services with a fresh coordinator and handle ledger.
    pub fn new(
        runtime: Arc<dyn NativeRuntime>,
        bridge: Arc<dyn NativeTabBridge>,
        process: Arc<ProcessState>,
    ) -> Self {
        Self {
            runtime,
            bridge,
            process,
            startup: Arc::new(StartupCoordinator::new()),
            ledger: Arc::new(HandleLedger::new()),
            preferences: None,
        }
    }

    /// Set the render-preference provider handed to new tabs.
    pub fn with_preferences(mut self, provider: Arc<dyn RenderPreferenceProvider>) -> Self {
        self.preferences = Some(provider);
        self
    }
}

/// Pick the address the first tab loads.
///
/// Precedence: explicit startup address, then the saved active URL, then the
/// default. Empty strings never match.
pub fn resolve_startup_url<'a>(
    explicit: Option<&'a str>,
    saved: Option<&'a InstanceState>,
    default: &'a str,
) -> &'a str {
    [explicit, saved.and_then(InstanceState::active_url)]
        .into_iter()
        .flatten()
        .find(|url| !url.is_empty())
        .unwrap_or(default)
}

struct ShellState {
    config: ShellConfig,
    saved_state: Option<InstanceState>,
    bridge: Arc<dyn NativeTabBridge>,
    process: Arc<ProcessState>,
    preferences: Option<Arc<dyn RenderPreferenceProvider>>,
    presenter: Box<dyn ShellPresenter>,
    tabs: TabModel,
    active_tab: Option<Arc<Tab>>,
    resolved_url: Option<String>,
    phase: ShellPhase,
}

impl ShellState {
    fn delegate(&self) -> TabDelegate {
        match &self.preferences {
            Some(provider) => TabDelegate::new(provider.clone()),
            None => TabDelegate::none(),
        }
    }

    fn finish_initialization(&mut self) {
        if self.phase != ShellPhase::Starting {
            tracing::debug!(phase = ?self.phase, "ignoring startup success");
            return;
        }

        let url = resolve_startup_url(
            self.config.startup_url.as_deref(),
            self.saved_state.as_ref(),
            &self.config.default_url,
        )
        .to_string();

        match self.launch_shell(&url) {
            Ok(tab) => {
                self.presenter.attach_tab(&tab);
                self.active_tab = Some(tab);
                self.resolved_url = Some(url);
                self.phase = ShellPhase::Running;
            }
            Err(err) => {
                tracing::error!(%url, error = %err, "failed to launch shell");
                self.initialization_failed(err.to_string());
            }
        }
    }

    /// Create a tab, bind it, attach a surface and navigate. Leaves nothing
    /// mounted on failure.
    fn launch_shell(&mut self, url: &str) -> Result<Arc<Tab>, StartupError> {
        let target = Url::parse(url).map_err(|source| StartupError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let tab = self.tabs.create_tab(self.delegate());
        let bridge = self.bridge.as_ref();
        let surface = ContentSurface::new(
            SurfaceId(u64::from(tab.id().0)),
            self.config.viewport_width,
            self.config.viewport_height,
        );

        let result = tab
            .initialize_native(bridge)
            .and_then(|_| tab.set_content_surface(bridge, surface))
            .and_then(|_| tab.load_url(bridge, &target));

        if let Err(err) = result {
            if tab.is_bound() {
                if let Err(cleanup) = tab.destroy_native(bridge) {
                    tracing::warn!(tab = %tab.id(), error = %cleanup, "native cleanup refused");
                }
            }
            self.tabs.remove(tab.id());
            return Err(err.into());
        }
        Ok(tab)
    }

    fn initialization_failed(&mut self, detail: String) {
        if self.phase != ShellPhase::Starting {
            tracing::debug!(phase = ?self.phase, "ignoring startup failure");
            return;
        }
        tracing::error!("browser process initialization failed");
        self.presenter
            .show_notice(Notice::short(notice::BROWSER_PROCESS_INITIALIZATION_FAILED));
        launch_failed::report_once(
            &self.process,
            self.presenter.as_mut(),
            LaunchFailureReport::new(FailureStage::BrowserStartup, detail),
        );
        self.phase = ShellPhase::Failed;
        self.presenter.finish();
    }

    fn library_load_failed(&mut self, err: &StartupError) {
        launch_failed::present(
            &self.process,
            self.presenter.as_mut(),
            LaunchFailureReport::new(FailureStage::LibraryLoad, err.to_string()),
        );
        self.phase = ShellPhase::Failed;
        self.presenter.finish();
    }

    fn teardown(&mut self) {
        if self.phase == ShellPhase::Finished {
            return;
        }
        self.phase = ShellPhase::Finished;
        if let Some(tab) = self.active_tab.take() {
            if tab.is_bound() {
                if let Err(err) = tab.destroy_native(self.bridge.as_ref()) {
                    tracing::warn!(tab = %tab.id(), error = %err, "native teardown refused");
                }
            }
            self.tabs.remove(tab.id());
        }
        tracing::info!("shell torn down");
    }
}

/// Observer handed to the coordinator. Holds the shell weakly so a shell
/// dropped before startup completes ignores the callback.
struct ShellStartupObserver {
    shell: Weak<Mutex<ShellState>>,
}

impl ShellStartupObserver {
    fn with_shell(&self, f: impl FnOnce(&mut ShellState)) {
        match self.shell.upgrade() {
            Some(shell) => f(&mut *shell.lock()),
            None => tracing::debug!("shell dropped before startup finished"),
        }
    }
}

impl StartupObserver for ShellStartupObserver {
    fn on_success(&mut self) {
        self.with_shell(ShellState::finish_initialization);
    }

    fn on_failure(&mut self) {
        self.with_shell(|shell| {
            shell.initialization_failed("browser process reported failure".to_string())
        });
    }
}

/// Shell controller.
pub struct ShellController {
    startup: Arc<StartupCoordinator>,
    runtime: Arc<dyn NativeRuntime>,
    state: Arc<Mutex<ShellState>>,
}

impl ShellController {
    /// Create a shell. `saved_state` is the state kept from a previous instance.
    pub fn new(
        config: ShellConfig,
        saved_state: Option<&InstanceState>,
        services: ShellServices,
        presenter: Box<dyn ShellPresenter>,
    ) -> Self {
        let state = ShellState {
            config,
            saved_state: saved_state.cloned(),
            bridge: services.bridge,
            process: services.process,
            preferences: services.preferences,
            presenter,
            tabs: TabModel::new(services.ledger),
            active_tab: None,
            resolved_url: None,
            phase: ShellPhase::Created,
        };
        Self {
            startup: services.startup,
            runtime: services.runtime,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Load the native library and request browser-process startup.
    ///
    /// Returns immediately. The outcome is applied when the UI loop calls
    /// [`pump`](Self::pump) or [`run_until_settled`](Self::run_until_settled),
    /// or at once if startup already finished in this process. A shell that
    /// failed or was torn down refuses with [`StartupError::ShellClosed`].
    pub fn start(&mut self) -> Result<StartDisposition, StartupError> {
        let (role, request, claimed) = {
            let mut state = self.state.lock();
            if matches!(state.phase, ShellPhase::Failed | ShellPhase::Finished) {
                tracing::warn!(phase = ?state.phase, "ignoring start on a closed shell");
                return Err(StartupError::ShellClosed);
            }
            let role = state
                .process
                .role()
                .ok_or_else(|| StartupError::runtime("application not attached"))?;
            if let Err(err) = self.runtime.ensure_initialized() {
                tracing::error!(error = %err, "native library failed to load");
                state.library_load_failed(&err);
                return Err(err);
            }
            // Enter Starting first: a cached outcome is delivered before
            // the coordinator returns.
            let claimed = state.phase == ShellPhase::Created;
            if claimed {
                state.phase = ShellPhase::Starting;
            }
            (role, state.config.startup_request(), claimed)
        };

        let observer = Box::new(ShellStartupObserver {
            shell: Arc::downgrade(&self.state),
        });
        let result = self
            .startup
            .start(role, self.runtime.as_ref(), request, observer);

        let observed = matches!(
            result,
            Ok(StartDisposition::Requested | StartDisposition::Cached(_))
        );
        if claimed && !observed {
            let mut state = self.state.lock();
            if state.phase == ShellPhase::Starting {
                state.phase = ShellPhase::Created;
            }
        }
        result
    }

    /// Apply queued startup signals.
    pub fn pump(&self) -> usize {
        self.startup.pump()
    }

    /// Wait until startup reaches a terminal state.
    pub async fn run_until_settled(&self) -> Option<StartupOutcome> {
        self.startup.run_until_settled().await
    }

    pub fn startup_state(&self) -> StartupState {
        self.startup.state()
    }

    pub fn phase(&self) -> ShellPhase {
        self.state.lock().phase
    }

    /// The mounted tab.
    pub fn active_tab(&self) -> Option<Arc<Tab>> {
        self.state.lock().active_tab.clone()
    }

    /// Address the mounted tab was launched with.
    pub fn resolved_url(&self) -> Option<String> {
        self.state.lock().resolved_url.clone()
    }

    /// Number of tabs in the shell's model.
    pub fn tab_count(&self) -> usize {
        self.state.lock().tabs.len()
    }

    /// State to hand to the next instance.
    pub fn save_instance_state(&self) -> InstanceState {
        let mut saved = InstanceState::new();
        if let Some(url) = self.active_tab().and_then(|tab| tab.url()) {
            saved.put_string(ACTIVE_URL_KEY, url.as_str());
        }
        saved
    }

    /// Destroy the native counterpart and ignore any later startup callback.
    pub fn teardown(&mut self) {
        self.state.lock().teardown();
    }
}

impl Drop for ShellController {
    fn drop(&mut self) {
        self.teardown();
    }
}
