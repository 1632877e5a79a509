//! Browser-process startup sequencing.
//!
//! ```text
//! NotStarted --start()--------------> InProgress
//! InProgress --on_native_success()--> Succeeded
//! InProgress --on_native_failure()--> Failed
//! ```
//!
//! The native runtime reports on a worker thread. Signals are queued on a
//! channel and only dispatched to the observer from [`StartupCoordinator::pump`]
//! or [`StartupCoordinator::run_until_settled`], both of which run on the UI
//! loop. There is no cancellation and no automatic retry.

use common::{ProcessRole, StartupError};
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex as AsyncMutex;

use crate::runtime::{NativeRuntime, NativeSignal, StartupCompletion, StartupRequest};

/// Coordinator state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartupState {
    NotStarted,
    InProgress,
    Succeeded,
    Failed,
}

impl StartupState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    pub fn outcome(&self) -> Option<StartupOutcome> {
        match self {
            Self::Succeeded => Some(StartupOutcome::Success),
            Self::Failed => Some(StartupOutcome::Failure),
            Self::NotStarted | Self::InProgress => None,
        }
    }
}

/// Terminal result of startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartupOutcome {
    Success,
    Failure,
}

/// Receives the startup outcome. Exactly one method is called per accepted
/// `start`.
pub trait StartupObserver: Send {
    fn on_success(&mut self);
    fn on_failure(&mut self);
}

/// How a `start` request was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartDisposition {
    /// A native startup request was issued.
    Requested,
    /// Startup is already running. The request was ignored and its observer dropped.
    AlreadyInProgress,
    /// Startup already finished. The observer was answered from the cached outcome.
    Cached(StartupOutcome),
}

/// One-shot startup state machine.
///
/// Native initialization is process-wide, so one coordinator serves every
/// shell in the process. It is shared behind an `Arc` and synchronizes
/// internally. Observers are always called with no coordinator lock held.
pub struct StartupCoordinator {
    inner: Mutex<CoordinatorInner>,
    signals: AsyncMutex<Option<UnboundedReceiver<NativeSignal>>>,
}

struct CoordinatorInner {
    state: StartupState,
    observer: Option<Box<dyn StartupObserver>>,
    /// Handed to the native side by the first accepted `start`.
    sender: Option<UnboundedSender<NativeSignal>>,
}

impl StartupCoordinator {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            inner: Mutex::new(CoordinatorInner {
                state: StartupState::NotStarted,
                observer: None,
                sender: Some(tx),
            }),
            signals: AsyncMutex::new(Some(rx)),
        }
    }

    /// Current state.
    pub fn state(&self) -> StartupState {
        self.inner.lock().state
    }

    /// Terminal outcome, once reached.
    pub fn outcome(&self) -> Option<StartupOutcome> {
        self.state().outcome()
    }

    /// Request browser-process startup and return immediately.
    pub fn start(
        &self,
        role: ProcessRole,
        runtime: &dyn NativeRuntime,
        request: StartupRequest,
        mut observer: Box<dyn StartupObserver>,
    ) -> Result<StartDisposition, StartupError> {
        if !role.is_browser() {
            return Err(StartupError::NotBrowserProcess(role));
        }

        let completion = {
            let mut inner = self.inner.lock();
            let cached = inner.state.outcome();
            if let Some(outcome) = cached {
                drop(inner);
                tracing::debug!(?outcome, "startup already finished, answering from cache");
                notify(observer.as_mut(), outcome);
                return Ok(StartDisposition::Cached(outcome));
            }
            if inner.state == StartupState::InProgress {
                tracing::debug!("startup already in progress, ignoring start request");
                return Ok(StartDisposition::AlreadyInProgress);
            }

            let tx = inner
                .sender
                .take()
                .ok_or_else(|| StartupError::runtime("startup channel already handed out"))?;
            inner.observer = Some(observer);
            inner.state = StartupState::InProgress;
            StartupCompletion::new(tx)
        };

        tracing::info!(?request, "starting browser process");
        runtime.start_browser_processes_async(request, completion);
        Ok(StartDisposition::Requested)
    }

    /// Native side reported success.
    pub fn on_native_success(&self) -> bool {
        self.deliver(NativeSignal::Success)
    }

    /// Native side reported failure.
    pub fn on_native_failure(&self) -> bool {
        self.deliver(NativeSignal::Failure)
    }

    /// Apply one native signal. Returns `true` if it moved the state machine.
    fn deliver(&self, signal: NativeSignal) -> bool {
        let (outcome, observer) = {
            let mut inner = self.inner.lock();
            if inner.state != StartupState::InProgress {
                tracing::debug!(?signal, state = ?inner.state, "dropping startup signal");
                return false;
            }
            let outcome = match signal {
                NativeSignal::Success => StartupOutcome::Success,
                NativeSignal::Failure => StartupOutcome::Failure,
            };
            inner.state = match outcome {
                StartupOutcome::Success => StartupState::Succeeded,
                StartupOutcome::Failure => StartupState::Failed,
            };
            tracing::info!(state = ?inner.state, "browser process startup finished");
            (outcome, inner.observer.take())
        };

        if let Some(mut observer) = observer {
            notify(observer.as_mut(), outcome);
        }
        true
    }

    /// Dispatch every queued signal without waiting. Returns how many were queued.
    ///
    /// Returns `0` while another task is awaiting the channel in
    /// [`run_until_settled`](Self::run_until_settled); that task dispatches instead.
    pub fn pump(&self) -> usize {
        let Ok(mut signals) = self.signals.try_lock() else {
            tracing::trace!("startup signals awaited elsewhere");
            return 0;
        };
        let mut handled = 0;
        loop {
            let Some(receiver) = signals.as_mut() else {
                return handled;
            };
            match receiver.try_recv() {
                Ok(signal) => {
                    self.deliver(signal);
                    handled += 1;
                }
                Err(TryRecvError::Empty) => return handled,
                Err(TryRecvError::Disconnected) => {
                    *signals = None;
                    self.completion_dropped();
                    return handled;
                }
            }
        }
    }

    /// Wait for the terminal outcome, dispatching signals as they arrive.
    ///
    /// Returns `None` if startup was never requested.
    pub async fn run_until_settled(&self) -> Option<StartupOutcome> {
        loop {
            match self.state() {
                StartupState::NotStarted => return None,
                StartupState::InProgress => {}
                StartupState::Succeeded | StartupState::Failed => break,
            }

            let mut signals = self.signals.lock().await;
            if self.state() != StartupState::InProgress {
                continue;
            }
            let next = match signals.as_mut() {
                Some(receiver) => receiver.recv().await,
                None => None,
            };
            match next {
                Some(signal) => {
                    self.deliver(signal);
                }
                None => {
                    *signals = None;
                    self.completion_dropped();
                }
            }
        }
        // Duplicates already queued are dropped here rather than on a later pump.
        self.pump();
        self.outcome()
    }

    /// Every completion handle was dropped without a signal.
    fn completion_dropped(&self) {
        if self.state() == StartupState::InProgress {
            tracing::error!("native runtime dropped startup completion without reporting");
            self.deliver(NativeSignal::Failure);
        }
    }
}

impl Default for StartupCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

fn notify(observer: &mut dyn StartupObserver, outcome: StartupOutcome) {
    match outcome {
        StartupOutcome::Success => observer.on_success(),
        StartupOutcome::Failure => observer.on_failure(),
    }
}
