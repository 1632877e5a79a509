//! Launch failure reporting.
//!
//! A diagnostic report is emitted at most once per process, however many
//! times the user relaunches into a failure. The user-facing notice is shown
//! every time.

use std::fmt;

use common::ProcessState;
use ui::notice::{self, Notice};

use crate::shell::ShellPresenter;

/// Where the launch failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureStage {
    /// The native library could not be loaded.
    LibraryLoad,
    /// The browser process reported a startup failure.
    BrowserStartup,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LibraryLoad => f.write_str("library-load"),
            Self::BrowserStartup => f.write_str("browser-startup"),
        }
    }
}

/// Diagnostic report handed to the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchFailureReport {
    pub stage: FailureStage,
    pub detail: String,
}

impl LaunchFailureReport {
    pub fn new(stage: FailureStage, detail: impl Into<String>) -> Self {
        Self {
            stage,
            detail: detail.into(),
        }
    }
}

/// Emit `report` unless this process already reported a launch failure.
///
/// Returns `true` if the report was emitted.
pub fn report_once(
    process: &ProcessState,
    presenter: &mut dyn ShellPresenter,
    report: LaunchFailureReport,
) -> bool {
    if !process.claim_launch_failure_report() {
        tracing::debug!(stage = %report.stage, "launch failure already reported in this process");
        return false;
    }
    tracing::error!(stage = %report.stage, detail = %report.detail, "reporting launch failure");
    presenter.report_diagnostic(&report);
    true
}

/// Launch-failed screen: report once, then show a dismiss-only alert.
pub fn present(
    process: &ProcessState,
    presenter: &mut dyn ShellPresenter,
    report: LaunchFailureReport,
) -> bool {
    let reported = report_once(process, presenter, report);
    presenter.show_notice(Notice::alert(notice::UPDATE_NEEDED));
    reported
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use ui::Tab;

    #[derive(Default)]
    struct Collecting {
        notices: Vec<Notice>,
        reports: Vec<LaunchFailureReport>,
    }

    impl ShellPresenter for Collecting {
        fn attach_tab(&mut self, _tab: &Arc<Tab>) {}

        fn show_notice(&mut self, notice: Notice) {
            self.notices.push(notice);
        }

        fn report_diagnostic(&mut self, report: &LaunchFailureReport) {
            self.reports.push(report.clone());
        }

        fn finish(&mut self) {}
    }

    #[test]
    fn test_report_once_per_process() {
        let process = ProcessState::new();
        let mut presenter = Collecting::default();

        let first = LaunchFailureReport::new(FailureStage::BrowserStartup, "first");
        let second = LaunchFailureReport::new(FailureStage::BrowserStartup, "second");
        assert!(report_once(&process, &mut presenter, first.clone()));
        assert!(!report_once(&process, &mut presenter, second));

        assert_eq!(presenter.reports, vec![first]);
        assert!(process.launch_failure_reported());
    }

    #[test]
    fn test_present_always_shows_alert() {
        let process = ProcessState::new();
        let mut presenter = Collecting::default();

        for _ in 0..2 {
            present(
                &process,
                &mut presenter,
                LaunchFailureReport::new(FailureStage::LibraryLoad, "missing symbol"),
            );
        }

        assert_eq!(presenter.reports.len(), 1);
        assert_eq!(
            presenter.notices,
            vec![
                Notice::alert(notice::UPDATE_NEEDED),
                Notice::alert(notice::UPDATE_NEEDED),
            ]
        );
    }
}
