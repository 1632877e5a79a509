//! Short-lived user notices.

use std::time::Duration;

/// Shown when the browser process fails to start.
pub const BROWSER_PROCESS_INITIALIZATION_FAILED: &str =
    "Unable to start the browser process. Please try again later.";

/// Shown by the launch-failed screen.
pub const UPDATE_NEEDED: &str =
    "This version of the app could not start. Please update it and try again.";

/// Label of the single dismiss action.
pub const OK_LABEL: &str = "OK";

/// How long a toast stays on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLength {
    Short,
    Long,
}

impl ToastLength {
    pub fn duration(&self) -> Duration {
        match self {
            Self::Short => Duration::from_millis(2000),
            Self::Long => Duration::from_millis(3500),
        }
    }
}

/// A notice the presentation layer displays. Every notice is dismiss-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Transient message that hides itself.
    Toast { message: String, length: ToastLength },
    /// Modal message with one dismiss action.
    Alert { message: String, dismiss_label: String },
}

impl Notice {
    /// Short toast.
    pub fn short(message: impl Into<String>) -> Self {
        Self::Toast {
            message: message.into(),
            length: ToastLength::Short,
        }
    }

    /// Alert dismissed with "OK".
    pub fn alert(message: impl Into<String>) -> Self {
        Self::Alert {
            message: message.into(),
            dismiss_label: OK_LABEL.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Toast { message, .. } | Self::Alert { message, .. } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_toast() {
        let notice = Notice::short(BROWSER_PROCESS_INITIALIZATION_FAILED);
        assert_eq!(notice.message(), BROWSER_PROCESS_INITIALIZATION_FAILED);
        assert!(matches!(
            notice,
            Notice::Toast {
                length: ToastLength::Short,
                ..
            }
        ));
        assert!(ToastLength::Short.duration() < ToastLength::Long.duration());
    }

    #[test]
    fn test_alert_has_ok() {
        let notice = Notice::alert(UPDATE_NEEDED);
        assert_eq!(
            notice,
            Notice::Alert {
                message: UPDATE_NEEDED.to_string(),
                dismiss_label: "OK".to_string(),
            }
        );
    }
}
