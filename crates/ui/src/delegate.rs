//! Render-preference delegate.
//!
//! Native code asks a tab whether night mode or forced darkening apply. The
//! tab forwards the question to whichever policy object the host injected.

use std::fmt;
use std::sync::Arc;

/// Queries the native side may issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderQuery {
    /// Preferred color scheme is dark.
    NightMode,
    /// Auto-darkening may be applied to web content.
    ForceDark,
}

/// Policy object answering render-preference queries.
///
/// Implementations must be pure reads: they may be called from any thread
/// and must not call back into tab state.
pub trait RenderPreferenceProvider: Send + Sync {
    fn is_night_mode_enabled(&self) -> bool {
        false
    }

    fn is_force_dark_web_content_enabled(&self) -> bool {
        false
    }
}

/// Provider with fixed answers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedPreferences {
    pub night_mode: bool,
    pub force_dark: bool,
}

impl FixedPreferences {
    pub fn new(night_mode: bool, force_dark: bool) -> Self {
        Self {
            night_mode,
            force_dark,
        }
    }
}

impl RenderPreferenceProvider for FixedPreferences {
    fn is_night_mode_enabled(&self) -> bool {
        self.night_mode
    }

    fn is_force_dark_web_content_enabled(&self) -> bool {
        self.force_dark
    }
}

/// Per-tab indirection to the active provider.
#[derive(Clone, Default)]
pub struct TabDelegate {
    provider: Option<Arc<dyn RenderPreferenceProvider>>,
}

impl TabDelegate {
    /// Create a delegate forwarding to `provider`.
    pub fn new(provider: Arc<dyn RenderPreferenceProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Create a delegate with no provider. Every query answers `false`.
    pub fn none() -> Self {
        Self::default()
    }

    /// Check if a provider is set.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Answer a query. Disabled when no provider is set.
    pub fn resolve(&self, query: RenderQuery) -> bool {
        let Some(provider) = &self.provider else {
            return false;
        };
        match query {
            RenderQuery::NightMode => provider.is_night_mode_enabled(),
            RenderQuery::ForceDark => provider.is_force_dark_web_content_enabled(),
        }
    }
}

impl fmt::Debug for TabDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabDelegate")
            .field("has_provider", &self.has_provider())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NightOnly;

    impl RenderPreferenceProvider for NightOnly {
        fn is_night_mode_enabled(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_no_provider_is_disabled() {
        let delegate = TabDelegate::none();
        assert!(!delegate.has_provider());
        assert!(!delegate.resolve(RenderQuery::NightMode));
        assert!(!delegate.resolve(RenderQuery::ForceDark));
    }

    #[test]
    fn test_forwards_to_provider() {
        let delegate = TabDelegate::new(Arc::new(FixedPreferences::new(true, false)));
        assert!(delegate.resolve(RenderQuery::NightMode));
        assert!(!delegate.resolve(RenderQuery::ForceDark));

        let delegate = TabDelegate::new(Arc::new(FixedPreferences::new(false, true)));
        assert!(!delegate.resolve(RenderQuery::NightMode));
        assert!(delegate.resolve(RenderQuery::ForceDark));
    }

    #[test]
    fn test_provider_defaults() {
        let delegate = TabDelegate::new(Arc::new(NightOnly));
        assert!(delegate.resolve(RenderQuery::NightMode));
        assert!(!delegate.resolve(RenderQuery::ForceDark));
    }
}
