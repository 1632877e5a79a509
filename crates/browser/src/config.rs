//! Shell configuration.

use crate::runtime::StartupRequest;

/// Address loaded when neither an explicit nor a saved address is available.
pub const DEFAULT_SHELL_URL: &str = "https://www.google.com";

/// Suffix of the private data directory.
pub const PRIVATE_DATA_DIRECTORY_SUFFIX: &str = "oxide";

/// Command-line file read from private storage at bootstrap.
pub const COMMAND_LINE_FILE: &str = "oxide-command-line";

/// Shell configuration.
#[derive(Clone, Debug)]
pub struct ShellConfig {
    /// Explicit startup address. Takes precedence over saved state.
    pub startup_url: Option<String>,
    /// Fallback address.
    pub default_url: String,
    /// Whether to launch the GPU process with the browser process.
    pub start_gpu_process: bool,
    /// Whether to bring up only the minimal browser.
    pub start_minimal_browser: bool,
    /// Private data directory suffix.
    pub private_data_directory_suffix: String,
    /// Command-line file name.
    pub command_line_file: String,
    /// Viewport width.
    pub viewport_width: u32,
    /// Viewport height.
    pub viewport_height: u32,
    /// Whether dark mode is preferred.
    pub prefer_dark_mode: bool,
    /// Whether auto-darkening of web content is allowed.
    pub force_dark_web_content: bool,
}

impl ShellConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the explicit startup address. Empty strings are ignored.
    pub fn with_startup_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.startup_url = (!url.is_empty()).then_some(url);
        self
    }

    /// Set the fallback address.
    pub fn with_default_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = url.into();
        self
    }

    /// Set viewport size.
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set render preferences.
    pub fn with_dark_mode(mut self, prefer_dark_mode: bool, force_dark: bool) -> Self {
        self.prefer_dark_mode = prefer_dark_mode;
        self.force_dark_web_content = force_dark;
        self
    }

    /// Set whether the GPU process starts with the browser process.
    pub fn with_gpu_process(mut self, enabled: bool) -> Self {
        self.start_gpu_process = enabled;
        self
    }

    /// Startup request derived from this configuration.
    pub fn startup_request(&self) -> StartupRequest {
        StartupRequest {
            start_gpu_process: self.start_gpu_process,
            start_minimal_browser: self.start_minimal_browser,
            ..StartupRequest::default()
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            startup_url: None,
            default_url: DEFAULT_SHELL_URL.to_string(),
            start_gpu_process: true,
            start_minimal_browser: false,
            private_data_directory_suffix: PRIVATE_DATA_DIRECTORY_SUFFIX.to_string(),
            command_line_file: COMMAND_LINE_FILE.to_string(),
            viewport_width: 1280,
            viewport_height: 720,
            prefer_dark_mode: false,
            force_dark_web_content: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::LibraryProcessType;

    #[test]
    fn test_default_config() {
        let config = ShellConfig::default();
        assert!(config.startup_url.is_none());
        assert_eq!(config.default_url, DEFAULT_SHELL_URL);
        assert_eq!(config.command_line_file, COMMAND_LINE_FILE);
        assert!(!config.prefer_dark_mode);
    }

    #[test]
    fn test_empty_startup_url_is_unset() {
        let config = ShellConfig::new().with_startup_url("");
        assert!(config.startup_url.is_none());

        let config = ShellConfig::new().with_startup_url("https://example.com");
        assert_eq!(config.startup_url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_startup_request() {
        let request = ShellConfig::new().with_gpu_process(false).startup_request();
        assert_eq!(request.process_type, LibraryProcessType::Browser);
        assert!(!request.start_gpu_process);
        assert!(!request.start_minimal_browser);
    }

    #[test]
    fn test_config_builder() {
        let config = ShellConfig::new()
            .with_viewport(1920, 1080)
            .with_dark_mode(true, false);

        assert_eq!(config.viewport_width, 1920);
        assert!(config.prefer_dark_mode);
        assert!(!config.force_dark_web_content);
    }
}
