//! Browser session management
//!
//! Attaches to an already-running Chrome instance when a debug URL is
//! configured, otherwise launches a new one. The exam portal is normally
//! driven in a visible window so the operator can select answers and
//! advance questions by hand; attaching to the operator's own browser
//! keeps it open after the run ends.

use std::path::Path;
use std::sync::Arc;

use headless_chrome::{Browser, LaunchOptionsBuilder, Tab, protocol::cdp::Page};
use tracing::{debug, info};

use crate::error::{BrowserError, Result};

/// Browser session configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Whether a launched browser runs headless
    pub headless: bool,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// WebSocket debug URL of an existing Chrome instance to attach to
    pub debug_ws_url: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            width: 1920,
            height: 1080,
            debug_ws_url: None,
        }
    }
}

impl BrowserConfig {
    /// Create a new configuration builder
    pub fn builder() -> BrowserConfigBuilder {
        BrowserConfigBuilder::default()
    }
}

/// Builder for BrowserConfig
#[derive(Default)]
pub struct BrowserConfigBuilder {
    config: BrowserConfig,
}

impl BrowserConfigBuilder {
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn debug_ws_url(mut self, url: impl Into<String>) -> Self {
        self.config.debug_ws_url = Some(url.into());
        self
    }

    pub fn build(self) -> BrowserConfig {
        self.config
    }
}

/// Managed browser session over the exam page
pub struct BrowserSession {
    browser: Browser,
}

impl BrowserSession {
    /// Attach to the configured debug endpoint, or launch a new instance
    /// when none is configured or attaching fails.
    pub fn connect_or_launch(config: BrowserConfig) -> Result<Self> {
        if let Some(url) = config.debug_ws_url.clone() {
            info!(url = %url, "Attaching to existing browser");
            match Browser::connect(url) {
                Ok(browser) => return Ok(Self { browser }),
                Err(e) => {
                    info!("Attach failed ({}), launching a new browser instead", e);
                }
            }
        }

        Self::launch(config)
    }

    /// Launch a new browser instance
    pub fn launch(config: BrowserConfig) -> Result<Self> {
        use std::ffi::OsStr;

        info!("Launching browser (headless: {})", config.headless);

        let args: Vec<String> = vec![
            format!("--window-size={},{}", config.width, config.height),
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
        ];
        let os_args: Vec<&OsStr> = args.iter().map(OsStr::new).collect();

        let launch_options = LaunchOptionsBuilder::default()
            .headless(config.headless)
            .args(os_args)
            .build()
            .map_err(|e| {
                BrowserError::Initialization(format!("Failed to build launch options: {}", e))
            })?;

        let browser = Browser::new(launch_options)
            .map_err(|e| BrowserError::Initialization(format!("Failed to launch browser: {}", e)))?;

        info!("Browser session created successfully");

        Ok(Self { browser })
    }

    /// Get the active tab (the page the operator currently has open)
    pub fn active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.browser.get_tabs();
        let tabs_guard = tabs
            .lock()
            .map_err(|e| BrowserError::TabError(format!("Failed to lock tabs: {}", e)))?;

        tabs_guard
            .first()
            .cloned()
            .ok_or_else(|| BrowserError::TabError("No active tab available".to_string()))
    }

    /// Capture a PNG screenshot of the active tab and write it to `path`
    pub fn screenshot_to_file(&self, path: &Path) -> Result<()> {
        let tab = self.active_tab()?;

        debug!(path = %path.display(), "Taking screenshot");

        let bytes = tab
            .capture_screenshot(
                Page::CaptureScreenshotFormatOption::Png,
                Some(100),
                None,
                true,
            )
            .map_err(|e| BrowserError::Screenshot(format!("Failed to capture screenshot: {}", e)))?;

        std::fs::write(path, &bytes)
            .map_err(|e| BrowserError::Screenshot(format!("Failed to write screenshot: {}", e)))?;

        info!(path = %path.display(), size = bytes.len(), "Screenshot saved");

        Ok(())
    }
}
