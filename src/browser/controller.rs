//! Browser lifecycle management
//!
//! Launches Chromium over CDP, drives its event handler on a tokio task and
//! hands out [`PageHandle`]s for extraction.

use super::navigation::{NavigationOptions, PageNavigator};
use crate::error::{BrowserError, Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Configuration for browser launch
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode (default: true)
    pub headless: bool,
    /// Browser window width (default: 1920)
    pub width: u32,
    /// Browser window height (default: 1080)
    pub height: u32,
    /// Enable sandbox (default: true)
    pub sandbox: bool,
    /// User agent string (None = use default)
    pub user_agent: Option<String>,
    /// Launch timeout in milliseconds (default: 60000)
    pub launch_timeout_ms: u64,
    /// Interval between element lookups while waiting (default: 100)
    pub poll_interval_ms: u64,
    /// Path to Chrome/Chromium executable (None = auto-detect)
    pub chrome_path: Option<String>,
    /// Additional Chrome arguments
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            width: 1920,
            height: 1080,
            sandbox: true,
            user_agent: None,
            launch_timeout_ms: 60000,
            poll_interval_ms: 100,
            chrome_path: None,
            extra_args: Vec::new(),
        }
    }
}

impl BrowserConfig {
    /// Create a new config builder
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
    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Set viewport dimensions
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Enable/disable sandbox
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.config.sandbox = sandbox;
        self
    }

    /// Set user agent
    pub fn user_agent<S: Into<String>>(mut self, ua: S) -> Self {
        self.config.user_agent = Some(ua.into());
        self
    }

    /// Set launch timeout
    pub fn launch_timeout_ms(mut self, ms: u64) -> Self {
        self.config.launch_timeout_ms = ms;
        self
    }

    /// Set element polling interval
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    /// Set Chrome path
    pub fn chrome_path<S: Into<String>>(mut self, path: S) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Add extra Chrome argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    /// Build the config
    pub fn build(self) -> BrowserConfig {
        self.config
    }
}

/// Handle to an open browser page
#[derive(Clone)]
pub struct PageHandle {
    pub(crate) page: Page,
    pub(crate) poll_interval: Duration,
}

impl PageHandle {
    /// Current URL of the page
    pub async fn url(&self) -> Result<Option<String>> {
        Ok(self.page.url().await?)
    }
}

/// High-level browser controller
pub struct BrowserController {
    browser: Browser,
    handler: JoinHandle<()>,
    config: BrowserConfig,
}

impl BrowserController {
    /// Launch a browser with default config
    #[instrument]
    pub async fn new() -> Result<Self> {
        Self::with_config(BrowserConfig::default()).await
    }

    /// Launch a browser with custom config
    #[instrument(skip(config))]
    pub async fn with_config(config: BrowserConfig) -> Result<Self> {
        info!(
            "Launching browser: headless={}, viewport={}x{}",
            config.headless, config.width, config.height
        );

        let cdp_config = Self::cdp_config(&config)?;

        let timeout = Duration::from_millis(config.launch_timeout_ms);
        let (browser, mut handler) = tokio::time::timeout(timeout, Browser::launch(cdp_config))
            .await
            .map_err(|_| BrowserError::Timeout(config.launch_timeout_ms))?
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("Browser handler event error: {}", e);
                    break;
                }
            }
            debug!("Browser handler finished");
        });

        info!("Browser launched");

        Ok(Self {
            browser,
            handler: handler_task,
            config,
        })
    }

    fn cdp_config(config: &BrowserConfig) -> Result<CdpBrowserConfig> {
        let mut builder = CdpBrowserConfig::builder().viewport(
            chromiumoxide::handler::viewport::Viewport {
                width: config.width,
                height: config.height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: true,
                has_touch: false,
            },
        );

        // chromiumoxide launches headless unless asked for a window
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        builder = builder.window_size(config.width, config.height);
        for arg in &config.extra_args {
            builder = builder.arg(arg);
        }

        builder
            .build()
            .map_err(|e| BrowserError::ConfigError(e.to_string()).into())
    }

    /// Create a blank page
    #[instrument(skip(self))]
    pub async fn new_page(&self) -> Result<PageHandle> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))?;

        if let Some(ref ua) = self.config.user_agent {
            page.set_user_agent(ua.as_str()).await?;
        }

        debug!("Created new page");
        Ok(PageHandle {
            page,
            poll_interval: Duration::from_millis(self.config.poll_interval_ms),
        })
    }

    /// Create a page and navigate it to `url`
    #[instrument(skip(self, options))]
    pub async fn open(&self, url: &str, options: &NavigationOptions) -> Result<PageHandle> {
        let page = self.new_page().await?;
        let nav = PageNavigator::goto(&page, url, options).await?;
        info!(
            "Opened {} ({}) in {}ms",
            nav.final_url,
            nav.title.as_deref().unwrap_or("untitled"),
            nav.duration_ms
        );
        Ok(page)
    }

    /// Close the browser
    #[instrument(skip(self))]
    pub async fn close(mut self) -> Result<()> {
        info!("Closing browser");

        self.browser
            .close()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;

        let _ = tokio::time::timeout(Duration::from_secs(5), self.handler).await;

        info!("Browser closed");
        Ok(())
    }
}
