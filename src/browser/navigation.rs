//! Page navigation
//!
//! One navigation attempt with a deadline and a readiness wait. Retrying is
//! left to the caller.

use crate::browser::PageHandle;
use crate::error::{Error, NavigationError, Result};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// Options for page navigation
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    /// Timeout in milliseconds (default: 60000)
    pub timeout_ms: u64,
    /// Wait until condition (default: load)
    pub wait_until: WaitUntil,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 60000,
            wait_until: WaitUntil::Load,
        }
    }
}

/// Condition to wait for after navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// Wait until load event fires
    Load,
    /// Wait until DOMContentLoaded event fires
    DomContentLoaded,
}

impl WaitUntil {
    fn script(self) -> &'static str {
        match self {
            WaitUntil::Load => {
                r#"
                    new Promise(resolve => {
                        if (document.readyState === 'complete') {
                            resolve(true);
                        } else {
                            window.addEventListener('load', () => resolve(true));
                        }
                    })
                "#
            }
            WaitUntil::DomContentLoaded => {
                r#"
                    new Promise(resolve => {
                        if (document.readyState !== 'loading') {
                            resolve(true);
                        } else {
                            document.addEventListener('DOMContentLoaded', () => resolve(true));
                        }
                    })
                "#
            }
        }
    }
}

/// Result of a navigation
#[derive(Debug)]
pub struct NavigationResult {
    /// Final URL after any redirects
    pub final_url: String,
    /// Page title
    pub title: Option<String>,
    /// Navigation duration in milliseconds
    pub duration_ms: u64,
}

/// Parse and check a navigation target
pub fn validate_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| NavigationError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" | "file" => Ok(url),
        other => Err(NavigationError::InvalidUrl(format!(
            "unsupported scheme '{}' in {}",
            other, raw
        ))
        .into()),
    }
}

/// Page navigator
pub struct PageNavigator;

impl PageNavigator {
    /// Navigate `page` to `url` and wait for readiness
    #[instrument(skip(page, options))]
    pub async fn goto(
        page: &PageHandle,
        url: &str,
        options: &NavigationOptions,
    ) -> Result<NavigationResult> {
        let target = validate_url(url)?;
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(options.timeout_ms);

        info!("Navigating to: {}", target);

        tokio::time::timeout(timeout, page.page.goto(target.as_str()))
            .await
            .map_err(|_| NavigationError::Timeout(options.timeout_ms))?
            .map_err(|e| NavigationError::LoadFailed(e.to_string()))?;

        tokio::time::timeout(timeout, page.page.evaluate(options.wait_until.script()))
            .await
            .map_err(|_| NavigationError::Timeout(options.timeout_ms))?
            .map_err(|e| Error::cdp(e.to_string()))?;

        let final_url = page
            .page
            .url()
            .await?
            .unwrap_or_else(|| target.to_string());

        let title = page
            .page
            .evaluate("document.title")
            .await
            .ok()
            .and_then(|v| v.into_value::<String>().ok());

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!("Navigation complete: {} -> {} in {}ms", url, final_url, duration_ms);

        Ok(NavigationResult {
            final_url,
            title,
            duration_ms,
        })
    }
}
