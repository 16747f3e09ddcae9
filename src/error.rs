//! Error types for hotel-scrape
//!
//! Setup-level failures (launching the browser, navigating, loading a rule
//! table) are `Err` values of [`Error`]. Per-field failures during an
//! extraction run are not errors in this sense: they are recorded as
//! [`FieldError`](crate::extraction::FieldError) entries on the result.

use thiserror::Error;

/// The main error type for hotel-scrape operations
#[derive(Error, Debug)]
pub enum Error {
    /// Browser-related errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Rule table errors
    #[error("Rule error: {0}")]
    Rules(#[from] RuleError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),
}

/// Browser lifecycle and control errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    /// Timeout waiting for browser
    #[error("Browser operation timed out after {0}ms")]
    Timeout(u64),
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Navigation timeout
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),
}

/// Rule table loading and validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    /// A rule table must extract at least one field
    #[error("rule table has no field rules")]
    NoFieldRules,

    /// Selector is empty or whitespace
    #[error("rule '{0}' has an empty selector")]
    EmptySelector(String),

    /// Selector is not valid CSS
    #[error("rule '{rule}' has an invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// Field or action name
        rule: String,
        /// The offending selector
        selector: String,
        /// Parser message
        reason: String,
    },
}

/// Result type alias for hotel-scrape operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}
