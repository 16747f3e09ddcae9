//! Browser automation module
//!
//! Launching Chromium through ChromiumOxide and navigating a page to the
//! point where extraction rules can run against it.

pub mod controller;
pub mod navigation;

pub use controller::{BrowserConfig, BrowserConfigBuilder, BrowserController, PageHandle};
pub use navigation::{validate_url, NavigationOptions, NavigationResult, PageNavigator, WaitUntil};
