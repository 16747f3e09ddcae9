//! hotel-scrape - rule-driven hotel detail extraction
//!
//! Drives a headless Chromium page (or a saved HTML snapshot) through a
//! declarative rule table and collects a flat [`HotelRecord`] plus a list of
//! per-field failures.
//!
//! # Architecture
//!
//! ```text
//! RuleSet (code / JSON) ──▶ FieldExtractor ──▶ ExtractionResult
//!                                │                 ├─ HotelRecord (JSON output)
//!                                ▼                 └─ FieldError list
//!                            DomPage
//!                      ┌─────────┴─────────┐
//!                 PageHandle (CDP)     HtmlPage (snapshot)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hotel_scrape::browser::{BrowserController, NavigationOptions};
//! use hotel_scrape::extraction::FieldExtractor;
//! use hotel_scrape::tripadvisor;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let controller = BrowserController::new().await?;
//!     let page = controller
//!         .open(tripadvisor::BASE_URL, &NavigationOptions::default())
//!         .await?;
//!
//!     let rules = tripadvisor::rules(tripadvisor::DEFAULT_QUERY);
//!     let result = FieldExtractor::extract(&page, &rules, Duration::from_secs(10)).await;
//!
//!     println!("{}", serde_json::to_string(&result.record)?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod error;
pub mod extraction;
pub mod page;
pub mod tripadvisor;

// Re-exports for convenience
pub use browser::{BrowserController, PageHandle};
pub use error::{Error, Result};
pub use extraction::{
    ExtractionResult, ExtractionRule, FieldExtractor, HotelField, HotelRecord, RuleSet, RunStatus,
};
pub use page::{DomPage, HtmlPage};
