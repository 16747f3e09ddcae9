//! Page handle abstraction
//!
//! [`DomPage`] is the narrow surface the extractor needs from a loaded
//! document: find the n-th element matching a selector (waiting for it),
//! read its visible text, type into it and click it. It is implemented for
//! live CDP pages ([`PageHandle`](crate::browser::PageHandle)) and for saved
//! HTML snapshots ([`HtmlPage`]).

mod cdp;
pub mod html;

pub use html::{HtmlPage, Interaction};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Why an element lookup failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Fewer than `index + 1` elements matched
    #[error("{found} element(s) matched '{selector}', needed index {index}")]
    NotFound {
        /// Selector searched for
        selector: String,
        /// Requested match index
        index: usize,
        /// Matches seen on the last attempt
        found: usize,
    },

    /// The underlying wait hit its deadline
    #[error("lookup of '{selector}' timed out after {timeout_ms}ms")]
    Timeout {
        /// Selector searched for
        selector: String,
        /// Budget that was exceeded
        timeout_ms: u64,
    },

    /// The selector could not be evaluated
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// Selector searched for
        selector: String,
        /// Parser or driver message
        reason: String,
    },
}

/// A read, type or click could not be delivered to an element
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct InteractionError(pub String);

/// Minimal read/interact surface of a loaded document
#[async_trait]
pub trait DomPage: Send + Sync {
    /// Resolved element handle
    type Element: Send + Sync;

    /// Find the `index`-th match of `selector`, waiting up to `timeout`
    async fn find_element(
        &self,
        selector: &str,
        index: usize,
        timeout: Duration,
    ) -> Result<Self::Element, LookupError>;

    /// Visible text of an element
    async fn element_text(&self, element: &Self::Element) -> Result<String, InteractionError>;

    /// Focus the element and type `text`
    async fn type_text(&self, element: &Self::Element, text: &str) -> Result<(), InteractionError>;

    /// Click the element
    async fn click(&self, element: &Self::Element) -> Result<(), InteractionError>;
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Element text as stored on the record: whitespace runs collapse to one
/// space and the ends are trimmed, whichever page produced it.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text_collapses_whitespace() {
        assert_eq!(
            normalize_text("\n   Valet parking\n\t  Fitness   Center \n"),
            "Valet parking Fitness Center"
        );
        assert_eq!(normalize_text(" \n\t "), "");
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_secs(10)), 10_000);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
