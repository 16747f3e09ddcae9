//! [`DomPage`] over a live Chromium page

use super::{millis, normalize_text, DomPage, InteractionError, LookupError};
use crate::browser::PageHandle;
use async_trait::async_trait;
use chromiumoxide::element::Element;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument, trace};

#[async_trait]
impl DomPage for PageHandle {
    type Element = Element;

    /// Polls `querySelectorAll` until enough elements exist.
    ///
    /// Too few matches at the deadline is `NotFound`; a CDP call that is
    /// still in flight at the deadline is `Timeout`. Driver errors while
    /// polling (e.g. the document is being replaced after a click) are
    /// retried until the deadline.
    #[instrument(skip(self))]
    async fn find_element(
        &self,
        selector: &str,
        index: usize,
        timeout: Duration,
    ) -> Result<Element, LookupError> {
        let deadline = Instant::now() + timeout;
        let mut found = 0;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, self.page.find_elements(selector)).await {
                Err(_) => {
                    return Err(LookupError::Timeout {
                        selector: selector.to_string(),
                        timeout_ms: millis(timeout),
                    })
                }
                Ok(Ok(elements)) => {
                    found = elements.len();
                    if let Some(element) = elements.into_iter().nth(index) {
                        debug!("Resolved '{}' [{}]", selector, index);
                        return Ok(element);
                    }
                }
                Ok(Err(e)) => trace!("Lookup of '{}' failed, retrying: {}", selector, e),
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(LookupError::NotFound {
                    selector: selector.to_string(),
                    index,
                    found,
                });
            }
            tokio::time::sleep(remaining.min(self.poll_interval)).await;
        }
    }

    async fn element_text(&self, element: &Element) -> Result<String, InteractionError> {
        element
            .inner_text()
            .await
            .map(|text| normalize_text(&text.unwrap_or_default()))
            .map_err(|e| InteractionError(e.to_string()))
    }

    async fn type_text(&self, element: &Element, text: &str) -> Result<(), InteractionError> {
        element
            .focus()
            .await
            .map_err(|e| InteractionError(format!("focus: {}", e)))?
            .type_str(text)
            .await
            .map_err(|e| InteractionError(format!("type: {}", e)))?;
        Ok(())
    }

    async fn click(&self, element: &Element) -> Result<(), InteractionError> {
        element
            .click()
            .await
            .map_err(|e| InteractionError(format!("click: {}", e)))?;
        Ok(())
    }
}
