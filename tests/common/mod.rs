//! Scripted in-memory page shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use hotel_scrape::page::{DomPage, InteractionError, LookupError};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Element handed out by [`ScriptedPage`]
#[derive(Debug, Clone)]
pub struct ScriptedElement {
    pub selector: String,
    pub index: usize,
    pub text: String,
}

/// Page whose elements, delays and failures are set up by the test
#[derive(Default)]
pub struct ScriptedPage {
    elements: HashMap<String, Vec<String>>,
    delays: HashMap<String, Duration>,
    hanging: HashSet<String>,
    stuck_text: HashSet<String>,
    stuck_actions: HashSet<String>,
    broken: HashSet<String>,
    lookups: Mutex<Vec<String>>,
    actions: Mutex<Vec<String>>,
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one match for `selector`
    pub fn with(mut self, selector: &str, text: &str) -> Self {
        self.elements
            .entry(selector.to_string())
            .or_default()
            .push(text.to_string());
        self
    }

    /// Add several matches for `selector`
    pub fn with_all(mut self, selector: &str, texts: &[&str]) -> Self {
        for text in texts {
            self = self.with(selector, text);
        }
        self
    }

    /// Elements of `selector` only show up after `delay`
    pub fn appearing_after(mut self, selector: &str, delay: Duration) -> Self {
        self.delays.insert(selector.to_string(), delay);
        self
    }

    /// Lookups of `selector` never answer
    pub fn hanging(mut self, selector: &str) -> Self {
        self.hanging.insert(selector.to_string());
        self
    }

    /// Reading text of `selector` never answers
    pub fn stuck_text(mut self, selector: &str) -> Self {
        self.stuck_text.insert(selector.to_string());
        self
    }

    /// Typing into or clicking `selector` never answers
    pub fn stuck_action(mut self, selector: &str) -> Self {
        self.stuck_actions.insert(selector.to_string());
        self
    }

    /// Typing into or clicking `selector` fails
    pub fn broken(mut self, selector: &str) -> Self {
        self.broken.insert(selector.to_string());
        self
    }

    /// Selectors looked up so far, in order
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }

    /// Delivered interactions so far, e.g. `type:#search:hay`
    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().clone()
    }
}

#[async_trait]
impl DomPage for ScriptedPage {
    type Element = ScriptedElement;

    async fn find_element(
        &self,
        selector: &str,
        index: usize,
        timeout: Duration,
    ) -> Result<ScriptedElement, LookupError> {
        self.lookups.lock().push(selector.to_string());

        if self.hanging.contains(selector) {
            tokio::time::sleep(timeout).await;
            return Err(LookupError::Timeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }

        if let Some(delay) = self.delays.get(selector) {
            if *delay > timeout {
                tokio::time::sleep(timeout).await;
                return Err(LookupError::NotFound {
                    selector: selector.to_string(),
                    index,
                    found: 0,
                });
            }
            tokio::time::sleep(*delay).await;
        }

        let matches = self.elements.get(selector).cloned().unwrap_or_default();
        let found = matches.len();
        matches
            .into_iter()
            .nth(index)
            .map(|text| ScriptedElement {
                selector: selector.to_string(),
                index,
                text,
            })
            .ok_or_else(|| LookupError::NotFound {
                selector: selector.to_string(),
                index,
                found,
            })
    }

    async fn element_text(&self, element: &ScriptedElement) -> Result<String, InteractionError> {
        if self.stuck_text.contains(&element.selector) {
            futures::future::pending::<()>().await;
        }
        Ok(element.text.clone())
    }

    async fn type_text(
        &self,
        element: &ScriptedElement,
        text: &str,
    ) -> Result<(), InteractionError> {
        if self.stuck_actions.contains(&element.selector) {
            futures::future::pending::<()>().await;
        }
        if self.broken.contains(&element.selector) {
            return Err(InteractionError("element is not interactable".to_string()));
        }
        self.actions
            .lock()
            .push(format!("type:{}:{}", element.selector, text));
        Ok(())
    }

    async fn click(&self, element: &ScriptedElement) -> Result<(), InteractionError> {
        if self.stuck_actions.contains(&element.selector) {
            futures::future::pending::<()>().await;
        }
        if self.broken.contains(&element.selector) {
            return Err(InteractionError("element is not interactable".to_string()));
        }
        self.actions.lock().push(format!("click:{}", element.selector));
        Ok(())
    }
}
