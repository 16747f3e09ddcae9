//! Static HTML snapshot page
//!
//! Runs rule tables against saved markup with `scraper`. Nothing on a
//! snapshot ever appears later, so lookups answer immediately. Typing and
//! clicking cannot change the document; they are recorded instead.

use super::{normalize_text, DomPage, InteractionError, LookupError};
use async_trait::async_trait;
use parking_lot::Mutex;
use scraper::{Html, Selector};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Interaction recorded by an [`HtmlPage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// Text typed into a match
    Typed {
        /// Selector of the target
        selector: String,
        /// Match index of the target
        index: usize,
        /// Typed text
        text: String,
    },
    /// Click on a match
    Clicked {
        /// Selector of the target
        selector: String,
        /// Match index of the target
        index: usize,
    },
}

/// Element resolved from a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlElement {
    selector: String,
    index: usize,
    text: String,
}

/// Page backed by an HTML string
pub struct HtmlPage {
    html: String,
    interactions: Mutex<Vec<Interaction>>,
}

impl HtmlPage {
    /// Wrap a document
    pub fn new<S: Into<String>>(html: S) -> Self {
        Self {
            html: html.into(),
            interactions: Mutex::new(Vec::new()),
        }
    }

    /// Read a snapshot from disk
    pub fn from_path(path: &Path) -> crate::Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }

    /// Interactions performed so far, oldest first
    pub fn interactions(&self) -> Vec<Interaction> {
        self.interactions.lock().clone()
    }

    /// Normalized text of every match, in document order
    fn select_texts(&self, selector: &str) -> Result<Vec<String>, LookupError> {
        let parsed = Selector::parse(selector).map_err(|e| LookupError::InvalidSelector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;
        let document = Html::parse_document(&self.html);
        Ok(document
            .select(&parsed)
            .map(|el| normalize_text(&el.text().collect::<String>()))
            .collect())
    }
}

#[async_trait]
impl DomPage for HtmlPage {
    type Element = HtmlElement;

    async fn find_element(
        &self,
        selector: &str,
        index: usize,
        _timeout: Duration,
    ) -> Result<HtmlElement, LookupError> {
        let texts = self.select_texts(selector)?;
        let found = texts.len();
        debug!("{} match(es) for '{}'", found, selector);
        texts
            .into_iter()
            .nth(index)
            .map(|text| HtmlElement {
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

    async fn element_text(&self, element: &HtmlElement) -> Result<String, InteractionError> {
        Ok(element.text.clone())
    }

    async fn type_text(&self, element: &HtmlElement, text: &str) -> Result<(), InteractionError> {
        self.interactions.lock().push(Interaction::Typed {
            selector: element.selector.clone(),
            index: element.index,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn click(&self, element: &HtmlElement) -> Result<(), InteractionError> {
        self.interactions.lock().push(Interaction::Clicked {
            selector: element.selector.clone(),
            index: element.index,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
        <html><body>
            <input type="search" value="">
            <h1 class="title">  The Hay-Adams </h1>
            <ul><li>one</li><li>two</li><li>three</li></ul>
        </body></html>
    "#;

    #[tokio::test]
    async fn test_find_element_by_index() {
        let page = HtmlPage::new(DOC);
        let el = page
            .find_element("li", 1, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(page.element_text(&el).await.unwrap(), "two");
    }

    #[tokio::test]
    async fn test_find_element_reports_match_count() {
        let page = HtmlPage::new(DOC);
        let err = page
            .find_element("li", 5, Duration::from_millis(10))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LookupError::NotFound {
                selector: "li".to_string(),
                index: 5,
                found: 3,
            }
        );
    }

    #[tokio::test]
    async fn test_text_is_trimmed() {
        let page = HtmlPage::new(DOC);
        let el = page
            .find_element("h1.title", 0, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(page.element_text(&el).await.unwrap(), "The Hay-Adams");
    }

    #[tokio::test]
    async fn test_multi_line_text_is_collapsed() {
        let page = HtmlPage::new(
            r#"<div class="about">
                Overlooking the White House
                and <b>Lafayette</b>   Square.
            </div>"#,
        );
        let el = page
            .find_element("div.about", 0, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(
            page.element_text(&el).await.unwrap(),
            "Overlooking the White House and Lafayette Square."
        );
    }

    #[tokio::test]
    async fn test_invalid_selector() {
        let page = HtmlPage::new(DOC);
        let err = page.find_element("h1[", 0, Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidSelector { .. }));
    }

    #[tokio::test]
    async fn test_interactions_are_recorded() {
        let page = HtmlPage::new(DOC);
        let input = page
            .find_element(r#"input[type="search"]"#, 0, Duration::ZERO)
            .await
            .unwrap();
        page.type_text(&input, "The Hay-Adams").await.unwrap();
        page.click(&input).await.unwrap();

        assert_eq!(
            page.interactions(),
            vec![
                Interaction::Typed {
                    selector: r#"input[type="search"]"#.to_string(),
                    index: 0,
                    text: "The Hay-Adams".to_string(),
                },
                Interaction::Clicked {
                    selector: r#"input[type="search"]"#.to_string(),
                    index: 0,
                },
            ]
        );
    }
}
