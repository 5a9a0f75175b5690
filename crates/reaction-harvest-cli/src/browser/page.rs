//! `Document` and `Element` backed by a live Chromium page.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use tokio::time::Instant;

use reaction_harvest::{Document, Element, PageError, PageResult};

/// Interval between polls while waiting on the page.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

const IS_VISIBLE_JS: &str = r#"function() {
    if (!this.isConnected) { return false; }
    const style = window.getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    return style.display !== 'none' && style.visibility !== 'hidden'
        && rect.width > 0 && rect.height > 0;
}"#;

const SCROLL_HEIGHT_JS: &str = "function() { return this.scrollHeight; }";

const SCROLL_TO_END_JS: &str = "function() { this.scrollTop = this.scrollHeight; }";

fn page_error(e: CdpError) -> PageError {
    match e {
        CdpError::NotFound => PageError::NotFound("element".to_string()),
        other => {
            let message = other.to_string();
            if message.contains("No node") || message.contains("not attached") {
                PageError::Detached
            } else {
                PageError::Browser(message)
            }
        }
    }
}

/// The page a Chromium session is positioned at.
#[derive(Clone)]
pub struct ChromiumDocument {
    page: Page,
}

impl ChromiumDocument {
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

#[async_trait]
impl Document for ChromiumDocument {
    async fn wait_for_visible(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> PageResult<Box<dyn Element>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = self.page.find_element(selector).await {
                let element = ChromiumElement { element };
                if element.is_visible().await.unwrap_or(false) {
                    return Ok(Box::new(element));
                }
            }
            if Instant::now() >= deadline {
                return Err(PageError::timeout(selector, timeout));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// One node of a Chromium page.
pub struct ChromiumElement {
    element: chromiumoxide::element::Element,
}

impl ChromiumElement {
    async fn call(&self, function: &str) -> PageResult<Option<serde_json::Value>> {
        let returns = self
            .element
            .call_js_fn(function, false)
            .await
            .map_err(page_error)?;
        Ok(returns.result.value)
    }

    async fn is_visible(&self) -> PageResult<bool> {
        Ok(self
            .call(IS_VISIBLE_JS)
            .await?
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }
}

#[async_trait]
impl Element for ChromiumElement {
    async fn wait_for_child(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> PageResult<Box<dyn Element>> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.element.find_element(selector).await {
                Ok(element) => return Ok(Box::new(ChromiumElement { element })),
                Err(CdpError::NotFound) => {}
                Err(e) => return Err(page_error(e)),
            }
            if Instant::now() >= deadline {
                return Err(PageError::timeout(selector, timeout));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn find_child(&self, selector: &str) -> PageResult<Option<Box<dyn Element>>> {
        match self.element.find_element(selector).await {
            Ok(element) => Ok(Some(Box::new(ChromiumElement { element }))),
            Err(CdpError::NotFound) => Ok(None),
            Err(e) => Err(page_error(e)),
        }
    }

    async fn find_children(&self, selector: &str) -> PageResult<Vec<Box<dyn Element>>> {
        let elements = self
            .element
            .find_elements(selector)
            .await
            .map_err(page_error)?;
        Ok(elements
            .into_iter()
            .map(|element| Box::new(ChromiumElement { element }) as Box<dyn Element>)
            .collect())
    }

    async fn wait_until_visible(&self, timeout: Duration) -> PageResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_visible().await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(PageError::timeout("<element>", timeout));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn text(&self) -> PageResult<String> {
        Ok(self
            .element
            .inner_text()
            .await
            .map_err(page_error)?
            .unwrap_or_default())
    }

    async fn attribute(&self, name: &str) -> PageResult<Option<String>> {
        self.element.attribute(name).await.map_err(page_error)
    }

    async fn click(&self) -> PageResult<()> {
        self.element.click().await.map_err(page_error)?;
        Ok(())
    }

    async fn scroll_height(&self) -> PageResult<u64> {
        let value = self.call(SCROLL_HEIGHT_JS).await?;
        value
            .and_then(|v| v.as_f64())
            .map(|h| h.max(0.0) as u64)
            .ok_or_else(|| PageError::Script("scrollHeight is not a number".to_string()))
    }

    async fn scroll_to_end(&self) -> PageResult<()> {
        self.call(SCROLL_TO_END_JS).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{ChromiumSession, SessionSettings};

    #[test]
    fn test_not_found_maps_to_not_found() {
        assert!(matches!(page_error(CdpError::NotFound), PageError::NotFound(_)));
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_scroll_and_extract() {
        let profile = tempfile::tempdir().unwrap();
        let settings = SessionSettings {
            headless: true,
            profile_dir: Some(profile.path().to_path_buf()),
            ..SessionSettings::default()
        };
        let session = ChromiumSession::launch(&settings)
            .await
            .expect("failed to launch Chromium");

        let items: String = (1..=40)
            .map(|i| format!("<li><span class='n'> Person {i} </span></li>"))
            .collect();
        let html = format!(
            "data:text/html,<div id='c' style='height:100px;overflow:auto'><ul>{items}</ul></div>"
        );
        session
            .navigate(&html, Duration::from_secs(10))
            .await
            .expect("navigation failed");

        let document = session.document();
        let container = document
            .wait_for_visible("#c", Duration::from_secs(5))
            .await
            .expect("container not visible");
        let before = container.scroll_height().await.unwrap();
        assert!(before > 100);
        container.scroll_to_end().await.unwrap();

        let list = container.wait_for_child("ul", Duration::from_secs(1)).await.unwrap();
        let entries = list.find_children("li").await.unwrap();
        assert_eq!(entries.len(), 40);
        let name = entries[0]
            .wait_for_child("span.n", Duration::from_secs(1))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(name.trim(), "Person 1");

        session.close().await.expect("close failed");
    }
}
