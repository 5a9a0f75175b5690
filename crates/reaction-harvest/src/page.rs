//! Page abstraction for a live, interactive document.
//!
//! Defines the `Document` and `Element` traits that abstract over the
//! browser engine. The harvest core only ever sees these traits.

use std::time::Duration;

use async_trait::async_trait;

/// Faults raised by a page operation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("No element matches '{0}'")]
    NotFound(String),

    #[error("Timed out after {timeout_ms}ms waiting for '{selector}'")]
    Timeout { selector: String, timeout_ms: u64 },

    #[error("Element is no longer attached to the document")]
    Detached,

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Browser error: {0}")]
    Browser(String),
}

impl PageError {
    pub fn timeout(selector: &str, timeout: Duration) -> Self {
        PageError::Timeout {
            selector: selector.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }
}

/// Convenience result type for page operations.
pub type PageResult<T> = Result<T, PageError>;

/// A navigable document positioned at the target resource.
#[async_trait]
pub trait Document: Send + Sync {
    /// Wait for the first element matching `selector` to be visible.
    async fn wait_for_visible(&self, selector: &str, timeout: Duration)
        -> PageResult<Box<dyn Element>>;
}

/// One node of the document: a container, a list entry, or a leaf.
///
/// Handles are only valid for the snapshot they were taken from.
#[async_trait]
pub trait Element: Send + Sync {
    /// Wait up to `timeout` for a descendant matching `selector` to attach.
    async fn wait_for_child(&self, selector: &str, timeout: Duration)
        -> PageResult<Box<dyn Element>>;
    /// Look up a descendant without waiting.
    async fn find_child(&self, selector: &str) -> PageResult<Option<Box<dyn Element>>>;
    /// All descendants matching `selector`, in document order.
    async fn find_children(&self, selector: &str) -> PageResult<Vec<Box<dyn Element>>>;
    /// Wait up to `timeout` for this element to become visible.
    async fn wait_until_visible(&self, timeout: Duration) -> PageResult<()>;
    /// Text content of this element.
    async fn text(&self) -> PageResult<String>;
    /// Value of the named attribute, if present.
    async fn attribute(&self, name: &str) -> PageResult<Option<String>>;
    /// Click this element.
    async fn click(&self) -> PageResult<()>;
    /// Current scrollable extent in pixels.
    async fn scroll_height(&self) -> PageResult<u64>;
    /// Scroll this element to its maximum offset.
    async fn scroll_to_end(&self) -> PageResult<()>;
}
