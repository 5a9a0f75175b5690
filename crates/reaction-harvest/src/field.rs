//! Field accessor: fault-isolated lookup of one value inside one entry.
//!
//! Lookups return `PageResult<String>` internally and are collapsed to an
//! empty string at the edge with [`OrEmpty::or_empty`], so a missing field
//! never reaches the record or the extraction loop as an error.

use std::time::Duration;

use crate::config::{FieldLocator, FieldSource};
use crate::page::{Element, PageError, PageResult};

/// Default-on-error combinator for field lookups.
pub trait OrEmpty {
    fn or_empty(self) -> String;
}

impl OrEmpty for PageResult<String> {
    fn or_empty(self) -> String {
        self.unwrap_or_else(|e| {
            tracing::debug!("Field defaulted to empty: {e}");
            String::new()
        })
    }
}

/// Resolve one field, waiting up to `attach_wait` for its element.
pub async fn try_resolve_field(
    item: &dyn Element,
    locator: &FieldLocator,
    attach_wait: Duration,
) -> PageResult<String> {
    let element = item.wait_for_child(&locator.selector, attach_wait).await?;
    read_value(element.as_ref(), &locator.source).await
}

/// Like [`try_resolve_field`], but when the bounded wait fails, make one
/// immediate lookup before giving up.
pub async fn try_resolve_field_with_fallback(
    item: &dyn Element,
    locator: &FieldLocator,
    attach_wait: Duration,
) -> PageResult<String> {
    match try_resolve_field(item, locator, attach_wait).await {
        Ok(value) => Ok(value),
        Err(primary) => {
            tracing::debug!(
                "Waiting for '{}' failed ({primary}), trying immediate lookup",
                locator.selector
            );
            match item.find_child(&locator.selector).await? {
                Some(element) => read_value(element.as_ref(), &locator.source).await,
                None => Err(primary),
            }
        }
    }
}

/// Resolve one field; any failure yields `""`.
pub async fn resolve_field(
    item: &dyn Element,
    locator: &FieldLocator,
    attach_wait: Duration,
) -> String {
    try_resolve_field(item, locator, attach_wait).await.or_empty()
}

/// Resolve one field with the immediate-lookup fallback; any failure yields `""`.
pub async fn resolve_field_with_fallback(
    item: &dyn Element,
    locator: &FieldLocator,
    attach_wait: Duration,
) -> String {
    try_resolve_field_with_fallback(item, locator, attach_wait)
        .await
        .or_empty()
}

async fn read_value(element: &dyn Element, source: &FieldSource) -> PageResult<String> {
    let raw = match source {
        FieldSource::Text => element.text().await?,
        FieldSource::Attribute(name) => element
            .attribute(name)
            .await?
            .ok_or_else(|| PageError::NotFound(format!("attribute '{name}'")))?,
    };
    Ok(raw.trim().to_string())
}
