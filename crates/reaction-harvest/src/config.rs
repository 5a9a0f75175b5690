//! Harvest configuration: selectors, field locators and timing.
//!
//! Nothing in here is site-specific. Selectors are always supplied by the
//! caller; only the timing knobs carry defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::FieldKind;

/// Everything a harvest pass needs to know about the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestConfig {
    pub selectors: ListSelectors,
    pub fields: FieldLocators,
    #[serde(default)]
    pub timing: Timing,
}

/// Selectors locating the list and its entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSelectors {
    /// Control that reveals the list when clicked.
    pub trigger: String,
    /// Scrollable container around the list.
    pub container: String,
    /// List root, relative to the container.
    pub list: String,
    /// One entry, relative to the list root.
    pub item: String,
}

/// Where a field's value is read from once its element is found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    #[default]
    Text,
    Attribute(String),
}

/// Locates one field relative to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLocator {
    pub selector: String,
    #[serde(default)]
    pub source: FieldSource,
}

impl FieldLocator {
    pub fn text(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            source: FieldSource::Text,
        }
    }

    pub fn attribute(selector: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            source: FieldSource::Attribute(name.into()),
        }
    }
}

/// One locator per record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLocators {
    pub user_name: FieldLocator,
    pub current_role: FieldLocator,
    pub profile_link: FieldLocator,
    pub reaction_type: FieldLocator,
}

impl FieldLocators {
    pub fn get(&self, kind: FieldKind) -> &FieldLocator {
        match kind {
            FieldKind::UserName => &self.user_name,
            FieldKind::CurrentRole => &self.current_role,
            FieldKind::ProfileLink => &self.profile_link,
            FieldKind::ReactionType => &self.reaction_type,
        }
    }
}

/// Waits, budgets and thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Debounce after each scroll before measuring again.
    pub stabilization_wait_ms: u64,
    /// Scroll cycles allowed, shared between growth and stabilization.
    pub max_scroll_attempts: u32,
    /// Consecutive non-growing cycles needed to declare exhaustion.
    pub stable_threshold: u32,
    /// Bound on waiting for the scrollable container to become visible.
    pub container_timeout_ms: u64,
    /// Bound on waiting for one field's element to attach.
    pub field_attach_wait_ms: u64,
    /// Bound on waiting for the trigger, list root and first entry.
    pub open_timeout_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            stabilization_wait_ms: 1000,
            max_scroll_attempts: 300,
            stable_threshold: 3,
            container_timeout_ms: 30_000,
            field_attach_wait_ms: 3000,
            open_timeout_ms: 10_000,
        }
    }
}

impl Timing {
    pub fn stabilization_wait(&self) -> Duration {
        Duration::from_millis(self.stabilization_wait_ms)
    }

    pub fn container_timeout(&self) -> Duration {
        Duration::from_millis(self.container_timeout_ms)
    }

    pub fn field_attach_wait(&self) -> Duration {
        Duration::from_millis(self.field_attach_wait_ms)
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }
}
