//! Harvest orchestrator: open the list, exhaust it, then extract it.
//!
//! Extraction never starts before detection has terminated, so the item
//! set cannot change underneath the enumeration.

use std::time::Duration;

use serde::Serialize;

use crate::config::HarvestConfig;
use crate::exhaustion::{detect_exhaustion, ExhaustionOutcome, ScrollPolicy};
use crate::extract::extract_records;
use crate::page::{Document, Element};
use crate::session::SessionProvider;
use crate::types::{FieldKind, FieldMisses, HarvestError, HarvestResult, Record};

/// Result of one harvest pass.
#[derive(Debug, Clone, Serialize)]
pub struct HarvestReport {
    pub records: Vec<Record>,
    pub exhaustion: ExhaustionOutcome,
    pub field_misses: FieldMisses,
}

impl HarvestReport {
    /// Whether the list may hold entries that were never rendered.
    pub fn possibly_incomplete(&self) -> bool {
        !self.exhaustion.is_exhausted()
    }
}

/// Runs a single best-effort harvest pass over one list.
pub struct Harvester {
    config: HarvestConfig,
}

impl Harvester {
    pub fn new(config: HarvestConfig) -> Self {
        Self { config }
    }

    /// Open the list, scroll it to exhaustion, and extract every entry.
    pub async fn run(&self, document: &dyn Document) -> HarvestResult<HarvestReport> {
        let selectors = &self.config.selectors;
        let timing = &self.config.timing;

        let trigger = document
            .wait_for_visible(&selectors.trigger, timing.open_timeout())
            .await
            .map_err(|e| HarvestError::EmptyOrUnopenable(format!("list control not found: {e}")))?;
        trigger
            .click()
            .await
            .map_err(|e| HarvestError::EmptyOrUnopenable(format!("list control not clickable: {e}")))?;
        tracing::info!("Opened list via '{}'", selectors.trigger);

        let container = document
            .wait_for_visible(&selectors.container, timing.container_timeout())
            .await
            .map_err(|e| HarvestError::ContainerUnavailable {
                timeout_ms: timing.container_timeout_ms,
                reason: e.to_string(),
            })?;

        let list = container
            .wait_for_child(&selectors.list, timing.open_timeout())
            .await
            .map_err(|e| HarvestError::EmptyOrUnopenable(format!("list root missing: {e}")))?;
        ensure_first_item_visible(list.as_ref(), &self.config).await?;

        let exhaustion =
            detect_exhaustion(container.as_ref(), &ScrollPolicy::from(timing)).await?;
        if let ExhaustionOutcome::AbortedAtBudget { attempts, height } = exhaustion {
            tracing::warn!(
                "Scroll budget of {attempts} cycles exhausted at height {height}; the list may be incomplete"
            );
        }

        let extraction = extract_records(list.as_ref(), &self.config).await?;
        tracing::info!("{} records extracted", extraction.records.len());
        for kind in FieldKind::ALL {
            let missed = extraction.misses.get(kind);
            if missed > 0 {
                tracing::info!("{missed} entries had no {}", kind.as_str());
            }
        }

        Ok(HarvestReport {
            records: extraction.records,
            exhaustion,
            field_misses: extraction.misses,
        })
    }

    /// Wait for `session` to authenticate, then harvest its current document.
    pub async fn run_session(
        &self,
        session: &dyn SessionProvider,
        auth_timeout: Duration,
    ) -> HarvestResult<HarvestReport> {
        session.await_authentication(auth_timeout).await?;
        let document = session.current_document().await?;
        self.run(document.as_ref()).await
    }
}

async fn ensure_first_item_visible(list: &dyn Element, config: &HarvestConfig) -> HarvestResult<()> {
    let timeout = config.timing.open_timeout();
    let first = list
        .wait_for_child(&config.selectors.item, timeout)
        .await
        .map_err(|e| HarvestError::EmptyOrUnopenable(format!("no entries appeared: {e}")))?;
    first
        .wait_until_visible(timeout)
        .await
        .map_err(|e| HarvestError::EmptyOrUnopenable(format!("first entry never visible: {e}")))
}

/// Harvest one list and return its records in list order.
pub async fn harvest(document: &dyn Document, config: &HarvestConfig) -> HarvestResult<Vec<Record>> {
    let report = Harvester::new(config.clone()).run(document).await?;
    Ok(report.records)
}
