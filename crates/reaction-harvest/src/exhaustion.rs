//! List exhaustion detector.
//!
//! Scrolls a lazily-rendered container to its end, waits for rendering to
//! settle, and measures the scrollable extent again. Growth is the only
//! progress signal, so the list is judged exhausted once the extent has
//! stopped growing for `stable_threshold` consecutive cycles.
//!
//! ```text
//!   Growing <──grew── (cycle) ──flat──> Stabilizing
//!      │                                    │ stable >= K && height > 0
//!      └──── attempt == max ────┐           v
//!                        AbortedAtBudget  Exhausted
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Timing;
use crate::page::Element;
use crate::types::{HarvestError, HarvestResult};

/// Phase of one detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollPhase {
    /// The last cycle increased the scrollable extent.
    Growing,
    /// The last cycle did not grow, but not enough flat cycles yet.
    Stabilizing,
    /// Terminal: no further entries are expected.
    Exhausted,
    /// Terminal: the attempt budget ran out first.
    AbortedAtBudget,
}

impl ScrollPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScrollPhase::Exhausted | ScrollPhase::AbortedAtBudget)
    }
}

/// How a detection pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExhaustionOutcome {
    /// Growth stopped; the list is complete.
    Exhausted { attempts: u32, height: u64 },
    /// Budget ran out; the list may be incomplete.
    AbortedAtBudget { attempts: u32, height: u64 },
}

impl ExhaustionOutcome {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, ExhaustionOutcome::Exhausted { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            ExhaustionOutcome::Exhausted { attempts, .. }
            | ExhaustionOutcome::AbortedAtBudget { attempts, .. } => *attempts,
        }
    }

    pub fn height(&self) -> u64 {
        match self {
            ExhaustionOutcome::Exhausted { height, .. }
            | ExhaustionOutcome::AbortedAtBudget { height, .. } => *height,
        }
    }
}

/// Parameters for one detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPolicy {
    pub stabilization_wait: Duration,
    pub max_attempts: u32,
    pub stable_threshold: u32,
    pub visibility_timeout: Duration,
}

impl ScrollPolicy {
    pub fn new(stabilization_wait: Duration, max_attempts: u32) -> Self {
        let timing = Timing::default();
        Self {
            stabilization_wait,
            max_attempts,
            stable_threshold: timing.stable_threshold,
            visibility_timeout: timing.container_timeout(),
        }
    }
}

impl From<&Timing> for ScrollPolicy {
    fn from(timing: &Timing) -> Self {
        Self {
            stabilization_wait: timing.stabilization_wait(),
            max_attempts: timing.max_scroll_attempts,
            stable_threshold: timing.stable_threshold,
            visibility_timeout: timing.container_timeout(),
        }
    }
}

/// Mutable counters of one detection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    pub previous_height: u64,
    pub attempt: u32,
    pub consecutive_stable: u32,
}

/// Pure transition for one measured cycle.
///
/// Returns the next phase and the new consecutive-stable count. Never
/// returns `AbortedAtBudget`; the budget is enforced by the caller.
pub fn transition(
    height_before: u64,
    height_after: u64,
    consecutive_stable: u32,
    stable_threshold: u32,
) -> (ScrollPhase, u32) {
    if height_after > height_before {
        return (ScrollPhase::Growing, 0);
    }

    let stable = consecutive_stable + 1;
    if stable >= stable_threshold && height_after > 0 {
        (ScrollPhase::Exhausted, stable)
    } else {
        (ScrollPhase::Stabilizing, stable)
    }
}

/// Scroll `container` until its extent stops growing or the budget runs out.
///
/// Fails only if the container never becomes visible, or if the page
/// rejects a measurement or scroll command. Running out of budget is a
/// normal outcome.
pub async fn detect_exhaustion(
    container: &dyn Element,
    policy: &ScrollPolicy,
) -> HarvestResult<ExhaustionOutcome> {
    container
        .wait_until_visible(policy.visibility_timeout)
        .await
        .map_err(|e| HarvestError::ContainerUnavailable {
            timeout_ms: policy.visibility_timeout.as_millis() as u64,
            reason: e.to_string(),
        })?;

    let mut state = ScrollState::default();
    let mut phase = if policy.max_attempts == 0 {
        ScrollPhase::AbortedAtBudget
    } else {
        ScrollPhase::Growing
    };

    while !phase.is_terminal() {
        let height_before = container.scroll_height().await?;
        container.scroll_to_end().await?;
        tokio::time::sleep(policy.stabilization_wait).await;
        let height_after = container.scroll_height().await?;

        let (next, stable) = transition(
            height_before,
            height_after,
            state.consecutive_stable,
            policy.stable_threshold,
        );
        state.consecutive_stable = stable;
        state.previous_height = height_after;
        state.attempt += 1;

        tracing::debug!(
            "Scroll cycle {}/{}: {height_before} -> {height_after} ({next:?}, stable {stable})",
            state.attempt,
            policy.max_attempts
        );

        phase = if next != ScrollPhase::Exhausted && state.attempt >= policy.max_attempts {
            ScrollPhase::AbortedAtBudget
        } else {
            next
        };
    }

    if phase == ScrollPhase::Exhausted {
        tracing::info!(
            "List exhausted after {} scroll cycles (height {})",
            state.attempt,
            state.previous_height
        );
        Ok(ExhaustionOutcome::Exhausted {
            attempts: state.attempt,
            height: state.previous_height,
        })
    } else {
        Ok(ExhaustionOutcome::AbortedAtBudget {
            attempts: state.attempt,
            height: state.previous_height,
        })
    }
}
