//! Boundary to whatever owns the authenticated browser session.

use std::time::Duration;

use async_trait::async_trait;

use crate::page::Document;
use crate::types::HarvestResult;

/// Supplies an authenticated document positioned at the target resource.
///
/// Credentials, interactive sign-in and profile persistence all live behind
/// this trait; the harvest core only uses it as a precondition gate.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The document the harvest should run against.
    async fn current_document(&self) -> HarvestResult<Box<dyn Document>>;

    /// Block until the session is authenticated, or fail with
    /// [`HarvestError::AuthTimeout`](crate::HarvestError::AuthTimeout).
    async fn await_authentication(&self, timeout: Duration) -> HarvestResult<()>;
}
