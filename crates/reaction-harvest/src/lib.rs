//! ReactionHarvest: exhaust a lazily-loaded list inside a live page, then
//! extract one fault-tolerant record per entry.
//!
//! The browser is reached only through the [`Document`] and [`Element`]
//! traits, so everything here can be driven by Chromium or by a scripted
//! in-memory page.

pub mod config;
pub mod exhaustion;
pub mod extract;
pub mod field;
pub mod harvest;
pub mod page;
pub mod session;
pub mod sink;
pub mod types;

pub use config::{FieldLocator, FieldLocators, FieldSource, HarvestConfig, ListSelectors, Timing};
pub use exhaustion::{detect_exhaustion, ExhaustionOutcome, ScrollPhase, ScrollPolicy, ScrollState};
pub use extract::{extract_all, extract_records, Extraction};
pub use field::{
    resolve_field, resolve_field_with_fallback, try_resolve_field, try_resolve_field_with_fallback,
    OrEmpty,
};
pub use harvest::{harvest, HarvestReport, Harvester};
pub use page::{Document, Element, PageError, PageResult};
pub use session::SessionProvider;
pub use sink::{CsvSink, JsonSink, OutputSink, CSV_HEADERS};
pub use types::*;
