//! ReactionHarvest command line: Chromium session, configuration and the
//! end-to-end run. Exposed as a library for integration testing.

pub mod app;
pub mod browser;
pub mod config;
pub mod presets;
