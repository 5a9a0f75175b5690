//! Configuration loading and resolution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use reaction_harvest::{FieldLocators, HarvestConfig, ListSelectors, Timing};

use crate::browser::SessionSettings;
use crate::presets;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "REACTION_HARVEST_CONFIG";

/// Format of the output artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Where the harvested records are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Output file. Defaults to a timestamped name in the working directory.
    pub path: Option<PathBuf>,
    pub format: OutputFormat,
}

impl OutputSettings {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| default_output_path(self.format))
    }
}

/// `reactions_<YYYYmmdd_HHMMSS>.<ext>` in the working directory.
pub fn default_output_path(format: OutputFormat) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("reactions_{stamp}.{}", format.extension()))
}

/// Everything the command line needs for one run. Every section is optional
/// in the file; missing sections fall back to the built-in preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Page holding the list to harvest.
    pub target_url: Option<String>,
    pub session: SessionSettings,
    #[serde(deserialize_with = "deserialize_harvest")]
    pub harvest: HarvestConfig,
    pub output: OutputSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target_url: None,
            session: SessionSettings::default(),
            harvest: presets::linkedin_reactions(),
            output: OutputSettings::default(),
        }
    }
}

/// File-side harvest section; anything left out comes from the preset.
#[derive(Debug, Default, Deserialize)]
struct HarvestSection {
    selectors: Option<ListSelectors>,
    fields: Option<FieldLocators>,
    timing: Option<Timing>,
}

impl HarvestSection {
    fn merge_onto(self, mut base: HarvestConfig) -> HarvestConfig {
        if let Some(selectors) = self.selectors {
            base.selectors = selectors;
        }
        if let Some(fields) = self.fields {
            base.fields = fields;
        }
        if let Some(timing) = self.timing {
            base.timing = timing;
        }
        base
    }
}

fn deserialize_harvest<'de, D>(deserializer: D) -> std::result::Result<HarvestConfig, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let section = HarvestSection::deserialize(deserializer)?;
    Ok(section.merge_onto(presets::linkedin_reactions()))
}

/// Resolve the config file path.
pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(env_path));
    }

    let cwd_config = PathBuf::from(".reaction-harvest/config.json");
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    None
}

/// Load the config file at `path`, or the defaults when there is none.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    tracing::info!("Loaded config: {}", path.display());
    Ok(config)
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub url: Option<String>,
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub stabilization_wait_ms: Option<u64>,
    pub max_attempts: Option<u32>,
    pub headless: bool,
    pub profile_dir: Option<PathBuf>,
    pub chromium: Option<PathBuf>,
    pub auth_timeout_secs: Option<u64>,
}

impl Overrides {
    pub fn apply(self, config: &mut AppConfig) {
        if let Some(url) = self.url {
            config.target_url = Some(url);
        }
        if let Some(path) = self.output {
            config.output.path = Some(path);
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(wait) = self.stabilization_wait_ms {
            config.harvest.timing.stabilization_wait_ms = wait;
        }
        if let Some(attempts) = self.max_attempts {
            config.harvest.timing.max_scroll_attempts = attempts;
        }
        if self.headless {
            config.session.headless = true;
        }
        if let Some(dir) = self.profile_dir {
            config.session.profile_dir = Some(dir);
        }
        if let Some(chromium) = self.chromium {
            config.session.chromium_path = Some(chromium);
        }
        if let Some(secs) = self.auth_timeout_secs {
            config.session.auth_timeout_secs = secs;
        }
    }
}
