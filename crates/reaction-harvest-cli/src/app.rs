//! End-to-end run: launch, navigate, authenticate, harvest, persist.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use reaction_harvest::{
    CsvSink, ExhaustionOutcome, FieldMisses, HarvestError, HarvestReport, Harvester, JsonSink,
    OutputSink, Record,
};

use crate::browser::ChromiumSession;
use crate::config::{AppConfig, OutputFormat};

/// What a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub output: PathBuf,
    pub records: usize,
    pub exhaustion: ExhaustionOutcome,
    pub field_misses: FieldMisses,
}

/// Validate the target URL before any browser is launched.
pub fn parse_target(config: &AppConfig) -> Result<url::Url> {
    let Some(raw) = config.target_url.as_deref() else {
        bail!("no target URL; pass one on the command line or set target_url in the config file");
    };
    let url = url::Url::parse(raw).with_context(|| format!("invalid target URL: {raw}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("target URL must be http or https: {raw}");
    }
    Ok(url)
}

/// Build the sink selected by the output settings.
pub fn make_sink(format: OutputFormat, path: PathBuf) -> Box<dyn OutputSink> {
    match format {
        OutputFormat::Csv => Box::new(CsvSink::new(path)),
        OutputFormat::Json => Box::new(JsonSink::new(path)),
    }
}

/// Persist `records`, logging path and cause on failure.
pub fn persist(sink: &mut dyn OutputSink, records: &[Record]) -> Result<()> {
    match sink.write(records) {
        Ok(()) => Ok(()),
        Err(e @ HarvestError::PersistenceFailure { .. }) => {
            tracing::error!("{e}");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Harvest the configured list once and write it out.
pub async fn run(config: AppConfig) -> Result<RunSummary> {
    let target = parse_target(&config)?;
    let output = config.output.resolved_path();

    let session = ChromiumSession::launch(&config.session).await?;
    let harvested = harvest_with(&session, &config, target.as_str()).await;
    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close browser cleanly: {e:#}");
    }
    let report = harvested?;

    let mut sink = make_sink(config.output.format, output.clone());
    persist(sink.as_mut(), &report.records)?;

    Ok(RunSummary {
        output,
        records: report.records.len(),
        exhaustion: report.exhaustion,
        field_misses: report.field_misses,
    })
}

async fn harvest_with(
    session: &ChromiumSession,
    config: &AppConfig,
    target: &str,
) -> Result<HarvestReport> {
    session
        .navigate(target, config.session.navigation_timeout())
        .await?;
    let harvester = Harvester::new(config.harvest.clone());
    let report = harvester
        .run_session(session, config.session.auth_timeout())
        .await
        .context("harvest failed")?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_url(url: &str) -> AppConfig {
        AppConfig {
            target_url: Some(url.to_string()),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_missing_target_is_rejected() {
        let err = parse_target(&AppConfig::default()).unwrap_err();
        assert!(err.to_string().contains("no target URL"));
    }

    #[test]
    fn test_non_http_target_is_rejected() {
        assert!(parse_target(&with_url("ftp://example.com/post")).is_err());
        assert!(parse_target(&with_url("not a url")).is_err());
    }

    #[test]
    fn test_https_target_is_accepted() {
        let url = parse_target(&with_url("https://www.linkedin.com/posts/abc")).unwrap();
        assert_eq!(url.host_str(), Some("www.linkedin.com"));
    }

    #[test]
    fn test_sink_follows_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut sink = make_sink(OutputFormat::Json, path.clone());
        let records = vec![Record {
            index: 1,
            user_name: "Ada".to_string(),
            ..Record::default()
        }];

        persist(sink.as_mut(), &records).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.trim_start().starts_with('['));
        assert!(text.contains("\"userName\": \"Ada\""));
    }

    #[test]
    fn test_persist_failure_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = make_sink(OutputFormat::Csv, dir.path().to_path_buf());

        let err = persist(sink.as_mut(), &[]).unwrap_err();
        assert!(err.to_string().contains(&dir.path().display().to_string()));
    }
}
