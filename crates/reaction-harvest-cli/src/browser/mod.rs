//! Chromium session with a persistent profile.
//!
//! The profile directory keeps cookies between runs, so an interactive
//! sign-in only has to happen once. The session launches headful by default
//! so the user can complete that sign-in in the browser window.

pub mod page;

pub use page::{ChromiumDocument, ChromiumElement};

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use reaction_harvest::{Document, HarvestError, HarvestResult, SessionProvider};

use crate::presets;

/// Interval between sign-in checks.
const AUTH_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Find the Chromium binary path.
pub fn find_chromium(explicit: Option<&Path>) -> Option<PathBuf> {
    // 1. Explicit path from config or flags
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        tracing::warn!("Configured Chromium path does not exist: {}", path.display());
    }

    // 2. REACTION_HARVEST_CHROMIUM env
    if let Ok(p) = std::env::var("REACTION_HARVEST_CHROMIUM") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 3. System PATH
    for name in [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Default persistent profile location.
pub fn default_profile_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".reaction-harvest")
        .join("profile")
}

/// How the browser session is launched and gated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Persistent user-data directory. Defaults to `~/.reaction-harvest/profile`.
    pub profile_dir: Option<PathBuf>,
    /// Run without a visible window. Sign-in is impossible when headless.
    pub headless: bool,
    /// Chromium binary; searched for when unset.
    pub chromium_path: Option<PathBuf>,
    /// Present only once the user is signed in.
    pub logged_in_selector: String,
    pub auth_timeout_secs: u64,
    pub navigation_timeout_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            profile_dir: None,
            headless: false,
            chromium_path: None,
            logged_in_selector: presets::LINKEDIN_LOGGED_IN.to_string(),
            auth_timeout_secs: 300,
            navigation_timeout_ms: 60_000,
        }
    }
}

impl SessionSettings {
    pub fn resolved_profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(default_profile_dir)
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

/// A launched Chromium instance with one page.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    logged_in_selector: String,
    /// Last navigation target, revisited after an interactive sign-in.
    target: Mutex<Option<(String, Duration)>>,
}

impl ChromiumSession {
    /// Launch Chromium against the configured profile directory.
    pub async fn launch(settings: &SessionSettings) -> Result<Self> {
        let chrome_path = find_chromium(settings.chromium_path.as_deref()).context(
            "Chromium not found. Install Chrome or set REACTION_HARVEST_CHROMIUM.",
        )?;

        let profile_dir = settings.resolved_profile_dir();
        std::fs::create_dir_all(&profile_dir).with_context(|| {
            format!("failed to create profile directory {}", profile_dir.display())
        })?;
        tracing::info!("Using browser profile: {}", profile_dir.display());

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .user_data_dir(&profile_dir)
            .viewport(None)
            .arg("--disable-dev-shm-usage")
            .arg("--disable-background-networking");
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser event error: {e}");
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        Ok(Self {
            browser,
            page,
            handler,
            logged_in_selector: settings.logged_in_selector.clone(),
            target: Mutex::new(None),
        })
    }

    /// Navigate the session's page to `url`.
    pub async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        if let Ok(mut target) = self.target.lock() {
            *target = Some((url.to_string(), timeout));
        }
        goto(&self.page, url, timeout).await
    }

    /// The session's page as a harvestable document.
    pub fn document(&self) -> ChromiumDocument {
        ChromiumDocument::new(self.page.clone())
    }

    /// Close the page and shut the browser down.
    pub async fn close(self) -> Result<()> {
        let Self {
            mut browser,
            page,
            handler,
            ..
        } = self;
        let _ = page.close().await;
        browser.close().await.context("failed to close Chromium")?;
        let _ = browser.wait().await;
        handler.abort();
        Ok(())
    }

    async fn current_url(&self) -> Option<String> {
        self.page.url().await.ok().flatten()
    }
}

async fn goto(page: &Page, url: &str, timeout: Duration) -> Result<()> {
    let result = tokio::time::timeout(timeout, page.goto(url)).await;
    match result {
        Ok(Ok(_)) => {
            let _ = page.wait_for_navigation().await;
            tracing::info!("Navigated to {url}");
            Ok(())
        }
        Ok(Err(e)) => bail!("navigation failed: {e}"),
        Err(_) => bail!("navigation timed out after {}ms", timeout.as_millis()),
    }
}

/// Whether two URLs point at the same page, ignoring the fragment and a
/// trailing slash.
fn same_page(a: &str, b: &str) -> bool {
    let (Ok(a), Ok(b)) = (url::Url::parse(a), url::Url::parse(b)) else {
        return a == b;
    };
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
        && a.path().trim_end_matches('/') == b.path().trim_end_matches('/')
        && a.query() == b.query()
}

#[async_trait]
impl SessionProvider for ChromiumSession {
    async fn current_document(&self) -> HarvestResult<Box<dyn Document>> {
        let target = self.target.lock().ok().and_then(|t| t.clone());
        if let Some((url, timeout)) = target {
            // Signing in usually redirects away from the target.
            let here = self.current_url().await;
            if !here.as_deref().is_some_and(|here| same_page(here, &url)) {
                goto(&self.page, &url, timeout)
                    .await
                    .map_err(|e| HarvestError::Session(format!("{e:#}")))?;
            }
        }
        Ok(Box::new(self.document()))
    }

    async fn await_authentication(&self, timeout: Duration) -> HarvestResult<()> {
        let deadline = Instant::now() + timeout;
        let mut prompted = false;
        loop {
            if self.page.find_element(&self.logged_in_selector).await.is_ok() {
                tracing::info!("Session is signed in");
                return Ok(());
            }
            if !prompted {
                tracing::warn!(
                    "Not signed in. Complete sign-in in the browser window (waiting up to {}s)",
                    timeout.as_secs()
                );
                prompted = true;
            }
            if Instant::now() >= deadline {
                return Err(HarvestError::AuthTimeout(timeout.as_secs()));
            }
            tokio::time::sleep(AUTH_POLL_INTERVAL).await;
        }
    }
}
