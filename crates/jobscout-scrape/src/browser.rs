//! Browser-automated board driver.
//!
//! For boards that block plain HTTP fetches. Drives one headless Chrome
//! session per discovery pass, configured to look like a regular profile:
//! the automation-controlled blink feature is disabled, the
//! `navigator.webdriver` flag is masked, and a realistic user-agent is set.
//! Navigation within a session is strictly sequential; the session is not
//! safe for concurrent use.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::browser::default_executable;
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use rand::Rng;
use tracing::{debug, info, warn};
use url::Url;

use jobscout_core::{Error, RelevanceFilter, Result, ScrapeConfig};

use crate::board::{parse_results, search_url, BoardSelectors};
use crate::driver::{Discovery, SourceDriver};

pub struct BrowserBoardDriver {
    source: String,
    base_url: Url,
    selectors: BoardSelectors,
    config: Arc<ScrapeConfig>,
    /// `None` means no Chrome/Chromium binary was found at construction;
    /// the driver is disabled and discovery short-circuits.
    chrome: Option<PathBuf>,
}

impl BrowserBoardDriver {
    pub fn new(source: impl Into<String>, base_url: &str, config: Arc<ScrapeConfig>) -> Result<Self> {
        Self::with_selectors(source, base_url, BoardSelectors::default(), config)
    }

    pub fn with_selectors(
        source: impl Into<String>,
        base_url: &str,
        selectors: BoardSelectors,
        config: Arc<ScrapeConfig>,
    ) -> Result<Self> {
        let source = source.into();
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid board URL {base_url}: {e}")))?;

        let chrome = match default_executable() {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(source = %source, error = %e,
                      "No browser runtime found, driver disabled");
                None
            }
        };

        Ok(Self {
            source,
            base_url,
            selectors,
            config,
            chrome,
        })
    }
}

#[async_trait]
impl SourceDriver for BrowserBoardDriver {
    fn source(&self) -> &str {
        &self.source
    }

    fn is_enabled(&self) -> bool {
        self.chrome.is_some()
    }

    async fn discover(
        &self,
        search_terms: &[String],
        location: Option<&str>,
    ) -> Result<Discovery> {
        let Some(chrome) = self.chrome.clone() else {
            warn!(source = %self.source, "Browser driver disabled, returning no candidates");
            return Ok(Discovery::empty());
        };

        let terms = if search_terms.is_empty() {
            self.config.search_terms.clone()
        } else {
            search_terms.to_vec()
        };
        let locations = match location {
            Some(l) => vec![l.to_string()],
            None => self.config.locations.clone(),
        };

        let source = self.source.clone();
        let base_url = self.base_url.clone();
        let selectors = self.selectors.clone();
        let config = self.config.clone();

        // headless_chrome is synchronous; keep the whole session on the
        // blocking pool.
        let discovery = tokio::task::spawn_blocking(move || {
            run_session(chrome, source, base_url, selectors, config, terms, locations)
        })
        .await
        .map_err(|e| Error::Internal(format!("browser task panicked: {e}")))??;

        info!(
            source = %self.source,
            fetched = discovery.candidates.len(),
            skipped = discovery.failed,
            "Browser scrape finished"
        );
        Ok(discovery)
    }
}

/// One session across the full term × location cross-product.
///
/// The session guard releases the browser on every exit path, including
/// the error returns below.
fn run_session(
    chrome: PathBuf,
    source: String,
    base_url: Url,
    selectors: BoardSelectors,
    config: Arc<ScrapeConfig>,
    terms: Vec<String>,
    locations: Vec<String>,
) -> Result<Discovery> {
    let session = BrowserSession::launch(chrome, &config)?;
    let relevance = RelevanceFilter::new(&config.relevance_keywords);
    let mut discovery = Discovery::empty();
    let mut first = true;

    for term in &terms {
        for loc in &locations {
            if !first {
                pause_between_pairs(config.pair_delay());
            }
            first = false;

            let url = search_url(&base_url, term, loc, config.recency_days);
            debug!(source = %source, %url, "Navigating to search page");

            match session.fetch_results_page(url.as_str(), &selectors.card, config.page_timeout())
            {
                Ok(html) => {
                    let batch = parse_results(
                        &html,
                        &selectors,
                        &source,
                        &base_url,
                        &relevance,
                        config.max_results_per_pair,
                    );
                    discovery.candidates.extend(batch.candidates);
                    discovery.failed += batch.failed;
                }
                Err(e) => {
                    // Pair-level: timed out or failed to load, zero results
                    // for this pair.
                    warn!(source = %source, term, location = loc, error = %e,
                          "Results did not appear, continuing with next pair");
                }
            }
        }
    }

    Ok(discovery)
}

/// Rate-shaping: base delay plus jitter so navigations don't land on a
/// fixed beat.
fn pause_between_pairs(base: Duration) {
    let jitter = rand::thread_rng().gen_range(0..250u64);
    std::thread::sleep(base + Duration::from_millis(jitter));
}

/// Owning guard around one headless Chrome session.
///
/// Dropping it tears the browser process down, so every exit path from
/// [`run_session`] releases the session.
struct BrowserSession {
    browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserSession {
    fn launch(chrome: PathBuf, config: &ScrapeConfig) -> Result<Self> {
        let args = vec![
            OsStr::new("--disable-blink-features=AutomationControlled"),
            OsStr::new("--disable-dev-shm-usage"),
        ];
        let options = LaunchOptionsBuilder::default()
            .path(Some(chrome))
            .headless(true)
            .sandbox(false)
            .window_size(Some((1920, 1080)))
            .args(args)
            .build()
            .map_err(|e| Error::Browser(format!("bad launch options: {e}")))?;

        let browser =
            Browser::new(options).map_err(|e| Error::Browser(format!("launch failed: {e}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| Error::Browser(format!("tab open failed: {e}")))?;

        tab.set_user_agent(&config.user_agent, None, None)
            .map_err(|e| Error::Browser(format!("user-agent override failed: {e}")))?;
        // Mask the automation flag the way a regular profile reads.
        tab.evaluate(
            "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})",
            false,
        )
        .map_err(|e| Error::Browser(format!("webdriver mask failed: {e}")))?;

        debug!(pid = ?browser.get_process_id(), "Browser session ready");
        Ok(Self { browser, tab })
    }

    /// Navigate and wait for the results marker, then hand back the DOM.
    fn fetch_results_page(&self, url: &str, marker: &str, timeout: Duration) -> Result<String> {
        self.tab
            .navigate_to(url)
            .map_err(|e| Error::Browser(format!("navigation failed: {e}")))?;
        self.tab
            .wait_for_element_with_custom_timeout(marker, timeout)
            .map_err(|e| Error::Browser(format!("results marker not found: {e}")))?;
        self.tab
            .get_content()
            .map_err(|e| Error::Browser(format!("content read failed: {e}")))
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        debug!(pid = ?self.browser.get_process_id(), "Browser session closed");
    }
}
