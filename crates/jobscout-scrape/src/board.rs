//! HTTP job-board driver.
//!
//! Fetches board search pages over plain HTTP and extracts result cards
//! with CSS selectors. The selector set is configuration, so one driver
//! type covers board layouts that only differ in markup. Boards that block
//! plain fetches get the browser driver instead.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use jobscout_core::{Error, RawCandidate, RelevanceFilter, Result, ScrapeConfig};

use crate::driver::{Discovery, SourceDriver};

/// CSS selectors describing a board's result markup.
#[derive(Debug, Clone)]
pub struct BoardSelectors {
    /// One result card. Doubles as the "results are present" marker for
    /// the browser driver.
    pub card: String,
    /// Attribute on the card carrying the permalink id. Required; cards
    /// without it are disqualified.
    pub id_attr: String,
    /// Title element whose `title` attribute holds the clean job title.
    pub title_primary: String,
    /// Fallback title element, read as text. Cards matching neither are
    /// disqualified.
    pub title_fallback: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub snippet: String,
}

impl Default for BoardSelectors {
    fn default() -> Self {
        Self {
            card: "[data-jk]".to_string(),
            id_attr: "data-jk".to_string(),
            title_primary: "h2 a span[title]".to_string(),
            title_fallback: "h2 a span".to_string(),
            company: r#"[data-testid="company-name"]"#.to_string(),
            location: r#"[data-testid="job-location"]"#.to_string(),
            salary: r#"[data-testid="salary-snippet"]"#.to_string(),
            snippet: r#"[data-testid="job-snippet"]"#.to_string(),
        }
    }
}

pub struct HttpBoardDriver {
    source: String,
    base_url: Url,
    client: Client,
    selectors: BoardSelectors,
    config: Arc<ScrapeConfig>,
    relevance: RelevanceFilter,
}

impl HttpBoardDriver {
    pub fn new(source: impl Into<String>, base_url: &str, config: Arc<ScrapeConfig>) -> Result<Self> {
        Self::with_selectors(source, base_url, BoardSelectors::default(), config)
    }

    pub fn with_selectors(
        source: impl Into<String>,
        base_url: &str,
        selectors: BoardSelectors,
        config: Arc<ScrapeConfig>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid board URL {base_url}: {e}")))?;
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Ok(Self {
            source: source.into(),
            base_url,
            client,
            selectors,
            relevance: RelevanceFilter::new(&config.relevance_keywords),
            config,
        })
    }
}

#[async_trait]
impl SourceDriver for HttpBoardDriver {
    fn source(&self) -> &str {
        &self.source
    }

    async fn discover(
        &self,
        search_terms: &[String],
        location: Option<&str>,
    ) -> Result<Discovery> {
        let terms = if search_terms.is_empty() {
            self.config.search_terms.clone()
        } else {
            search_terms.to_vec()
        };
        let locations = match location {
            Some(l) => vec![l.to_string()],
            None => self.config.locations.clone(),
        };

        let mut discovery = Discovery::empty();
        for term in &terms {
            for loc in &locations {
                let url = search_url(&self.base_url, term, loc, self.config.recency_days);
                debug!(source = %self.source, %url, "Fetching board search page");
                let page = match self.client.get(url.clone()).send().await {
                    Ok(resp) => match resp.error_for_status() {
                        Ok(resp) => resp.text().await,
                        Err(e) => Err(e),
                    },
                    Err(e) => Err(e),
                };
                match page {
                    Ok(html) => {
                        let batch = parse_results(
                            &html,
                            &self.selectors,
                            &self.source,
                            &self.base_url,
                            &self.relevance,
                            self.config.max_results_per_pair,
                        );
                        discovery.candidates.extend(batch.candidates);
                        discovery.failed += batch.failed;
                    }
                    Err(e) => {
                        // Pair-level: this page yielded nothing, move on.
                        warn!(source = %self.source, term, location = loc, error = %e,
                              "Search page fetch failed, zero results for this pair");
                    }
                }
            }
        }

        info!(
            source = %self.source,
            fetched = discovery.candidates.len(),
            skipped = discovery.failed,
            "Board scrape finished"
        );
        Ok(discovery)
    }
}

/// Build one search page URL: query + location, newest first, restricted
/// to recent postings.
pub(crate) fn search_url(base: &Url, term: &str, location: &str, recency_days: u32) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("q", term)
        .append_pair("l", location)
        .append_pair("sort", "date")
        .append_pair("fromage", &recency_days.to_string());
    url
}

/// Extract result cards from one search page.
///
/// A malformed card is logged and skipped; it never aborts its siblings.
pub(crate) fn parse_results(
    html: &str,
    selectors: &BoardSelectors,
    source: &str,
    base_url: &Url,
    relevance: &RelevanceFilter,
    max_results: usize,
) -> Discovery {
    let mut discovery = Discovery::empty();

    let Some(card_sel) = compile(&selectors.card) else {
        warn!(source, selector = %selectors.card, "Invalid card selector");
        return discovery;
    };

    let document = Html::parse_document(html);
    for card in document.select(&card_sel).take(max_results) {
        match extract_card(&card, selectors, source, base_url) {
            Some(candidate) => {
                if relevance.is_relevant(&candidate.title, &candidate.description) {
                    discovery.candidates.push(candidate);
                }
            }
            None => {
                debug!(source, "Skipping malformed result card");
                discovery.failed += 1;
            }
        }
    }

    discovery
}

fn extract_card(
    card: &ElementRef,
    selectors: &BoardSelectors,
    source: &str,
    base_url: &Url,
) -> Option<RawCandidate> {
    // Permalink id is the one hard requirement.
    let id = card.value().attr(&selectors.id_attr)?.to_string();
    if id.is_empty() {
        return None;
    }

    // Title: clean attribute first, raw text second, then disqualify.
    let title = select_first(card, &selectors.title_primary)
        .and_then(|el| el.value().attr("title").map(str::to_string))
        .or_else(|| select_first(card, &selectors.title_fallback).map(text_of))
        .filter(|t| !t.is_empty())?;

    let company = select_first(card, &selectors.company)
        .map(text_of)
        .filter(|s| !s.is_empty());
    let location = select_first(card, &selectors.location)
        .map(text_of)
        .filter(|s| !s.is_empty());
    let salary_text = select_first(card, &selectors.salary)
        .map(text_of)
        .filter(|s| !s.is_empty());
    let description = select_first(card, &selectors.snippet)
        .map(text_of)
        .unwrap_or_default();

    let mut source_url = base_url.clone();
    source_url.set_path("/viewjob");
    source_url.set_query(Some(&format!("jk={id}")));

    Some(RawCandidate {
        title,
        company,
        description,
        location,
        salary_text,
        posted_at: None,
        source: source.to_string(),
        external_id: id,
        source_url: source_url.to_string(),
        discovered_at: Utc::now(),
    })
}

fn compile(selector: &str) -> Option<Selector> {
    Selector::parse(selector).ok()
}

fn select_first<'a>(card: &ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let sel = compile(selector)?;
    card.select(&sel).next()
}

fn text_of(el: ElementRef) -> String {
    jobscout_core::normalize_whitespace(&el.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div data-jk="abc123">
            <h2 class="jobTitle"><a><span title="Senior Python Developer">Senior Python De...</span></a></h2>
            <span data-testid="company-name">Initech</span>
            <div data-testid="job-location">New York, NY</div>
            <span data-testid="salary-snippet">$120,000 - $150,000 a year</span>
            <div data-testid="job-snippet">Own our Django backend services.</div>
          </div>
          <div data-jk="def456">
            <h2 class="jobTitle"><a><span>Backend Developer</span></a></h2>
            <div data-testid="job-snippet">Python microservices, remote friendly.</div>
          </div>
          <div data-jk="ghi789">
            <!-- no title element at all: disqualified -->
            <span data-testid="company-name">Mystery Corp</span>
          </div>
          <div data-jk="zzz000">
            <h2 class="jobTitle"><a><span>Dog Walker</span></a></h2>
            <div data-testid="job-snippet">Walk dogs in the park.</div>
          </div>
        </body></html>
    "#;

    fn relevance() -> RelevanceFilter {
        RelevanceFilter::new(&["python".to_string(), "backend".to_string()])
    }

    fn base() -> Url {
        Url::parse("https://board.example/jobs").unwrap()
    }

    #[test]
    fn test_parse_results_extracts_full_card() {
        let discovery = parse_results(
            PAGE,
            &BoardSelectors::default(),
            "board",
            &base(),
            &relevance(),
            20,
        );

        let job = &discovery.candidates[0];
        assert_eq!(job.title, "Senior Python Developer");
        assert_eq!(job.company.as_deref(), Some("Initech"));
        assert_eq!(job.location.as_deref(), Some("New York, NY"));
        assert_eq!(job.salary_text.as_deref(), Some("$120,000 - $150,000 a year"));
        assert_eq!(job.description, "Own our Django backend services.");
        assert_eq!(job.external_id, "abc123");
        assert_eq!(job.source_url, "https://board.example/viewjob?jk=abc123");
    }

    #[test]
    fn test_parse_results_title_fallback_and_optional_fields() {
        let discovery = parse_results(
            PAGE,
            &BoardSelectors::default(),
            "board",
            &base(),
            &relevance(),
            20,
        );

        let job = &discovery.candidates[1];
        assert_eq!(job.title, "Backend Developer");
        assert_eq!(job.company, None);
        assert_eq!(job.location, None);
        assert_eq!(job.salary_text, None);
    }

    #[test]
    fn test_parse_results_isolates_malformed_card() {
        let discovery = parse_results(
            PAGE,
            &BoardSelectors::default(),
            "board",
            &base(),
            &relevance(),
            20,
        );

        // 4 cards: 2 relevant, 1 disqualified (no title), 1 irrelevant.
        assert_eq!(discovery.candidates.len(), 2);
        assert_eq!(discovery.failed, 1);
    }

    #[test]
    fn test_parse_results_respects_result_cap() {
        let discovery = parse_results(
            PAGE,
            &BoardSelectors::default(),
            "board",
            &base(),
            &relevance(),
            1,
        );
        assert_eq!(discovery.candidates.len(), 1);
    }

    #[test]
    fn test_search_url_parameters() {
        let url = search_url(&base(), "python developer", "New York, NY", 14);
        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert!(query.contains(&("q".to_string(), "python developer".to_string())));
        assert!(query.contains(&("l".to_string(), "New York, NY".to_string())));
        assert!(query.contains(&("sort".to_string(), "date".to_string())));
        assert!(query.contains(&("fromage".to_string(), "14".to_string())));
    }
}
