//! RemoteOK API driver.
//!
//! RemoteOK exposes a scraping-friendly JSON feed; the first element is
//! feed metadata and every job in it is remote by definition. Filtering by
//! search terms happens locally over position + description + tags.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use jobscout_core::{RawCandidate, RelevanceFilter, Result, ScrapeConfig};

use crate::driver::{Discovery, SourceDriver};

const DEFAULT_FEED_URL: &str = "https://remoteok.io/api";

pub struct RemoteOkDriver {
    client: Client,
    feed_url: String,
    config: Arc<ScrapeConfig>,
    relevance: RelevanceFilter,
}

impl RemoteOkDriver {
    pub fn new(config: Arc<ScrapeConfig>) -> Self {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            feed_url: DEFAULT_FEED_URL.to_string(),
            relevance: RelevanceFilter::new(&config.relevance_keywords),
            config,
        }
    }

    /// Point the driver at a different feed URL (mirrors, test servers).
    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = url.into();
        self
    }
}

#[async_trait]
impl SourceDriver for RemoteOkDriver {
    fn source(&self) -> &str {
        "remoteok"
    }

    async fn discover(
        &self,
        search_terms: &[String],
        _location: Option<&str>,
    ) -> Result<Discovery> {
        let terms = if search_terms.is_empty() {
            &self.config.search_terms
        } else {
            search_terms
        };

        let feed: Vec<Value> = self
            .client
            .get(&self.feed_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let discovery = parse_feed(&feed, terms, &self.relevance);
        info!(
            source = self.source(),
            fetched = discovery.candidates.len(),
            "RemoteOK feed processed"
        );
        Ok(discovery)
    }
}

/// Filter and convert the raw feed. Separated from the fetch so it can be
/// exercised against canned JSON.
pub(crate) fn parse_feed(
    feed: &[Value],
    terms: &[String],
    relevance: &RelevanceFilter,
) -> Discovery {
    let mut discovery = Discovery::empty();

    // First element is feed metadata, not a job.
    for entry in feed.iter().skip(1) {
        match extract_entry(entry) {
            Some(candidate) => {
                if !matches_terms(entry, &candidate, terms) {
                    continue;
                }
                if !relevance.is_relevant(&candidate.title, &candidate.description) {
                    continue;
                }
                discovery.candidates.push(candidate);
            }
            None => {
                debug!("Skipping malformed feed entry");
                discovery.failed += 1;
            }
        }
    }

    discovery
}

fn extract_entry(entry: &Value) -> Option<RawCandidate> {
    let id = entry.get("id")?;
    let id = match id {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let title = non_empty(entry.get("position"))?;

    let description = entry
        .get("description")
        .and_then(Value::as_str)
        .map(strip_tags)
        .unwrap_or_default();

    let salary_text = match (
        entry.get("salary_min").and_then(Value::as_i64),
        entry.get("salary_max").and_then(Value::as_i64),
    ) {
        (Some(min), Some(max)) if min > 0 && max > 0 => Some(format!("{min} - {max}")),
        (Some(min), _) if min > 0 => Some(min.to_string()),
        _ => None,
    };

    let posted_at = entry
        .get("date")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Some(RawCandidate {
        title,
        company: non_empty(entry.get("company")),
        description,
        location: Some("Remote".to_string()),
        salary_text,
        posted_at,
        source: "remoteok".to_string(),
        external_id: id.clone(),
        source_url: format!("https://remoteok.io/remote-jobs/{id}"),
        discovered_at: Utc::now(),
    })
}

fn matches_terms(entry: &Value, candidate: &RawCandidate, terms: &[String]) -> bool {
    let tags = entry
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    let searchable = format!(
        "{} {} {} {}",
        candidate.title,
        candidate.description,
        candidate.company.as_deref().unwrap_or(""),
        tags
    )
    .to_lowercase();

    terms.iter().any(|term| searchable.contains(&term.to_lowercase()))
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Feed descriptions arrive as HTML fragments; keep the text only.
fn strip_tags(html: &str) -> String {
    let fragment = scraper::Html::parse_fragment(html);
    jobscout_core::normalize_whitespace(&fragment.root_element().text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feed() -> Vec<Value> {
        vec![
            json!({"legal": "feed metadata, not a job"}),
            json!({
                "id": 42,
                "position": "Backend Developer",
                "company": "Acme",
                "description": "<p>Build <b>Python</b> services.</p>",
                "tags": ["python", "django"],
                "salary_min": 90000,
                "salary_max": 120000,
                "date": "2026-07-01T12:00:00+00:00"
            }),
            json!({
                "id": 43,
                "position": "Pastry Chef",
                "company": "Bakery",
                "description": "Croissants.",
                "tags": ["baking"]
            }),
            json!({
                "position": "No id on this one",
                "description": "Broken entry."
            }),
        ]
    }

    fn filter() -> RelevanceFilter {
        RelevanceFilter::new(&["python".to_string(), "developer".to_string()])
    }

    #[test]
    fn test_parse_feed_filters_and_extracts() {
        let terms = vec!["python".to_string()];
        let discovery = parse_feed(&feed(), &terms, &filter());

        assert_eq!(discovery.candidates.len(), 1);
        assert_eq!(discovery.failed, 1);

        let job = &discovery.candidates[0];
        assert_eq!(job.title, "Backend Developer");
        assert_eq!(job.company.as_deref(), Some("Acme"));
        assert_eq!(job.description, "Build Python services.");
        assert_eq!(job.external_id, "42");
        assert_eq!(job.salary_text.as_deref(), Some("90000 - 120000"));
        assert_eq!(job.location.as_deref(), Some("Remote"));
        assert!(job.posted_at.is_some());
    }

    #[test]
    fn test_parse_feed_skips_metadata_element() {
        // Only the metadata element: nothing harvested, nothing failed.
        let terms = vec!["python".to_string()];
        let discovery = parse_feed(&feed()[..1], &terms, &filter());
        assert!(discovery.candidates.is_empty());
        assert_eq!(discovery.failed, 0);
    }

    #[test]
    fn test_parse_feed_matches_on_tags() {
        let entry = json!({
            "id": 7,
            "position": "Software Developer",
            "company": "Tagged",
            "description": "Great role.",
            "tags": ["kubernetes"]
        });
        let feed = vec![json!({}), entry];
        let discovery = parse_feed(&feed, &["kubernetes".to_string()], &filter());
        assert_eq!(discovery.candidates.len(), 1);
    }
}
