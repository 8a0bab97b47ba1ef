//! Scrape pipeline configuration.
//!
//! Everything tunable lives here: default search terms and locations (used
//! when the active profile supplies none), the relevance keyword set, the
//! skills vocabulary, and the freshness/staleness/fingerprint knobs. Core
//! logic never hard-codes these.

use std::time::Duration as StdDuration;

use chrono::Duration;

/// Minimum hours between unforced refresh cycles.
pub const DEFAULT_FRESHNESS_WINDOW_HOURS: i64 = 6;

/// Days since last observation before a job is purged.
pub const DEFAULT_STALENESS_WINDOW_DAYS: i64 = 30;

/// Description prefix length feeding the dedup fingerprint.
pub const DEFAULT_FINGERPRINT_PREFIX_LEN: usize = 200;

/// Figures below this are read as thousands when parsing salaries.
pub const DEFAULT_SALARY_THOUSANDS_FLOOR: i64 = 1000;

/// Seconds to wait for the results marker element on a browser page.
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 10;

/// Base delay between (term, location) navigations in one browser session.
pub const DEFAULT_PAIR_DELAY_MS: u64 = 1000;

/// Restrict board queries to postings from the last N days.
pub const DEFAULT_RECENCY_DAYS: u32 = 14;

/// Cap on result cards taken per (term, location) page.
pub const DEFAULT_MAX_RESULTS_PER_PAIR: usize = 20;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration consumed by drivers, the aggregator, and the orchestrator.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Fallback search terms when the active profile has none.
    pub search_terms: Vec<String>,
    /// Fallback locations when the caller passes none.
    pub locations: Vec<String>,
    /// Role/stack keywords gating candidates before normalization.
    pub relevance_keywords: Vec<String>,
    /// Vocabulary for skill extraction.
    pub skills_vocabulary: Vec<String>,
    pub freshness_window_hours: i64,
    pub staleness_window_days: i64,
    pub fingerprint_prefix_len: usize,
    pub salary_thousands_floor: i64,
    pub page_timeout_secs: u64,
    pub pair_delay_ms: u64,
    pub recency_days: u32,
    pub max_results_per_pair: usize,
    pub user_agent: String,
    pub salary_currency: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            search_terms: to_strings(&[
                "Python Developer",
                "Django Developer",
                "Backend Developer",
                "Full Stack Developer",
            ]),
            locations: to_strings(&["New York, NY", "Remote"]),
            relevance_keywords: to_strings(&[
                "python",
                "django",
                "backend",
                "full stack",
                "software engineer",
                "developer",
            ]),
            skills_vocabulary: to_strings(&[
                "Python",
                "Django",
                "Django REST Framework",
                "PostgreSQL",
                "React",
                "Next.js",
                "TypeScript",
                "JavaScript",
                "Node.js",
                "Express",
                "HTML",
                "CSS",
                "TailwindCSS",
                "AWS",
                "Docker",
                "Git",
                "CI/CD",
                "Jest",
                "OAuth",
                "Pandas",
                "NumPy",
                "Flask",
                "Celery",
                "Redis",
                "Firebase",
                "SQL",
                "MongoDB",
                "REST API",
                "GraphQL",
                "Linux",
                "Kubernetes",
                "Rust",
            ]),
            freshness_window_hours: DEFAULT_FRESHNESS_WINDOW_HOURS,
            staleness_window_days: DEFAULT_STALENESS_WINDOW_DAYS,
            fingerprint_prefix_len: DEFAULT_FINGERPRINT_PREFIX_LEN,
            salary_thousands_floor: DEFAULT_SALARY_THOUSANDS_FLOOR,
            page_timeout_secs: DEFAULT_PAGE_TIMEOUT_SECS,
            pair_delay_ms: DEFAULT_PAIR_DELAY_MS,
            recency_days: DEFAULT_RECENCY_DAYS,
            max_results_per_pair: DEFAULT_MAX_RESULTS_PER_PAIR,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            salary_currency: "USD".to_string(),
        }
    }
}

impl ScrapeConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `JOBSCOUT_SEARCH_TERMS` | see Default | Comma-separated fallback terms |
    /// | `JOBSCOUT_LOCATIONS` | see Default | Comma-separated fallback locations |
    /// | `JOBSCOUT_RELEVANCE_KEYWORDS` | see Default | Comma-separated relevance gate |
    /// | `JOBSCOUT_SKILLS` | see Default | Comma-separated skills vocabulary |
    /// | `JOBSCOUT_FRESHNESS_HOURS` | `6` | Unforced refresh gate |
    /// | `JOBSCOUT_STALENESS_DAYS` | `30` | Retention window |
    /// | `JOBSCOUT_FINGERPRINT_PREFIX` | `200` | Description prefix length |
    /// | `JOBSCOUT_PAGE_TIMEOUT_SECS` | `10` | Browser marker-element wait |
    /// | `JOBSCOUT_PAIR_DELAY_MS` | `1000` | Delay between page navigations |
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(terms) = env_list("JOBSCOUT_SEARCH_TERMS") {
            config.search_terms = terms;
        }
        if let Some(locations) = env_list("JOBSCOUT_LOCATIONS") {
            config.locations = locations;
        }
        if let Some(keywords) = env_list("JOBSCOUT_RELEVANCE_KEYWORDS") {
            config.relevance_keywords = keywords;
        }
        if let Some(skills) = env_list("JOBSCOUT_SKILLS") {
            config.skills_vocabulary = skills;
        }
        if let Some(hours) = env_parse("JOBSCOUT_FRESHNESS_HOURS") {
            config.freshness_window_hours = hours;
        }
        if let Some(days) = env_parse("JOBSCOUT_STALENESS_DAYS") {
            config.staleness_window_days = days;
        }
        if let Some(len) = env_parse("JOBSCOUT_FINGERPRINT_PREFIX") {
            config.fingerprint_prefix_len = len;
        }
        if let Some(secs) = env_parse("JOBSCOUT_PAGE_TIMEOUT_SECS") {
            config.page_timeout_secs = secs;
        }
        if let Some(ms) = env_parse("JOBSCOUT_PAIR_DELAY_MS") {
            config.pair_delay_ms = ms;
        }

        config
    }

    /// Minimum age of the latest successful run before an unforced cycle
    /// actually scrapes.
    pub fn freshness_window(&self) -> Duration {
        Duration::hours(self.freshness_window_hours)
    }

    /// Maximum age since last observation before a record is purged.
    pub fn staleness_window(&self) -> Duration {
        Duration::days(self.staleness_window_days)
    }

    pub fn page_timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.page_timeout_secs)
    }

    pub fn pair_delay(&self) -> StdDuration {
        StdDuration::from_millis(self.pair_delay_ms)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn env_list(key: &str) -> Option<Vec<String>> {
    std::env::var(key).ok().map(|v| {
        v.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
