//! Field normalization heuristics shared by every source driver.
//!
//! Everything here is a pure function over strings the drivers already
//! harvested — no I/O. Classification keyword sets are checked in priority
//! order; the first matching tier wins.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ExperienceLevel, LocationType};

/// Keywords that classify a posting as remote. Checked before hybrid.
const REMOTE_KEYWORDS: &[&str] = &["remote", "work from home", "telecommute"];

/// Keywords that classify a posting as hybrid.
const HYBRID_KEYWORDS: &[&str] = &["hybrid", "flexible"];

/// Keywords that classify a posting as senior. Checked first.
const SENIOR_KEYWORDS: &[&str] = &["senior", "lead", "principal", "staff"];

/// Keywords that classify a posting as entry level.
const ENTRY_KEYWORDS: &[&str] = &["entry", "junior", "graduate", "new grad"];

/// Keywords that classify a posting as mid level.
const MID_KEYWORDS: &[&str] = &["mid", "intermediate", "experienced"];

/// `A - B` range with optional thousands shorthand on either side.
static SALARY_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(k?)\s*(?:-|–|to)\s*(\d+)\s*(k?)").unwrap());

/// Lone figure with optional thousands shorthand.
static SALARY_SINGLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*(k?)").unwrap());

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a salary range out of free text.
///
/// Currency symbols and thousands separators are stripped first. A range
/// (`70k-120k`, `$70,000 - $120,000`) yields both bounds; a lone figure is
/// used for both. Figures carrying the `k` shorthand, or implausibly small
/// ones (below `thousands_floor`), are interpreted as thousands. Total over
/// any input: no match yields `(None, None)`.
pub fn parse_salary(text: &str, thousands_floor: i64) -> (Option<i64>, Option<i64>) {
    let cleaned = text.to_lowercase().replace(['$', ','], "");

    if let Some(caps) = SALARY_RANGE.captures(&cleaned) {
        let min: i64 = match caps[1].parse() {
            Ok(v) => v,
            Err(_) => return (None, None),
        };
        let max: i64 = match caps[3].parse() {
            Ok(v) => v,
            Err(_) => return (None, None),
        };
        let shorthand = !caps[2].is_empty() || !caps[4].is_empty();
        if shorthand || min < thousands_floor {
            return (Some(min * 1000), Some(max * 1000));
        }
        return (Some(min), Some(max));
    }

    if let Some(caps) = SALARY_SINGLE.captures(&cleaned) {
        let value: i64 = match caps[1].parse() {
            Ok(v) => v,
            Err(_) => return (None, None),
        };
        let shorthand = !caps[2].is_empty();
        let value = if shorthand || value < thousands_floor {
            value * 1000
        } else {
            value
        };
        return (Some(value), Some(value));
    }

    (None, None)
}

/// Classify a posting as remote, hybrid, or onsite.
///
/// Remote keywords outrank hybrid keywords: a posting mentioning both is
/// remote. With neither present the posting is onsite.
pub fn classify_location_type(location: Option<&str>, description: &str) -> LocationType {
    let haystack = format!("{} {}", location.unwrap_or(""), description).to_lowercase();

    if REMOTE_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
        LocationType::Remote
    } else if HYBRID_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
        LocationType::Hybrid
    } else {
        LocationType::Onsite
    }
}

/// Classify seniority from title + description.
///
/// Priority is senior > entry > mid, first hit wins, so "Senior Backend
/// Engineer, entry-level friendly" reads as senior.
pub fn classify_experience_level(title: &str, description: &str) -> ExperienceLevel {
    let haystack = format!("{} {}", title, description).to_lowercase();

    if SENIOR_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
        ExperienceLevel::Senior
    } else if ENTRY_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
        ExperienceLevel::Entry
    } else if MID_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
        ExperienceLevel::Mid
    } else {
        ExperienceLevel::Unspecified
    }
}

/// Word-boundary skill extractor over a configurable vocabulary.
///
/// Compiles one case-insensitive pattern per vocabulary term, so build it
/// once and reuse it across candidates.
pub struct SkillMatcher {
    patterns: Vec<(String, Regex)>,
}

impl SkillMatcher {
    pub fn new(vocabulary: &[String]) -> Self {
        let patterns = vocabulary
            .iter()
            .filter_map(|skill| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(skill));
                Regex::new(&pattern).ok().map(|re| (skill.clone(), re))
            })
            .collect();
        Self { patterns }
    }

    /// Return the vocabulary terms present in `text`, canonical casing,
    /// vocabulary order. Word boundaries prevent partial-substring hits
    /// ("Java" does not match "JavaScript").
    pub fn extract(&self, text: &str) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(skill, _)| skill.clone())
            .collect()
    }
}

/// Coarse relevance gate applied by drivers before normalization.
///
/// A candidate passes when its title+description contains at least one of
/// the configured role/stack keywords. Plain substring matching, matching
/// how loose source snippets actually read.
pub struct RelevanceFilter {
    keywords: Vec<String>,
}

impl RelevanceFilter {
    pub fn new(keywords: &[String]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn is_relevant(&self, title: &str, description: &str) -> bool {
        let haystack = format!("{} {}", title, description).to_lowercase();
        self.keywords.iter().any(|kw| haystack.contains(kw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salary_range_with_k_shorthand() {
        assert_eq!(parse_salary("70k-120k", 1000), (Some(70000), Some(120000)));
    }

    #[test]
    fn test_salary_single_with_separators() {
        assert_eq!(parse_salary("$85,000", 1000), (Some(85000), Some(85000)));
    }

    #[test]
    fn test_salary_no_match() {
        assert_eq!(parse_salary("Competitive", 1000), (None, None));
        assert_eq!(parse_salary("", 1000), (None, None));
    }

    #[test]
    fn test_salary_small_range_interpreted_as_thousands() {
        assert_eq!(parse_salary("45-60", 1000), (Some(45000), Some(60000)));
    }

    #[test]
    fn test_salary_full_range_with_currency() {
        assert_eq!(
            parse_salary("$70,000 - $120,000 a year", 1000),
            (Some(70000), Some(120000))
        );
    }

    #[test]
    fn test_salary_single_k() {
        assert_eq!(parse_salary("80k", 1000), (Some(80000), Some(80000)));
    }

    #[test]
    fn test_salary_floor_is_tunable() {
        // With a floor of 100, "150" is taken at face value.
        assert_eq!(parse_salary("150", 100), (Some(150), Some(150)));
        assert_eq!(parse_salary("150", 1000), (Some(150000), Some(150000)));
    }

    #[test]
    fn test_location_remote_beats_hybrid() {
        let lt = classify_location_type(None, "Hybrid schedule, fully remote possible");
        assert_eq!(lt, LocationType::Remote);
    }

    #[test]
    fn test_location_hybrid() {
        let lt = classify_location_type(Some("Austin, TX"), "Flexible work arrangement");
        assert_eq!(lt, LocationType::Hybrid);
    }

    #[test]
    fn test_location_defaults_to_onsite() {
        let lt = classify_location_type(Some("New York, NY"), "On our trading floor");
        assert_eq!(lt, LocationType::Onsite);
    }

    #[test]
    fn test_location_from_location_string() {
        let lt = classify_location_type(Some("Remote (US)"), "Great team");
        assert_eq!(lt, LocationType::Remote);
    }

    #[test]
    fn test_experience_senior_beats_entry() {
        let level =
            classify_experience_level("Senior Backend Engineer", "entry-level friendly team");
        assert_eq!(level, ExperienceLevel::Senior);
    }

    #[test]
    fn test_experience_entry() {
        let level = classify_experience_level("Developer", "new grad applicants welcome");
        assert_eq!(level, ExperienceLevel::Entry);
    }

    #[test]
    fn test_experience_mid() {
        let level = classify_experience_level("Developer", "intermediate proficiency required");
        assert_eq!(level, ExperienceLevel::Mid);
    }

    #[test]
    fn test_experience_unspecified() {
        let level = classify_experience_level("Developer", "join our team");
        assert_eq!(level, ExperienceLevel::Unspecified);
    }

    #[test]
    fn test_skill_matcher_word_boundaries() {
        let vocab = vec!["Java".to_string(), "JavaScript".to_string()];
        let matcher = SkillMatcher::new(&vocab);
        let found = matcher.extract("We use JavaScript on the frontend");
        assert_eq!(found, vec!["JavaScript".to_string()]);
    }

    #[test]
    fn test_skill_matcher_case_insensitive() {
        let vocab = vec!["PostgreSQL".to_string(), "Docker".to_string()];
        let matcher = SkillMatcher::new(&vocab);
        let found = matcher.extract("experience with postgresql and docker required");
        assert_eq!(
            found,
            vec!["PostgreSQL".to_string(), "Docker".to_string()]
        );
    }

    #[test]
    fn test_skill_matcher_punctuated_terms() {
        let vocab = vec!["Node.js".to_string(), "CI/CD".to_string()];
        let matcher = SkillMatcher::new(&vocab);
        let found = matcher.extract("You will own our CI/CD pipeline and Node.js services");
        assert_eq!(found, vec!["Node.js".to_string(), "CI/CD".to_string()]);
    }

    #[test]
    fn test_relevance_filter() {
        let filter = RelevanceFilter::new(&["python".to_string(), "backend".to_string()]);
        assert!(filter.is_relevant("Backend Engineer", "build services"));
        assert!(filter.is_relevant("Engineer", "Python microservices"));
        assert!(!filter.is_relevant("Forklift Operator", "warehouse shifts"));
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \t b\n\nc "), "a b c");
    }
}
