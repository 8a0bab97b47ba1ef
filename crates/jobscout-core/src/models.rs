//! Core data model for jobscout.
//!
//! The pipeline moves data through three shapes: [`RawCandidate`] (what a
//! source driver harvested, pre-normalization), [`NewJob`] (normalized and
//! fingerprinted, ready to upsert), and [`NormalizedJob`] (the persisted
//! record). [`RefreshRun`] captures one orchestrated cycle and doubles as
//! the persisted "last refresh" state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::normalize::normalize_whitespace;

// =============================================================================
// ENUMS
// =============================================================================

/// Where the work happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Remote,
    Hybrid,
    Onsite,
    Unspecified,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Remote => "remote",
            LocationType::Hybrid => "hybrid",
            LocationType::Onsite => "onsite",
            LocationType::Unspecified => "unspecified",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "remote" => LocationType::Remote,
            "hybrid" => LocationType::Hybrid,
            "onsite" => LocationType::Onsite,
            _ => LocationType::Unspecified,
        }
    }
}

/// Seniority band extracted from title + description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Unspecified,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Unspecified => "unspecified",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "entry" => ExperienceLevel::Entry,
            "mid" => ExperienceLevel::Mid,
            "senior" => ExperienceLevel::Senior,
            _ => ExperienceLevel::Unspecified,
        }
    }
}

/// Employment arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Unspecified,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full_time",
            EmploymentType::PartTime => "part_time",
            EmploymentType::Contract => "contract",
            EmploymentType::Unspecified => "unspecified",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "full_time" => EmploymentType::FullTime,
            "part_time" => EmploymentType::PartTime,
            "contract" => EmploymentType::Contract,
            _ => EmploymentType::Unspecified,
        }
    }
}

// =============================================================================
// CANDIDATES AND JOBS
// =============================================================================

/// Unnormalized extraction result from a single source.
///
/// Ephemeral: consumed by the aggregator and discarded after normalization.
/// `company` and `location` are `None` when the source card carried no such
/// element — never a placeholder string.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    pub title: String,
    pub company: Option<String>,
    pub description: String,
    pub location: Option<String>,
    pub salary_text: Option<String>,
    /// Source-reported posting date, when the source exposes one.
    pub posted_at: Option<DateTime<Utc>>,
    pub source: String,
    /// Source-native permalink id, unique within the source.
    pub external_id: String,
    pub source_url: String,
    pub discovered_at: DateTime<Utc>,
}

/// A normalized job ready to be upserted into the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub title: String,
    pub company: Option<String>,
    pub description: String,
    pub location: Option<String>,
    pub location_type: LocationType,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: String,
    pub experience_level: ExperienceLevel,
    pub job_type: EmploymentType,
    pub skills: Vec<String>,
    pub posted_date: Option<DateTime<Utc>>,
    pub source: String,
    pub external_id: String,
    pub source_url: String,
    pub fingerprint: String,
}

/// The canonical persisted job record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedJob {
    pub id: Uuid,
    pub title: String,
    pub company: Option<String>,
    pub description: String,
    pub location: Option<String>,
    pub location_type: LocationType,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: String,
    pub experience_level: ExperienceLevel,
    pub job_type: EmploymentType,
    pub skills: Vec<String>,
    pub posted_date: Option<DateTime<Utc>>,
    pub source: String,
    pub external_id: String,
    pub source_url: String,
    /// Cross-source dedup key, see [`fingerprint`].
    pub fingerprint: String,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    /// How many refresh cycles have observed this posting.
    pub times_seen: i32,
}

/// Result of an upsert against the job store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// First sighting: a new row was inserted.
    Inserted(Uuid),
    /// Already known: last_seen_at/times_seen were bumped, content untouched.
    Refreshed(Uuid),
}

impl UpsertOutcome {
    pub fn id(&self) -> Uuid {
        match self {
            UpsertOutcome::Inserted(id) | UpsertOutcome::Refreshed(id) => *id,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, UpsertOutcome::Inserted(_))
    }
}

/// Derive the cross-source deduplication key for a posting.
///
/// The same posting routinely appears on several boards with different
/// source-native ids, so the key is content-derived: SHA-256 over the
/// lower-cased, whitespace-collapsed title plus the first `prefix_len`
/// characters of the description treated the same way. The prefix tolerates
/// trailing text drift between re-scrapes while still separating
/// near-duplicate postings.
pub fn fingerprint(title: &str, description: &str, prefix_len: usize) -> String {
    let title = normalize_whitespace(&title.to_lowercase());
    let description = normalize_whitespace(&description.to_lowercase());
    let prefix: String = description.chars().take(prefix_len).collect();

    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(b"\n");
    hasher.update(prefix.as_bytes());
    hex::encode(hasher.finalize())
}

// =============================================================================
// PREFERENCE PROFILE
// =============================================================================

/// The active user preference profile, consumed read-only per cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPreferenceProfile {
    pub id: Uuid,
    /// Skill keyword → weight, used by the downstream scorer.
    pub skill_weights: std::collections::HashMap<String, f64>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub preferred_locations: Vec<String>,
    pub preferred_location_types: Vec<LocationType>,
    pub preferred_experience_level: Option<ExperienceLevel>,
    pub preferred_company_types: Vec<String>,
    /// Search terms derived from the profile; drivers fall back to the
    /// configured defaults when empty.
    pub search_terms: Vec<String>,
}

// =============================================================================
// REFRESH RUNS
// =============================================================================

/// Outcome status of a refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStatus {
    Running,
    Success,
    /// At least one source contributed nothing due to a source-level failure.
    Partial,
    Failure,
}

impl RefreshStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshStatus::Running => "running",
            RefreshStatus::Success => "success",
            RefreshStatus::Partial => "partial",
            RefreshStatus::Failure => "failure",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "success" => RefreshStatus::Success,
            "partial" => RefreshStatus::Partial,
            "failure" => RefreshStatus::Failure,
            _ => RefreshStatus::Running,
        }
    }
}

/// Per-source tallies for one refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCounts {
    pub source: String,
    /// Candidates the driver returned.
    pub fetched: u64,
    /// Accepted as new records.
    pub new: u64,
    /// Rejected as already-known (in-cycle or in-store duplicates).
    pub duplicate: u64,
    /// Candidate extraction failures plus whole-source failures.
    pub failed: u64,
}

/// Execution record for one scheduled or manual refresh cycle.
///
/// Created when the cycle starts, immutable once finalized. The most recent
/// successful run is also the freshness reference for the next cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRun {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: RefreshStatus,
    pub source_counts: Vec<SourceCounts>,
    pub deleted_stale: u64,
    pub error: Option<String>,
}

/// Structured result surfaced to refresh-trigger callers.
///
/// This is the only contract the orchestrator exposes; what downstream
/// systems do with it is their business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub deleted_old_jobs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_new_jobs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_jobs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RefreshOutcome {
    /// A completed cycle with counts.
    pub fn completed(
        message: impl Into<String>,
        deleted: u64,
        added: u64,
        total: i64,
        last_refresh: DateTime<Utc>,
    ) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            deleted_old_jobs: deleted,
            added_new_jobs: Some(added),
            total_jobs: Some(total),
            last_refresh: Some(last_refresh),
            error: None,
        }
    }

    /// The fast no-op path: data is still fresh, nothing was scraped.
    pub fn fresh(total: i64, last_refresh: DateTime<Utc>) -> Self {
        Self {
            success: true,
            message: Some("Jobs are fresh, no refresh needed".to_string()),
            deleted_old_jobs: 0,
            added_new_jobs: Some(0),
            total_jobs: Some(total),
            last_refresh: Some(last_refresh),
            error: None,
        }
    }

    /// A failed cycle. `deleted` reflects retention work already committed
    /// before the failure.
    pub fn failed(error: impl Into<String>, deleted: u64) -> Self {
        Self {
            success: false,
            message: None,
            deleted_old_jobs: deleted,
            added_new_jobs: None,
            total_jobs: None,
            last_refresh: None,
            error: Some(error.into()),
        }
    }
}
