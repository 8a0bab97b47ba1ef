//! # jobscout-core
//!
//! Core types, traits, and abstractions for the jobscout ingestion
//! pipeline: the canonical job data model, the pure field-normalization
//! heuristics every source driver shares, the store/collaborator traits,
//! and the pipeline configuration.

pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod traits;

// In-memory fixtures for dependent crates' tests.
// Note: Always compiled so integration tests (in tests/) can use them.
pub mod test_fixtures;

pub use config::ScrapeConfig;
pub use error::{Error, Result};
pub use models::{
    fingerprint, EmploymentType, ExperienceLevel, LocationType, NewJob, NormalizedJob,
    RawCandidate, RefreshOutcome, RefreshRun, RefreshStatus, SourceCounts, UpsertOutcome,
    UserPreferenceProfile,
};
pub use normalize::{
    classify_experience_level, classify_location_type, normalize_whitespace, parse_salary,
    RelevanceFilter, SkillMatcher,
};
pub use traits::{JobScorer, JobStore, ProfileReader, RefreshRunStore};
