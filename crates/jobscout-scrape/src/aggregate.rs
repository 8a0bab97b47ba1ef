//! Aggregation and deduplication of driver output.
//!
//! The aggregator is the only store writer during a cycle. It normalizes
//! every raw candidate, collapses duplicates on the content fingerprint
//! (first candidate wins within a cycle, first-written content wins in the
//! store), and upserts atomically per record — re-running the same cycle
//! against unchanged sources adds nothing.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use jobscout_core::{
    classify_experience_level, classify_location_type, fingerprint, parse_salary, EmploymentType,
    JobStore, NewJob, RawCandidate, Result, ScrapeConfig, SkillMatcher, SourceCounts,
};

use crate::driver::Discovery;

/// One driver's contribution to a cycle.
pub struct SourceBatch {
    pub source: String,
    pub discovery: Discovery,
    /// The whole source failed this cycle (isolated by the orchestrator).
    pub errored: bool,
}

impl SourceBatch {
    pub fn ok(source: impl Into<String>, discovery: Discovery) -> Self {
        Self {
            source: source.into(),
            discovery,
            errored: false,
        }
    }

    pub fn failed(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            discovery: Discovery::empty(),
            errored: true,
        }
    }
}

/// What a cycle's aggregation produced.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub counts: Vec<SourceCounts>,
    /// Ids of rows inserted this cycle, handed to the scorer.
    pub new_job_ids: Vec<Uuid>,
}

impl IngestReport {
    pub fn new_total(&self) -> u64 {
        self.counts.iter().map(|c| c.new).sum()
    }

    pub fn fetched_total(&self) -> u64 {
        self.counts.iter().map(|c| c.fetched).sum()
    }
}

pub struct Aggregator {
    store: Arc<dyn JobStore>,
    config: Arc<ScrapeConfig>,
    skills: SkillMatcher,
}

impl Aggregator {
    pub fn new(store: Arc<dyn JobStore>, config: Arc<ScrapeConfig>) -> Self {
        let skills = SkillMatcher::new(&config.skills_vocabulary);
        Self {
            store,
            config,
            skills,
        }
    }

    /// Apply the shared normalization heuristics to one candidate.
    pub fn normalize(&self, raw: &RawCandidate) -> NewJob {
        let (salary_min, salary_max) = raw
            .salary_text
            .as_deref()
            .map(|text| parse_salary(text, self.config.salary_thousands_floor))
            .unwrap_or((None, None));

        let haystack = format!("{} {}", raw.title, raw.description);

        NewJob {
            title: raw.title.trim().to_string(),
            company: raw.company.clone(),
            description: raw.description.clone(),
            location: raw.location.clone(),
            location_type: classify_location_type(raw.location.as_deref(), &raw.description),
            salary_min,
            salary_max,
            salary_currency: self.config.salary_currency.clone(),
            experience_level: classify_experience_level(&raw.title, &raw.description),
            job_type: EmploymentType::Unspecified,
            skills: self.skills.extract(&haystack),
            posted_date: raw.posted_at,
            source: raw.source.clone(),
            external_id: raw.external_id.clone(),
            source_url: raw.source_url.clone(),
            fingerprint: fingerprint(
                &raw.title,
                &raw.description,
                self.config.fingerprint_prefix_len,
            ),
        }
    }

    /// Normalize, dedupe, and upsert every batch in driver order.
    pub async fn ingest(&self, batches: Vec<SourceBatch>) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let mut seen_this_cycle: HashSet<String> = HashSet::new();

        for batch in batches {
            let mut counts = SourceCounts {
                source: batch.source.clone(),
                fetched: batch.discovery.candidates.len() as u64,
                failed: batch.discovery.failed + u64::from(batch.errored),
                ..Default::default()
            };

            for raw in &batch.discovery.candidates {
                let job = self.normalize(raw);

                // First candidate wins within the cycle: one upsert per
                // fingerprint.
                if !seen_this_cycle.insert(job.fingerprint.clone()) {
                    counts.duplicate += 1;
                    continue;
                }

                match self.store.upsert(job).await {
                    Ok(outcome) if outcome.is_new() => {
                        counts.new += 1;
                        report.new_job_ids.push(outcome.id());
                    }
                    Ok(_) => counts.duplicate += 1,
                    Err(e) => {
                        // Record-level: one bad upsert never aborts the batch.
                        error!(source = %batch.source, external_id = %raw.external_id,
                               error = %e, "Upsert failed, skipping candidate");
                        counts.failed += 1;
                    }
                }
            }

            info!(
                source = %counts.source,
                fetched = counts.fetched,
                new = counts.new,
                duplicate = counts.duplicate,
                failed = counts.failed,
                "Source aggregated"
            );
            report.counts.push(counts);
        }

        Ok(report)
    }
}
