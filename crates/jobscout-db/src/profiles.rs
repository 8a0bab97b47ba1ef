//! Active preference profile reader.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use jobscout_core::{
    ExperienceLevel, LocationType, ProfileReader, Result, UserPreferenceProfile,
};

/// PostgreSQL implementation of [`ProfileReader`].
///
/// The schema enforces at most one active profile (partial unique index);
/// the core consumes it as an immutable snapshot per cycle.
pub struct PgProfileReader {
    pool: PgPool,
}

impl PgProfileReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileReader for PgProfileReader {
    async fn active_profile(&self) -> Result<Option<UserPreferenceProfile>> {
        let row = sqlx::query("SELECT * FROM preference_profiles WHERE active LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| UserPreferenceProfile {
            id: row.get("id"),
            skill_weights: row.get::<Json<HashMap<String, f64>>, _>("skill_weights").0,
            min_salary: row.get("min_salary"),
            max_salary: row.get("max_salary"),
            preferred_locations: row.get::<Json<Vec<String>>, _>("preferred_locations").0,
            preferred_location_types: row
                .get::<Json<Vec<String>>, _>("preferred_location_types")
                .0
                .iter()
                .map(|s| LocationType::parse(s))
                .collect(),
            preferred_experience_level: row
                .get::<Option<String>, _>("preferred_experience_level")
                .map(|s| ExperienceLevel::parse(&s)),
            preferred_company_types: row
                .get::<Json<Vec<String>>, _>("preferred_company_types")
                .0,
            search_terms: row.get::<Json<Vec<String>>, _>("search_terms").0,
        }))
    }
}
