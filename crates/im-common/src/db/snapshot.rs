//! Point-in-time snapshot loaders for the allocation engine.
//!
//! Each loader materializes plain in-memory structs; the engine never
//! touches the database itself. Ordering by id keeps snapshots
//! deterministic across runs over unchanged data.

use std::collections::HashMap;

use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::instrument;

use crate::db::util::TimedClientExt;
use crate::db::PgPool;
use crate::normalize::normalize_skill_code;
use crate::{Candidate, Position};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
}

/// Stored proficiency is a 0-5 integer; the engine expects [0, 1].
fn normalize_proficiency(raw: i16) -> f64 {
    (f64::from(raw) / 5.0).clamp(0.0, 1.0)
}

#[instrument(skip(pool))]
pub async fn load_candidates(pool: &PgPool) -> Result<Vec<Candidate>, SnapshotError> {
    let client = pool.get().await?;

    let rows = client
        .timed_query(
            "SELECT candidate_id, qualification, skills_text, location_code, pincode
             FROM alloc.candidate
             WHERE is_active
             ORDER BY candidate_id",
            &[],
            "snapshot_candidates",
        )
        .await?;

    let mut candidates = Vec::with_capacity(rows.len());
    let mut index_of: HashMap<i64, usize> = HashMap::with_capacity(rows.len());
    for row in rows {
        let id: i64 = row.get("candidate_id");
        index_of.insert(id, candidates.len());
        candidates.push(Candidate {
            id,
            qualification: row.get("qualification"),
            skills_text: row.get("skills_text"),
            location_code: row.get("location_code"),
            pincode: row.get("pincode"),
            ..Candidate::default()
        });
    }

    let skill_rows = client
        .timed_query(
            "SELECT candidate_id, skill_code, proficiency FROM alloc.candidate_skill",
            &[],
            "snapshot_candidate_skills",
        )
        .await?;
    for row in skill_rows {
        let id: i64 = row.get("candidate_id");
        if let Some(&idx) = index_of.get(&id) {
            let code: String = row.get("skill_code");
            let raw: i16 = row.get("proficiency");
            candidates[idx]
                .skills
                .insert(normalize_skill_code(&code), normalize_proficiency(raw));
        }
    }

    let pref_rows = client
        .timed_query(
            "SELECT candidate_id, position_id, ranked FROM alloc.preference",
            &[],
            "snapshot_preferences",
        )
        .await?;
    for row in pref_rows {
        let id: i64 = row.get("candidate_id");
        if let Some(&idx) = index_of.get(&id) {
            let position_id: i64 = row.get("position_id");
            let ranked: i32 = row.get("ranked");
            candidates[idx].preferences.insert(position_id, ranked);
        }
    }

    Ok(candidates)
}

#[instrument(skip(pool))]
pub async fn load_positions(pool: &PgPool) -> Result<Vec<Position>, SnapshotError> {
    let client = pool.get().await?;

    let rows = client
        .timed_query(
            "SELECT position_id, capacity, min_qualification, requirements_text,
                    location_code, pincode
             FROM alloc.position
             WHERE is_active
             ORDER BY position_id",
            &[],
            "snapshot_positions",
        )
        .await?;

    let mut positions = Vec::with_capacity(rows.len());
    let mut index_of: HashMap<i64, usize> = HashMap::with_capacity(rows.len());
    for row in rows {
        let id: i64 = row.get("position_id");
        let capacity: i32 = row.get("capacity");
        index_of.insert(id, positions.len());
        positions.push(Position {
            id,
            capacity: capacity.max(0) as u32,
            min_qualification: row.get("min_qualification"),
            requirements_text: row.get("requirements_text"),
            location_code: row.get("location_code"),
            pincode: row.get("pincode"),
            ..Position::default()
        });
    }

    let skill_rows = client
        .timed_query(
            "SELECT position_id, skill_code, weight FROM alloc.position_skill",
            &[],
            "snapshot_position_skills",
        )
        .await?;
    for row in skill_rows {
        let id: i64 = row.get("position_id");
        if let Some(&idx) = index_of.get(&id) {
            let code: String = row.get("skill_code");
            let weight: f64 = row.get("weight");
            positions[idx]
                .required_skills
                .insert(normalize_skill_code(&code), weight);
        }
    }

    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proficiency_scales_to_unit_interval() {
        assert_eq!(normalize_proficiency(0), 0.0);
        assert_eq!(normalize_proficiency(5), 1.0);
        assert!((normalize_proficiency(3) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn proficiency_clamps_out_of_range_values() {
        assert_eq!(normalize_proficiency(7), 1.0);
        assert_eq!(normalize_proficiency(-1), 0.0);
    }
}
