//! Match persistence. A run's matches are written in a single
//! transaction so a failure leaves no partial result behind.

use deadpool_postgres::PoolError;
use serde_json::Value;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::{info, instrument};

use crate::db::util::normalize_json;
use crate::db::PgPool;

#[derive(Debug, Error)]
pub enum MatchStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
}

#[derive(Debug, Clone)]
pub struct MatchInsert {
    pub candidate_id: i64,
    pub position_id: i64,
    pub slot_index: i32,
    pub final_score: f64,
    pub components: Option<Value>,
    pub explanation: Option<String>,
}

/// Insert all matches for a run, all-or-nothing.
#[instrument(skip(pool, matches), fields(count = matches.len()))]
pub async fn insert_matches(
    pool: &PgPool,
    run_id: &str,
    matches: &[MatchInsert],
) -> Result<(), MatchStorageError> {
    if matches.is_empty() {
        return Ok(());
    }

    let mut client = pool.get().await?;
    let tx = client.transaction().await?;
    let statement = tx
        .prepare(
            "INSERT INTO alloc.match_result
                 (run_id, candidate_id, position_id, slot_index,
                  final_score, components, explanation)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .await?;

    for m in matches {
        tx.execute(
            &statement,
            &[
                &run_id,
                &m.candidate_id,
                &m.position_id,
                &m.slot_index,
                &m.final_score,
                &normalize_json(&m.components),
                &m.explanation,
            ],
        )
        .await?;
    }

    tx.commit().await?;
    info!(run_id, count = matches.len(), "matches_persisted");
    Ok(())
}
