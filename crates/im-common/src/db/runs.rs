//! Run ledger persistence. Every allocation attempt leaves a row in
//! `alloc.alloc_run` regardless of outcome, so operators can audit what
//! ran, with which parameters, and why it failed.

use chrono::{DateTime, Utc};
use deadpool_postgres::PoolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::instrument;

use crate::db::util::{normalize_json, TimedClientExt};
use crate::db::PgPool;

#[derive(Debug, Error)]
pub enum RunLedgerError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("unknown run status: {0}")]
    UnknownStatus(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    Running,
    Success,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::Running => "running",
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, RunLedgerError> {
        match raw {
            "queued" => Ok(RunStatus::Queued),
            "running" => Ok(RunStatus::Running),
            "success" => Ok(RunStatus::Success),
            "failed" => Ok(RunStatus::Failed),
            other => Err(RunLedgerError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunRecord {
    pub run_id: String,
    pub status: RunStatus,
    pub params: Option<Value>,
    pub metrics: Option<Value>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn record_from_row(row: &tokio_postgres::Row) -> Result<RunRecord, RunLedgerError> {
    let status_raw: String = row.get("status");
    Ok(RunRecord {
        run_id: row.get("run_id"),
        status: RunStatus::parse(&status_raw)?,
        params: row.get("params"),
        metrics: row.get("metrics"),
        error_message: row.get("error_message"),
        created_at: row.get("created_at"),
    })
}

#[instrument(skip(pool, params))]
pub async fn create_run(
    pool: &PgPool,
    run_id: &str,
    params: &Option<Value>,
) -> Result<(), RunLedgerError> {
    let client = pool.get().await?;
    client
        .timed_execute(
            "INSERT INTO alloc.alloc_run (run_id, status, params) VALUES ($1, $2, $3)",
            &[&run_id, &RunStatus::Queued.as_str(), &normalize_json(params)],
            "create_run",
        )
        .await?;
    Ok(())
}

#[instrument(skip(pool))]
pub async fn mark_running(pool: &PgPool, run_id: &str) -> Result<(), RunLedgerError> {
    let client = pool.get().await?;
    client
        .timed_execute(
            "UPDATE alloc.alloc_run SET status = $2 WHERE run_id = $1",
            &[&run_id, &RunStatus::Running.as_str()],
            "mark_running",
        )
        .await?;
    Ok(())
}

#[instrument(skip(pool, metrics))]
pub async fn mark_success(
    pool: &PgPool,
    run_id: &str,
    metrics: &Option<Value>,
) -> Result<(), RunLedgerError> {
    let client = pool.get().await?;
    client
        .timed_execute(
            "UPDATE alloc.alloc_run SET status = $2, metrics = $3 WHERE run_id = $1",
            &[&run_id, &RunStatus::Success.as_str(), &normalize_json(metrics)],
            "mark_success",
        )
        .await?;
    Ok(())
}

#[instrument(skip(pool))]
pub async fn mark_failed(
    pool: &PgPool,
    run_id: &str,
    error_message: &str,
) -> Result<(), RunLedgerError> {
    let client = pool.get().await?;
    client
        .timed_execute(
            "UPDATE alloc.alloc_run SET status = $2, error_message = $3 WHERE run_id = $1",
            &[&run_id, &RunStatus::Failed.as_str(), &error_message],
            "mark_failed",
        )
        .await?;
    Ok(())
}

#[instrument(skip(pool))]
pub async fn latest_successful_run(pool: &PgPool) -> Result<Option<RunRecord>, RunLedgerError> {
    let client = pool.get().await?;
    let row = client
        .timed_query_opt(
            "SELECT run_id, status, params, metrics, error_message, created_at
             FROM alloc.alloc_run
             WHERE status = 'success'
             ORDER BY created_at DESC, run_id DESC
             LIMIT 1",
            &[],
            "latest_successful_run",
        )
        .await?;
    row.as_ref().map(record_from_row).transpose()
}

/// Every (candidate, position) pair committed by a successful run.
/// These pairs are treated as frozen by subsequent incremental runs.
#[instrument(skip(pool))]
pub async fn committed_pairs(pool: &PgPool) -> Result<Vec<(i64, i64)>, RunLedgerError> {
    let client = pool.get().await?;
    let rows = client
        .timed_query(
            "SELECT m.candidate_id, m.position_id
             FROM alloc.match_result m
             JOIN alloc.alloc_run r ON r.run_id = m.run_id
             WHERE r.status = 'success'
             ORDER BY m.candidate_id, m.position_id",
            &[],
            "committed_pairs",
        )
        .await?;
    Ok(rows
        .iter()
        .map(|row| (row.get("candidate_id"), row.get("position_id")))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            RunStatus::Queued,
            RunStatus::Running,
            RunStatus::Success,
            RunStatus::Failed,
        ] {
            assert_eq!(RunStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(matches!(
            RunStatus::parse("done"),
            Err(RunLedgerError::UnknownStatus(_))
        ));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&RunStatus::Success).unwrap();
        assert_eq!(json, "\"success\"");
    }
}
