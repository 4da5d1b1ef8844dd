//! Run orchestration: ties the ledger, snapshot loaders, and the pure
//! allocation engine together.
//!
//! Lifecycle per run: insert as `queued`, flip to `running`, then land
//! on `success` (matches + metrics persisted) or `failed` (error
//! message persisted). Domain failures such as an empty snapshot are
//! recorded on the run and reported back as a value; only
//! infrastructure errors propagate as `Err`.

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::db::{
    committed_pairs, create_run, insert_matches, load_candidates, load_positions, mark_failed,
    mark_running, mark_success, MatchInsert, MatchStorageError, PgPool, RunLedgerError, RunStatus,
    SnapshotError,
};
use crate::matching::engine::{AllocationEngine, RunMetrics, RunParams};
use crate::matching::freeze::FrozenState;
use crate::run_id;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Ledger(#[from] RunLedgerError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Matches(#[from] MatchStorageError),
}

/// Outcome of one orchestrated run, mirroring what the ledger row says.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: String,
    pub status: RunStatus,
    pub metrics: Option<RunMetrics>,
    pub note: Option<String>,
    pub error_message: Option<String>,
}

/// JSON summary of a ledger row, for operator-facing status output.
pub fn run_record_summary(record: &crate::db::RunRecord) -> Value {
    json!({
        "run_id": record.run_id,
        "status": record.status,
        "params": record.params,
        "metrics": record.metrics,
        "error": record.error_message,
        "created_at": record.created_at.to_rfc3339(),
    })
}

fn params_json(params: &RunParams, respect_existing: bool) -> Value {
    json!({
        "mode": params.mode.as_str(),
        "weights": params.scoring.weights,
        "pincode_prefix_len": params.scoring.pincode_prefix_len,
        "respect_existing": respect_existing,
        "scoped": params.scope.is_some(),
        "scope_size": params.scope.as_ref().map(|s| s.len()),
    })
}

fn metrics_json(metrics: &RunMetrics, note: &Option<String>) -> Value {
    let mut value = json!(metrics);
    if let (Some(obj), Some(note)) = (value.as_object_mut(), note) {
        obj.insert("note".into(), json!(note));
    }
    value
}

/// Execute one allocation run end to end and record it in the ledger.
#[instrument(skip(pool, params), fields(mode = params.mode.as_str()))]
pub async fn execute_run(
    pool: &PgPool,
    params: RunParams,
    respect_existing: bool,
) -> Result<RunReport, LedgerError> {
    let run_id = run_id::generate();
    create_run(pool, &run_id, &Some(params_json(&params, respect_existing))).await?;
    mark_running(pool, &run_id).await?;
    info!(run_id, "run_started");

    match drive(pool, &run_id, params, respect_existing).await {
        Ok(report) => Ok(report),
        Err(err) => {
            // Best effort: the run should not stay stuck in `running`
            // because recording the failure also failed.
            if let Err(mark_err) = mark_failed(pool, &run_id, &err.to_string()).await {
                error!(run_id, error = %mark_err, "failed to record run failure");
            }
            Err(err)
        }
    }
}

async fn drive(
    pool: &PgPool,
    run_id: &str,
    params: RunParams,
    respect_existing: bool,
) -> Result<RunReport, LedgerError> {
    let engine = match AllocationEngine::new(params) {
        Ok(engine) => engine,
        Err(err) => return fail(pool, run_id, &err.to_string()).await,
    };

    let candidates = load_candidates(pool).await?;
    let positions = load_positions(pool).await?;

    let frozen = if respect_existing {
        FrozenState::from_committed_pairs(&committed_pairs(pool).await?)
    } else {
        FrozenState::default()
    };
    info!(
        run_id,
        candidates = candidates.len(),
        positions = positions.len(),
        frozen_placements = frozen.placed_count(),
        "snapshot_loaded"
    );

    let allocation = match engine.run(&candidates, &positions, &frozen) {
        Ok(allocation) => allocation,
        Err(err) => return fail(pool, run_id, &err.to_string()).await,
    };

    let weights = &engine.params().scoring.weights;
    let inserts: Vec<MatchInsert> = allocation
        .matches
        .iter()
        .map(|m| MatchInsert {
            candidate_id: m.candidate_id,
            position_id: m.position_id,
            slot_index: m.slot_index as i32,
            final_score: m.score.total,
            components: Some(m.score.breakdown(weights)),
            explanation: Some(m.explanation.clone()),
        })
        .collect();
    insert_matches(pool, run_id, &inserts).await?;

    mark_success(
        pool,
        run_id,
        &Some(metrics_json(&allocation.metrics, &allocation.note)),
    )
    .await?;
    info!(
        run_id,
        assigned = allocation.metrics.assigned,
        fill_rate = allocation.metrics.fill_rate,
        coverage = allocation.metrics.coverage,
        "run_succeeded"
    );

    Ok(RunReport {
        run_id: run_id.to_string(),
        status: RunStatus::Success,
        metrics: Some(allocation.metrics),
        note: allocation.note,
        error_message: None,
    })
}

async fn fail(pool: &PgPool, run_id: &str, message: &str) -> Result<RunReport, LedgerError> {
    mark_failed(pool, run_id, message).await?;
    info!(run_id, error = message, "run_failed");
    Ok(RunReport {
        run_id: run_id.to_string(),
        status: RunStatus::Failed,
        metrics: None,
        note: None,
        error_message: Some(message.to_string()),
    })
}
