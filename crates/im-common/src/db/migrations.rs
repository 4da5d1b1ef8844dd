use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::{info, instrument};

use crate::db::PgPool;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to run migration: {0}")]
    Postgres(#[from] PgError),
}

struct Migration {
    id: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    id: 1,
    description: "allocation schema: snapshots, runs, matches",
    sql: r#"
CREATE SCHEMA IF NOT EXISTS alloc;

CREATE TABLE IF NOT EXISTS alloc.candidate (
    candidate_id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    qualification DOUBLE PRECISION,
    skills_text TEXT NOT NULL DEFAULT '',
    location_code TEXT,
    pincode TEXT,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS alloc.candidate_skill (
    candidate_id BIGINT NOT NULL REFERENCES alloc.candidate(candidate_id) ON DELETE CASCADE,
    skill_code TEXT NOT NULL,
    proficiency SMALLINT NOT NULL DEFAULT 0
        CHECK (proficiency >= 0 AND proficiency <= 5),
    PRIMARY KEY (candidate_id, skill_code)
);

CREATE TABLE IF NOT EXISTS alloc.position (
    position_id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    capacity INTEGER NOT NULL DEFAULT 1 CHECK (capacity >= 0),
    min_qualification DOUBLE PRECISION NOT NULL DEFAULT 0
        CHECK (min_qualification >= 0),
    requirements_text TEXT NOT NULL DEFAULT '',
    location_code TEXT,
    pincode TEXT,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS alloc.position_skill (
    position_id BIGINT NOT NULL REFERENCES alloc.position(position_id) ON DELETE CASCADE,
    skill_code TEXT NOT NULL,
    weight DOUBLE PRECISION NOT NULL DEFAULT 1.0 CHECK (weight >= 0),
    PRIMARY KEY (position_id, skill_code)
);

CREATE TABLE IF NOT EXISTS alloc.preference (
    candidate_id BIGINT NOT NULL REFERENCES alloc.candidate(candidate_id) ON DELETE CASCADE,
    position_id BIGINT NOT NULL REFERENCES alloc.position(position_id) ON DELETE CASCADE,
    ranked INTEGER NOT NULL CHECK (ranked >= 1),
    PRIMARY KEY (candidate_id, position_id)
);

CREATE TABLE IF NOT EXISTS alloc.alloc_run (
    run_id TEXT PRIMARY KEY,
    status TEXT NOT NULL
        CHECK (status IN ('queued', 'running', 'success', 'failed')),
    params JSONB,
    metrics JSONB,
    error_message TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_alloc_run_status_created
    ON alloc.alloc_run(status, created_at);

CREATE TABLE IF NOT EXISTS alloc.match_result (
    match_id BIGSERIAL PRIMARY KEY,
    run_id TEXT NOT NULL REFERENCES alloc.alloc_run(run_id) ON DELETE CASCADE,
    candidate_id BIGINT NOT NULL REFERENCES alloc.candidate(candidate_id),
    position_id BIGINT NOT NULL REFERENCES alloc.position(position_id),
    slot_index INTEGER NOT NULL DEFAULT 1 CHECK (slot_index >= 1),
    final_score DOUBLE PRECISION NOT NULL
        CHECK (final_score >= 0.0 AND final_score <= 1.0),
    components JSONB,
    explanation TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (run_id, candidate_id),
    UNIQUE (run_id, position_id, slot_index)
);

CREATE INDEX IF NOT EXISTS idx_match_result_run
    ON alloc.match_result(run_id);
"#,
}];

#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    let mut client = pool.get().await?;
    client
        .batch_execute(
            "CREATE SCHEMA IF NOT EXISTS alloc;
             CREATE TABLE IF NOT EXISTS alloc.schema_migrations (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
             );",
        )
        .await?;

    for migration in MIGRATIONS {
        let already_applied: bool = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM alloc.schema_migrations WHERE id = $1)",
                &[&migration.id],
            )
            .await?
            .get(0);

        if already_applied {
            continue;
        }

        let tx = client.transaction().await?;
        tx.batch_execute(migration.sql).await?;
        tx.execute(
            "INSERT INTO alloc.schema_migrations (id, description) VALUES ($1, $2)",
            &[&migration.id, &migration.description],
        )
        .await?;
        tx.commit().await?;

        info!(
            id = migration.id,
            description = migration.description,
            "applied migration"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_ids_are_unique_and_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(window[0].id < window[1].id);
        }
    }

    #[test]
    fn schema_covers_ledger_tables() {
        let sql = MIGRATIONS[0].sql;
        for table in [
            "alloc.candidate",
            "alloc.position",
            "alloc.preference",
            "alloc.alloc_run",
            "alloc.match_result",
        ] {
            assert!(sql.contains(table), "missing table: {table}");
        }
        assert!(sql.contains("UNIQUE (run_id, candidate_id)"));
        assert!(sql.contains("UNIQUE (run_id, position_id, slot_index)"));
        assert!(sql.contains("ON DELETE CASCADE"));
    }
}
