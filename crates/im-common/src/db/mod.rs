pub mod matches;
pub mod migrations;
pub mod pool;
pub mod runs;
pub mod snapshot;
pub mod util;

// Keep re-exports unique so downstream crates see a single symbol per helper.
pub use matches::{insert_matches, MatchInsert, MatchStorageError};
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool_from_url, DbPoolError, PgPool};
pub use runs::{
    committed_pairs, create_run, latest_successful_run, mark_failed, mark_running, mark_success,
    RunLedgerError, RunRecord, RunStatus,
};
pub use snapshot::{load_candidates, load_positions, SnapshotError};
