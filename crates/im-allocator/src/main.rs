use std::collections::HashSet;
use std::error::Error;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use im_common::db::{create_pool_from_url, latest_successful_run, run_migrations, PgPool};
use im_common::ledger::{execute_run, run_record_summary};
use im_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use im_common::matching::engine::RunParams;
use im_common::matching::scoring::ScoringConfig;
use im_common::matching::solver::SolverMode;
use im_common::matching::weights::{DEFAULT_WEIGHTS, TEXT_HEAVY_WEIGHTS};
use im_common::run_id;

const APP_NAME: &str = "im-allocator";

#[derive(Parser)]
#[command(name = APP_NAME, about = "Internship allocation runner")]
struct Cli {
    /// Postgres connection URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending schema migrations and exit.
    Migrate,
    /// Print the latest successful run recorded in the ledger.
    Status,
    /// Execute one allocation run and record it in the ledger.
    Allocate {
        /// Assignment strategy.
        #[arg(long, value_enum, default_value_t = ModeArg::Greedy)]
        mode: ModeArg,

        /// Restrict the run to these candidate ids (repeatable).
        #[arg(long = "scope", value_name = "CANDIDATE_ID")]
        scope: Vec<i64>,

        /// Recompute from scratch instead of freezing prior successful
        /// placements.
        #[arg(long)]
        ignore_existing: bool,

        /// Weight preset for the compatibility score.
        #[arg(long, value_enum, default_value_t = WeightsArg::Default)]
        weights: WeightsArg,

        /// Postal-code prefix length treated as "same area".
        #[arg(long, env = "IM_PINCODE_PREFIX_LEN", default_value_t = 3)]
        pincode_prefix_len: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Optimal,
    Greedy,
}

impl From<ModeArg> for SolverMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Optimal => SolverMode::Optimal,
            ModeArg::Greedy => SolverMode::Greedy,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum WeightsArg {
    /// Structured skills dominate (4-factor blend).
    Default,
    /// Free-text overlap dominates (3-factor blend).
    TextHeavy,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing_subscriber(APP_NAME);
    install_tracing_panic_hook(APP_NAME);

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        tracing::error!(error = %err, "command failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    info!(process_id = run_id::process(), "starting");
    let pool: PgPool = create_pool_from_url(&cli.database_url)?;

    match cli.command {
        Command::Migrate => {
            run_migrations(&pool).await?;
            info!("migrations applied");
        }
        Command::Status => match latest_successful_run(&pool).await? {
            Some(record) => {
                println!("{}", serde_json::to_string_pretty(&run_record_summary(&record))?);
            }
            None => println!("no successful run recorded"),
        },
        Command::Allocate {
            mode,
            scope,
            ignore_existing,
            weights,
            pincode_prefix_len,
        } => {
            let scope: Option<HashSet<i64>> = if scope.is_empty() {
                None
            } else {
                Some(scope.into_iter().collect())
            };
            let params = RunParams {
                mode: mode.into(),
                scoring: ScoringConfig {
                    weights: match weights {
                        WeightsArg::Default => DEFAULT_WEIGHTS,
                        WeightsArg::TextHeavy => TEXT_HEAVY_WEIGHTS,
                    },
                    pincode_prefix_len,
                    ..ScoringConfig::default()
                },
                scope,
            };

            let report = execute_run(&pool, params, !ignore_existing).await?;
            info!(
                run_id = report.run_id,
                status = report.status.as_str(),
                note = report.note.as_deref().unwrap_or(""),
                "run recorded"
            );
            println!("{}", serde_json::to_string_pretty(&report_summary(&report))?);
        }
    }

    Ok(())
}

fn report_summary(report: &im_common::ledger::RunReport) -> serde_json::Value {
    serde_json::json!({
        "run_id": report.run_id,
        "status": report.status,
        "metrics": report.metrics,
        "note": report.note,
        "error": report.error_message,
    })
}
