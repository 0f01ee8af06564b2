use crate::{
    commands::Commands, config::JobDefinition, conn::PostgresConnectionPinger, error::CliError,
};
use clap::Parser;
use engine_core::state::{JobRepository, sled_store::SledJobRepository};
use engine_runtime::execution::executor;
use model::execution::status::ExitStatus;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod conn;
mod error;
mod listener;

#[derive(Parser)]
#[command(name = "batchline", version = "0.1.0", about = "Chunked batch ETL runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            let definition = JobDefinition::load(&config)?;
            let repository = open_repository()?;
            let job = definition.build().await?;

            let execution = executor::run(job, repository).await?;
            if execution.status == ExitStatus::Failed {
                return Err(CliError::JobFailed {
                    job: execution.job_name,
                    run_id: execution.run_id,
                });
            }
        }
        Commands::Runs { job, json } => {
            let repository = open_repository()?;
            let runs = repository.list_runs(&job).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&runs)?);
            } else if runs.is_empty() {
                println!("No recorded runs for job `{job}`");
            } else {
                for run in runs {
                    println!(
                        "run {:>4}  {:<9}  read/written: {}/{}  started: {}",
                        run.run_id,
                        run.status.to_string(),
                        run.steps.iter().map(|s| s.records_read).sum::<u64>(),
                        run.records_written(),
                        run.started_at.format("%Y-%m-%d %H:%M:%S"),
                    );
                }
            }
        }
        Commands::TestConn { conn_str } => {
            PostgresConnectionPinger { conn_str }.ping().await?;
        }
    }

    Ok(())
}

fn open_repository() -> Result<Arc<dyn JobRepository>, CliError> {
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Init("Could not determine home directory".to_string()))?;
    let store = SledJobRepository::open(home.join(".batchline/state"))
        .map_err(engine_core::error::RepositoryError::from)?;
    Ok(Arc::new(store))
}
