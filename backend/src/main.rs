//! `cats-match` entry-point: wires configuration, the PostgreSQL adapters and
//! the lifecycle service behind the command-line adapter.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::ffi::OsString;
use std::process::ExitCode;
use std::sync::Arc;

use cats_social::config::MatchEngineSettings;
use cats_social::domain::MatchLifecycleService;
use cats_social::inbound::cli::{self, CliArgs, CliState, EXIT_STARTUP_FAILURE};
use cats_social::outbound::persistence::{
    DbPool, DieselIdentityProvider, DieselMatchStore, run_pending_migrations_async,
};
use clap::Parser;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// Failures before a command reaches the domain.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("create Tokio runtime: {0}")]
    Runtime(String),
    #[error("load configuration: {0}")]
    Config(String),
    #[error("no database URL: pass --database-url, set CATS_MATCH_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,
    #[error("create database pool: {0}")]
    Pool(String),
    #[error("apply migrations: {0}")]
    Migrations(String),
}

fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(std::io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let outcome = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| StartupError::Runtime(err.to_string()))
        .and_then(|runtime| runtime.block_on(async_main(args)));

    match outcome {
        Ok(output) => {
            println!("{}", output.body);
            ExitCode::from(output.exit_code)
        }
        Err(err) => {
            error!(error = %err, "startup failed");
            eprintln!("{err}");
            ExitCode::from(EXIT_STARTUP_FAILURE)
        }
    }
}

async fn async_main(args: CliArgs) -> Result<cli::CliOutput, StartupError> {
    let settings = MatchEngineSettings::load_from_iter([OsString::from("cats-match")])
        .map_err(|err| StartupError::Config(err.to_string()))?;

    let database_url = settings
        .resolve_database_url(args.database_url.clone(), env::var("DATABASE_URL").ok())
        .ok_or(StartupError::MissingDatabaseUrl)?;

    if settings.run_migrations {
        let applied = run_pending_migrations_async(database_url.clone())
            .await
            .map_err(|err| StartupError::Migrations(err.to_string()))?;
        info!(applied, "migrations up to date");
    }

    let pool = DbPool::new(settings.pool_config(database_url))
        .await
        .map_err(|err| StartupError::Pool(err.to_string()))?;

    let service = Arc::new(MatchLifecycleService::new(
        Arc::new(DieselMatchStore::new(pool.clone())),
        Arc::new(DefaultClock),
    ));
    let state = CliState::new(
        Arc::new(DieselIdentityProvider::new(pool)),
        service.clone(),
        service,
    );

    Ok(cli::run(&state, args).await)
}
