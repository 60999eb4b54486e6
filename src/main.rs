//! DeepSandbox server entry point.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use deepsandbox::adapters::sqlite::{
    create_pool, run_migrations, PoolConfig, SqliteCounterStore, SqliteDatasetCatalog,
    SqliteTaskRepository,
};
use deepsandbox::adapters::{StaticIdentityProvider, StubExecutor};
use deepsandbox::api::{build_router, AppState};
use deepsandbox::services::{ExecutionWorkerPool, TaskQueueService};
use deepsandbox::{Config, ConfigLoader};

#[derive(Parser)]
#[command(name = "deepsandbox", about = "Admission-controlled code execution API")]
struct Cli {
    /// Path to a configuration file (overrides the default search)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    match cli.command {
        Commands::Serve => serve(config).await,
        Commands::Migrate => migrate(&config).await,
    }
}

async fn migrate(config: &Config) -> Result<()> {
    let pool = open_pool(config).await?;
    run_migrations(&pool).await.context("Migration failed")?;
    info!("migrations applied");
    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    let pool = open_pool(&config).await?;
    run_migrations(&pool).await.context("Migration failed")?;

    let repo = Arc::new(SqliteTaskRepository::new(pool.clone()));
    let executor = Arc::new(StubExecutor::default());
    let worker_pool = ExecutionWorkerPool::spawn(
        repo.clone(),
        executor,
        config.execution.pool_size,
        config.execution.queue_depth,
    );

    let state = AppState {
        queue: Arc::new(TaskQueueService::new(repo, worker_pool.sender())),
        counters: Arc::new(SqliteCounterStore::new(pool.clone())),
        datasets: Arc::new(SqliteDatasetCatalog::new(pool)),
        identities: Arc::new(StaticIdentityProvider::new(&config.api_keys)),
        admission: config.admission.clone(),
        execution: config.execution.clone(),
    };

    let app = build_router(state);
    let addr = format!("{}:{}", config.server.bind_addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(%addr, "deepsandbox API listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

async fn open_pool(config: &Config) -> Result<sqlx::SqlitePool> {
    let database_url = format!("sqlite:{}", config.database.path);
    let pool_config = PoolConfig {
        max_connections: config.database.max_connections,
        ..PoolConfig::default()
    };
    create_pool(&database_url, Some(pool_config))
        .await
        .context("Failed to connect to database")
}
