use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use stm_config::StmConfig;
use stm_db::StmDb;
use stm_server::Pipeline;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("stm error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    let mut config = StmConfig::load_with_dotenv().context("failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(path) = cli.db {
        config.database.path = path;
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config, cli.debug).await,
        Commands::Token { user, uid } => token(&config, &user, uid.as_deref()),
        Commands::Seed => seed(&config).await,
    }
}

fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("STM_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

async fn open_db(config: &StmConfig) -> anyhow::Result<StmDb> {
    StmDb::open_local(&config.database.path, config.database.busy_timeout())
        .await
        .with_context(|| format!("failed to open database at {}", config.database.path))
}

async fn serve(config: StmConfig, debug: bool) -> anyhow::Result<()> {
    config.validate_for_serving()?;
    let debug_enabled = debug;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), debug = debug_enabled, port = config.server.port, "starting");
    if config.database.is_in_memory() {
        tracing::warn!("serving from an in-memory database; nothing will be kept");
    }
    for (method, path) in stm_server::api::ROUTES {
        tracing::info!("  {method:<7} {path}");
    }

    let db = Arc::new(open_db(&config).await?);
    let pipeline = Arc::new(Pipeline::new(db, config.auth.token_secret.clone()));
    let address = config.server.bind_address();
    let runtime = tokio::runtime::Handle::current();

    tokio::task::spawn_blocking(move || stm_server::server::serve(pipeline, &address, runtime))
        .await
        .context("server thread panicked")?
}

fn token(config: &StmConfig, user: &str, uid: Option<&str>) -> anyhow::Result<()> {
    if !config.auth.is_configured() {
        anyhow::bail!("auth.token_secret is not set (STM_AUTH__TOKEN_SECRET)");
    }
    let token = stm_auth::issue(
        user,
        uid.unwrap_or(user),
        config.auth.token_lifetime_secs,
        &config.auth.token_secret,
        chrono::Utc::now(),
    )?;
    println!("{token}");
    Ok(())
}

async fn seed(config: &StmConfig) -> anyhow::Result<()> {
    let db = open_db(config).await?;
    let tx = db.begin().await?;
    if let Err(error) = stm_db::fixtures::seed_reference_data(&tx).await {
        tx.rollback().await?;
        return Err(error).context("failed to seed reference data (already seeded?)");
    }
    tx.commit().await?;
    println!("seeded {}", config.database.path);
    Ok(())
}
