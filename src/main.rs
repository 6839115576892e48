use clap::{Parser, Subcommand};
use salewatch::{
    cmd::{SnapshotArgs, snapshot},
    config::AppConfig,
    supervisor::Supervisor,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing `app.yaml`.
    #[arg(long, global = true)]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the refresh scheduler and the dashboard API.
    Run,
    /// Fetches every aggregator once and prints the results as JSON.
    Snapshot(SnapshotArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    tracing::debug!(config_dir = ?cli.config_dir, "Loading application configuration...");
    let config = AppConfig::new(cli.config_dir.as_deref())?;
    tracing::debug!(shop = %config.shop.name, tags = ?config.campaign.target_tags, "Configuration loaded.");

    match cli.command {
        Commands::Run => run_supervisor(config).await?,
        Commands::Snapshot(args) => snapshot::execute(config, args).await?,
    }

    Ok(())
}

async fn run_supervisor(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let supervisor = Supervisor::builder().config(config).build()?;

    tracing::info!("Supervisor initialized, starting refresh tasks...");

    supervisor.run().await?;

    Ok(())
}
