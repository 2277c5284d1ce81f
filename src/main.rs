use clap::Parser;
use fraud_etl::cli::{self, Cli, Commands, DbCommands, RunArgs};
use fraud_etl::config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Setup logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let cli = Cli::parse();
    match cli.command {
        None => cli::handle_run(&config, &RunArgs::default()).await,
        Some(Commands::Run(args)) => cli::handle_run(&config, &args).await,
        Some(Commands::Generate) => cli::handle_generate(&config),
        Some(Commands::Audit) => cli::handle_audit(&config),
        Some(Commands::Db(DbCommands::Migrate)) => cli::handle_db_migrate(&config).await,
        Some(Commands::Config) => cli::handle_config_validate(&config),
    }
}
