use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;

use crate::adapters::{CsvTableSink, PostgresTableSink};
use crate::config::{Config, LoadTarget};
use crate::ports::TableSink;
use crate::services::extractor::Extractor;
use crate::services::generator::write_raw_sources;
use crate::services::pipeline::{generate_sources, Pipeline};
use crate::services::quality::{analyze, QualityReport};
use crate::services::sources::{SourceLayout, CLIENTS, LOGS, TRANSACTIONS};

#[derive(Parser)]
#[command(name = "fraud-etl")]
#[command(about = "Fraud ETL - synthetic source generation, cleaning and loading", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline (default)
    Run(RunArgs),

    /// Write the synthetic raw sources only
    Generate,

    /// Print quality statistics of the raw sources as JSON
    Audit,

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Configuration validation
    Config,
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Number of transactions to generate
    #[arg(long, value_name = "N")]
    pub transactions: Option<usize>,

    /// Random seed
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Load target (csv or postgres)
    #[arg(long, value_name = "TARGET")]
    pub target: Option<String>,

    /// Reuse the raw sources already on disk
    #[arg(long)]
    pub skip_generate: bool,
}

impl RunArgs {
    pub fn apply(&self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(count) = self.transactions {
            config.transaction_count = count;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(target) = &self.target {
            config.load_target = target.parse()?;
        }
        config.validate()
    }
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
}

async fn build_sink(config: &Config) -> anyhow::Result<Box<dyn TableSink>> {
    match config.load_target {
        LoadTarget::Csv => Ok(Box::new(CsvTableSink::new(&config.processed_dir))),
        LoadTarget::Postgres => {
            let pool = crate::db::create_pool(database_url(config)?)
                .await
                .context("Failed to connect to the database")?;
            Ok(Box::new(PostgresTableSink::new(pool)))
        }
    }
}

fn database_url(config: &Config) -> anyhow::Result<&str> {
    config
        .database_url
        .as_deref()
        .context("DATABASE_URL is not set")
}

pub async fn handle_run(config: &Config, args: &RunArgs) -> anyhow::Result<()> {
    let mut config = config.clone();
    args.apply(&mut config)?;

    let sink = build_sink(&config).await?;
    let mut pipeline = Pipeline::new(config.clone(), sink);
    if args.skip_generate {
        pipeline = pipeline.skip_generate();
    }

    let report = pipeline.run().await?;

    println!("Run {}:", report.run_id);
    for table in &report.load.tables {
        println!(
            "  {:<14} {:>8} rows  {:?}{}",
            table.table,
            table.rows,
            table.status,
            table
                .error
                .as_deref()
                .map(|e| format!("  ({})", e))
                .unwrap_or_default()
        );
    }
    println!("  Report: {}", config.report_path().display());

    if report.load.all_ok() {
        println!("✓ Pipeline completed");
    } else {
        tracing::warn!("Some tables did not load cleanly");
        println!("⚠ Pipeline completed with load errors");
    }
    Ok(())
}

pub fn handle_generate(config: &Config) -> anyhow::Result<()> {
    let layout = SourceLayout::new(&config.raw_dir);
    let sources = generate_sources(config);
    write_raw_sources(&sources, &layout)?;

    tracing::info!(seed = config.seed, "Raw sources generated");
    println!(
        "✓ Generated {} transactions, {} clients, {} events in {}",
        sources.transactions.len(),
        sources.clients.len(),
        sources.events.len(),
        layout.raw_dir().display()
    );
    Ok(())
}

pub fn handle_audit(config: &Config) -> anyhow::Result<()> {
    let sources = Extractor::new(SourceLayout::new(&config.raw_dir)).extract_all()?;

    let reports: BTreeMap<&str, QualityReport> = [
        (TRANSACTIONS, analyze(TRANSACTIONS, &sources.transactions)),
        (CLIENTS, analyze(CLIENTS, &sources.clients)),
        (LOGS, analyze(LOGS, &sources.events)),
    ]
    .into_iter()
    .collect();

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

pub async fn handle_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(database_url(config)?).await?;

    tracing::info!("Running database migrations...");
    crate::db::run_migrations(&pool).await?;

    tracing::info!("Database migrations completed");
    println!("✓ Database migrations completed");

    Ok(())
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");
    config.validate()?;

    println!("Configuration:");
    println!("  Raw dir: {}", config.raw_dir.display());
    println!("  Processed dir: {}", config.processed_dir.display());
    println!("  Seed: {}", config.seed);
    println!("  Transactions: {}", config.transaction_count);
    println!("  Events per transaction: {}", config.events_per_transaction);
    println!("  Reference time: {}", config.reference_time);
    println!("  Load target: {:?}", config.load_target);
    println!(
        "  Database URL: {}",
        config
            .database_url
            .as_deref()
            .map(mask_password)
            .unwrap_or_else(|| "(not set)".to_string())
    );

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}

fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            if let Some(slash_pos) = url[..colon_pos].rfind("//") {
                let prefix = &url[..slash_pos + 2];
                let user = &url[slash_pos + 2..colon_pos];
                let suffix = &url[at_pos..];
                return format!("{}{}:****{}", prefix, user, suffix);
            }
        }
    }
    url.to_string()
}
