use anyhow::Context;
use chrono::NaiveDateTime;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::value::parse_timestamp;

pub const DEFAULT_REFERENCE_TIME: &str = "2024-06-30T00:00:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadTarget {
    Csv,
    Postgres,
}

impl FromStr for LoadTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(LoadTarget::Csv),
            "postgres" | "postgresql" => Ok(LoadTarget::Postgres),
            other => anyhow::bail!("ETL_LOAD_TARGET must be 'csv' or 'postgres', got '{}'", other),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub seed: u64,
    pub transaction_count: usize,
    pub events_per_transaction: usize,
    pub reference_time: NaiveDateTime,
    pub load_target: LoadTarget,
    pub database_url: Option<String>,
}

impl Config {
    /// Parse only. Callers validate once CLI overrides are applied.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        let reference_time = env::var("ETL_REFERENCE_TIME")
            .unwrap_or_else(|_| DEFAULT_REFERENCE_TIME.to_string());

        let config = Config {
            raw_dir: env::var("ETL_RAW_DIR")
                .unwrap_or_else(|_| "data/raw".to_string())
                .into(),
            processed_dir: env::var("ETL_PROCESSED_DIR")
                .unwrap_or_else(|_| "data/processed".to_string())
                .into(),
            seed: env::var("ETL_SEED")
                .unwrap_or_else(|_| "42".to_string())
                .parse()
                .context("ETL_SEED must be an unsigned integer")?,
            transaction_count: env::var("ETL_TRANSACTIONS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .context("ETL_TRANSACTIONS must be an unsigned integer")?,
            events_per_transaction: env::var("ETL_EVENTS_PER_TRANSACTION")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("ETL_EVENTS_PER_TRANSACTION must be an unsigned integer")?,
            reference_time: parse_timestamp(&reference_time)
                .context("ETL_REFERENCE_TIME must be an ISO-8601 timestamp")?,
            load_target: env::var("ETL_LOAD_TARGET")
                .unwrap_or_else(|_| "csv".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL").ok(),
        };

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.raw_dir.as_os_str().is_empty() {
            anyhow::bail!("ETL_RAW_DIR is empty");
        }
        if self.processed_dir.as_os_str().is_empty() {
            anyhow::bail!("ETL_PROCESSED_DIR is empty");
        }
        if self.load_target == LoadTarget::Postgres
            && self.database_url.as_deref().map_or(true, str::is_empty)
        {
            anyhow::bail!("DATABASE_URL is required when ETL_LOAD_TARGET=postgres");
        }
        Ok(())
    }

    pub fn report_path(&self) -> PathBuf {
        self.processed_dir.join("etl_report.json")
    }
}
