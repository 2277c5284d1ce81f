use std::path::{Path, PathBuf};

pub const TRANSACTIONS: &str = "transactions";
pub const CLIENTS: &str = "clients";
pub const LOGS: &str = "logs";
pub const DATASET_FINAL: &str = "dataset_final";

/// Where the three raw artifacts live.
#[derive(Debug, Clone)]
pub struct SourceLayout {
    raw_dir: PathBuf,
}

impl SourceLayout {
    pub fn new(raw_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
        }
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.raw_dir.join("transactions.csv")
    }

    pub fn clients_path(&self) -> PathBuf {
        self.raw_dir.join("clients.xlsx")
    }

    pub fn events_path(&self) -> PathBuf {
        self.raw_dir.join("logs_comportement.json")
    }
}
