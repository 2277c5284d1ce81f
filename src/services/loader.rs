use serde::Serialize;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::ports::TableSink;
use crate::services::frame::TableFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadStatus {
    Ok,
    IntegrityMismatch,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableLoad {
    pub table: String,
    pub rows: usize,
    pub columns: usize,
    pub location: Option<String>,
    pub status: LoadStatus,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub target: String,
    pub tables: Vec<TableLoad>,
}

impl LoadReport {
    pub fn all_ok(&self) -> bool {
        self.tables.iter().all(|t| t.status == LoadStatus::Ok)
    }

    pub fn status_of(&self, table: &str) -> Option<LoadStatus> {
        self.tables.iter().find(|t| t.table == table).map(|t| t.status)
    }
}

/// Persists tables one by one. A failing table is recorded and the rest still load.
pub struct Loader {
    sink: Box<dyn TableSink>,
}

impl Loader {
    pub fn new(sink: Box<dyn TableSink>) -> Self {
        Self { sink }
    }

    pub async fn load_all(&self, frames: &[TableFrame]) -> LoadReport {
        let mut tables = Vec::with_capacity(frames.len());
        for frame in frames {
            tables.push(self.load_one(frame).await);
        }

        let report = LoadReport {
            target: self.sink.target().to_string(),
            tables,
        };
        info!(
            sink = %report.target,
            tables = report.tables.len(),
            all_ok = report.all_ok(),
            "Load finished"
        );
        report
    }

    async fn load_one(&self, frame: &TableFrame) -> TableLoad {
        let shape = frame.shape();
        let mut entry = TableLoad {
            table: frame.name.clone(),
            rows: shape.rows,
            columns: shape.columns,
            location: None,
            status: LoadStatus::Ok,
            error: None,
        };

        match self.sink.load(frame).await {
            Ok(receipt) if receipt.persisted_rows == shape.rows as u64 => {
                info!(table = %frame.name, rows = shape.rows, location = %receipt.location, "Table loaded");
                entry.location = Some(receipt.location);
            }
            Ok(receipt) => {
                let err = PipelineError::IntegrityMismatch {
                    table: frame.name.clone(),
                    expected: shape.rows as u64,
                    actual: receipt.persisted_rows,
                };
                warn!(table = %frame.name, error = %err, "Integrity check failed");
                entry.location = Some(receipt.location);
                entry.status = LoadStatus::IntegrityMismatch;
                entry.error = Some(err.to_string());
            }
            Err(err) => {
                warn!(table = %frame.name, error = %err, "Table load failed");
                entry.status = LoadStatus::Failed;
                entry.error = Some(err.to_string());
            }
        }
        entry
    }
}
