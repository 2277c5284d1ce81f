//! File implementation of TableSink.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

use crate::error::{PipelineError, PipelineResult};
use crate::ports::{LoadReceipt, TableSink};
use crate::services::frame::TableFrame;

/// Writes `<dir>/<table>_clean.csv` and counts the data rows read back.
#[derive(Debug, Clone)]
pub struct CsvTableSink {
    dir: PathBuf,
}

impl CsvTableSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{}_clean.csv", table))
    }
}

#[async_trait]
impl TableSink for CsvTableSink {
    fn target(&self) -> &'static str {
        "csv"
    }

    async fn load(&self, frame: &TableFrame) -> PipelineResult<LoadReceipt> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PipelineError::io(&self.dir, e))?;

        let path = self.path_for(&frame.name);
        let bytes = frame.to_csv_bytes().map_err(|e| PipelineError::io(&path, e))?;
        fs::write(&path, bytes)
            .await
            .map_err(|e| PipelineError::io(&path, e))?;

        let written = fs::read(&path)
            .await
            .map_err(|e| PipelineError::io(&path, e))?;
        let persisted_rows = count_records(&written).map_err(|e| PipelineError::io(&path, e.into()))?;

        Ok(LoadReceipt {
            location: path.display().to_string(),
            persisted_rows,
        })
    }
}

fn count_records(bytes: &[u8]) -> Result<u64, csv::Error> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut count = 0;
    for record in reader.records() {
        record?;
        count += 1;
    }
    Ok(count)
}
