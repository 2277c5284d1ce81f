use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::error::{PipelineError, PipelineResult};
use crate::services::cleaner::CleaningReport;
use crate::services::frame::TableShape;
use crate::services::loader::LoadReport;

/// Summary of one pipeline run, written to `etl_report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub executed_at: DateTime<Utc>,
    pub stages: Vec<String>,
    pub sources: Vec<String>,
    pub cleaning: Vec<CleaningReport>,
    pub tables: BTreeMap<String, TableShape>,
    pub load: LoadReport,
}

impl RunReport {
    pub fn write_to(&self, path: &Path) -> PipelineResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            PipelineError::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        fs::write(path, json).map_err(|e| PipelineError::io(path, e))
    }
}
