//! Storage seam used by the loader.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::PipelineResult;
use crate::services::frame::TableFrame;

/// What a sink reports back after persisting a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReceipt {
    /// File path or relational table the rows landed in.
    pub location: String,
    /// Row count re-read from the persisted form, not echoed from the input.
    pub persisted_rows: u64,
}

#[async_trait]
pub trait TableSink: Send + Sync {
    /// Short label used in logs and the run report.
    fn target(&self) -> &'static str;

    async fn load(&self, frame: &TableFrame) -> PipelineResult<LoadReceipt>;
}
