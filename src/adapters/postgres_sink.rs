//! Postgres implementation of TableSink.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::partition::PartitionManager;
use crate::domain::Value;
use crate::error::{PipelineError, PipelineResult};
use crate::ports::{LoadReceipt, TableSink};
use crate::services::frame::TableFrame;
use crate::services::sources::{LOGS, TRANSACTIONS};

const TIMESTAMP_COLUMN: &str = "date_heure";

/// Streams each table through `COPY ... FROM STDIN` inside one transaction.
#[derive(Clone)]
pub struct PostgresTableSink {
    pool: PgPool,
}

impl PostgresTableSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Relational table backing a logical table name.
pub fn relational_table(name: &str) -> &str {
    match name {
        LOGS => "behavior_logs",
        other => other,
    }
}

fn copy_statement(table: &str, columns: &[String]) -> String {
    format!(
        "COPY {} ({}) FROM STDIN WITH (FORMAT csv, HEADER true)",
        table,
        columns.join(", ")
    )
}

fn frame_months(frame: &TableFrame) -> Vec<chrono::NaiveDate> {
    let Some(index) = frame.columns.iter().position(|c| c == TIMESTAMP_COLUMN) else {
        return Vec::new();
    };
    PartitionManager::months_of(frame.rows.iter().filter_map(|row| match &row[index] {
        Value::DateTime(at) => Some(at.date()),
        _ => None,
    }))
}

#[async_trait]
impl TableSink for PostgresTableSink {
    fn target(&self) -> &'static str {
        "postgres"
    }

    async fn load(&self, frame: &TableFrame) -> PipelineResult<LoadReceipt> {
        let table = relational_table(&frame.name);
        let bytes = frame
            .to_csv_bytes()
            .map_err(|e| PipelineError::io(format!("<{} copy buffer>", table), e))?;

        let mut tx = self.pool.begin().await?;

        if frame.name == TRANSACTIONS {
            PartitionManager::ensure_months(&mut *tx, &frame_months(frame)).await?;
        }

        let count_sql = format!("SELECT COUNT(*) FROM {}", table);
        let before: i64 = sqlx::query_scalar(&count_sql).fetch_one(&mut *tx).await?;

        let mut copy = tx.copy_in_raw(&copy_statement(table, &frame.columns)).await?;
        copy.send(bytes).await?;
        copy.finish().await?;

        let after: i64 = sqlx::query_scalar(&count_sql).fetch_one(&mut *tx).await?;
        tx.commit().await?;

        tracing::info!(table, before, after, "COPY committed");
        Ok(LoadReceipt {
            location: table.to_string(),
            persisted_rows: (after - before).max(0) as u64,
        })
    }
}
