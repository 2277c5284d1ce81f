use chrono::{Datelike, NaiveDate};
use sqlx::PgConnection;
use std::collections::BTreeSet;
use tracing::info;

/// Creates the monthly range partitions of `transactions` a batch will land in.
pub struct PartitionManager;

impl PartitionManager {
    /// First day of every month covered by `dates`, ascending.
    pub fn months_of(dates: impl IntoIterator<Item = NaiveDate>) -> Vec<NaiveDate> {
        dates
            .into_iter()
            .filter_map(|date| date.with_day(1))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn partition_name(month: NaiveDate) -> String {
        format!("transactions_y{}m{:02}", month.year(), month.month())
    }

    /// Idempotent: `create_monthly_partition` skips partitions that exist.
    pub async fn ensure_months(
        conn: &mut PgConnection,
        months: &[NaiveDate],
    ) -> Result<(), sqlx::Error> {
        for month in months {
            sqlx::query("SELECT create_monthly_partition($1)")
                .bind(*month)
                .execute(&mut *conn)
                .await?;
            info!(partition = %Self::partition_name(*month), "Partition ensured");
        }
        Ok(())
    }
}
