use async_trait::async_trait;
use fraud_etl::domain::{Tabular, Value};
use fraud_etl::error::{PipelineError, PipelineResult};
use fraud_etl::ports::{LoadReceipt, TableSink};
use fraud_etl::services::frame::TableFrame;
use fraud_etl::services::loader::{LoadStatus, Loader};
use std::sync::{Arc, Mutex};

/// Accepts every table but drops the last row of `truncate`, and errors on `fail`.
struct FlakySink {
    truncate: &'static str,
    fail: &'static str,
    seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl TableSink for FlakySink {
    fn target(&self) -> &'static str {
        "memory"
    }

    async fn load(&self, frame: &TableFrame) -> PipelineResult<LoadReceipt> {
        self.seen.lock().unwrap().push(frame.name.clone());
        if frame.name == self.fail {
            return Err(PipelineError::io(
                "/unreachable",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            ));
        }
        let mut rows = frame.rows.len() as u64;
        if frame.name == self.truncate {
            rows = rows.saturating_sub(1);
        }
        Ok(LoadReceipt {
            location: format!("memory://{}", frame.name),
            persisted_rows: rows,
        })
    }
}

struct Row(i64);

impl Tabular for Row {
    fn columns() -> Vec<String> {
        vec!["id".to_string()]
    }

    fn cells(&self) -> Vec<Value> {
        vec![Value::Int(self.0)]
    }
}

fn frames() -> Vec<TableFrame> {
    let rows = [Row(1), Row(2), Row(3)];
    ["transactions", "clients", "logs", "dataset_final"]
        .into_iter()
        .map(|name| TableFrame::from_records(name, &rows))
        .collect()
}

#[tokio::test]
async fn test_truncation_reported_and_remaining_tables_loaded() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let loader = Loader::new(Box::new(FlakySink {
        truncate: "clients",
        fail: "logs",
        seen: seen.clone(),
    }));

    let report = loader.load_all(&frames()).await;

    assert_eq!(report.target, "memory");
    assert_eq!(report.status_of("transactions"), Some(LoadStatus::Ok));
    assert_eq!(report.status_of("clients"), Some(LoadStatus::IntegrityMismatch));
    assert_eq!(report.status_of("logs"), Some(LoadStatus::Failed));
    assert_eq!(report.status_of("dataset_final"), Some(LoadStatus::Ok));
    assert!(!report.all_ok());

    let clients = &report.tables[1];
    let error = clients.error.as_deref().unwrap();
    assert!(error.contains("3 rows in memory"));
    assert!(error.contains("2 rows persisted"));
    assert!(report.tables[2].error.as_deref().unwrap().contains("/unreachable"));

    assert_eq!(seen.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn test_clean_sink_reports_ok() {
    let loader = Loader::new(Box::new(FlakySink {
        truncate: "",
        fail: "",
        seen: Arc::default(),
    }));

    let report = loader.load_all(&frames()).await;

    assert!(report.all_ok());
    assert_eq!(report.tables[0].location.as_deref(), Some("memory://transactions"));
}
