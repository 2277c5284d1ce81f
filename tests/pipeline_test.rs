mod common;

use anyhow::Result;
use fraud_etl::adapters::CsvTableSink;
use fraud_etl::services::loader::LoadStatus;
use fraud_etl::services::Pipeline;
use tempfile::TempDir;

const TARGETED: [&str; 4] = ["latitude", "longitude", "ville", "merchant_category"];

#[tokio::test]
async fn test_end_to_end_with_csv_sink() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = common::test_config(temp_dir.path(), 1000, 42);
    let sink = CsvTableSink::new(&config.processed_dir);

    let report = Pipeline::new(config.clone(), Box::new(sink.clone()))
        .run()
        .await?;

    assert_eq!(report.stages, ["generate", "extract", "clean", "aggregate", "load"]);
    assert_eq!(report.tables["transactions"].rows, 1000);
    assert_eq!(report.tables["dataset_final"].rows, 1000);
    assert_eq!(report.tables["dataset_final"].columns, 25);
    assert_eq!(report.tables["logs"].rows, 5000);

    let tables: Vec<&str> = report.load.tables.iter().map(|t| t.table.as_str()).collect();
    assert_eq!(tables, ["transactions", "clients", "logs", "dataset_final"]);
    assert!(report.load.tables.iter().all(|t| t.status == LoadStatus::Ok));

    let transactions = &report.cleaning[0];
    assert!(TARGETED.iter().any(|c| transactions.before.missing_count(c) > 0));
    for column in TARGETED {
        assert_eq!(transactions.after.missing_count(column), 0, "{}", column);
    }
    assert_eq!(transactions.negative_amounts_dropped, 0);
    assert_eq!(transactions.after.anomalies.negative_amounts, Some(0));

    let clients = &report.cleaning[1];
    assert!(clients.before.missing_count("score_credit") > 0);
    assert_eq!(clients.after.missing_count("score_credit"), 0);

    assert!(config.report_path().is_file());
    for table in tables {
        assert!(sink.path_for(table).is_file(), "{}", table);
    }
    Ok(())
}

#[tokio::test]
async fn test_rerun_on_existing_sources() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = common::test_config(temp_dir.path(), 200, 9);

    let first = Pipeline::new(config.clone(), Box::new(CsvTableSink::new(&config.processed_dir)))
        .run()
        .await?;
    let second = Pipeline::new(config.clone(), Box::new(CsvTableSink::new(&config.processed_dir)))
        .skip_generate()
        .run()
        .await?;

    assert_eq!(second.stages[0], "extract");
    assert_eq!(first.tables, second.tables);
    assert_ne!(first.run_id, second.run_id);

    let cleaned = std::fs::read(config.processed_dir.join("dataset_final_clean.csv"))?;
    assert!(String::from_utf8(cleaned)?.starts_with("transaction_id,client_id,montant"));
    Ok(())
}

#[tokio::test]
async fn test_missing_raw_sources_abort_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = common::test_config(temp_dir.path(), 10, 1);

    let result = Pipeline::new(config.clone(), Box::new(CsvTableSink::new(&config.processed_dir)))
        .skip_generate()
        .run()
        .await;

    assert!(matches!(
        result,
        Err(fraud_etl::PipelineError::SourceNotFound { name: "transactions", .. })
    ));
    assert!(!config.report_path().exists());
    Ok(())
}
