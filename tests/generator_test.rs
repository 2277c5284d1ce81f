mod common;

use anyhow::Result;
use fraud_etl::services::extractor::Extractor;
use fraud_etl::services::generator::{write_raw_sources, GeneratorSettings, SourceGenerator};
use fraud_etl::services::pipeline::generate_sources;
use fraud_etl::services::sources::SourceLayout;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

#[test]
fn test_same_seed_writes_identical_artifacts() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut layouts = Vec::new();

    for run in ["a", "b"] {
        let config = common::test_config(&temp_dir.path().join(run), 500, 42);
        let layout = SourceLayout::new(&config.raw_dir);
        write_raw_sources(&generate_sources(&config), &layout)?;
        layouts.push(layout);
    }

    assert_eq!(
        std::fs::read(layouts[0].transactions_path())?,
        std::fs::read(layouts[1].transactions_path())?
    );
    assert_eq!(
        std::fs::read(layouts[0].events_path())?,
        std::fs::read(layouts[1].events_path())?
    );

    assert_eq!(
        std::fs::read(layouts[0].clients_path())?,
        std::fs::read(layouts[1].clients_path())?
    );

    let clients_a = Extractor::new(layouts[0].clone()).read_clients()?;
    let clients_b = Extractor::new(layouts[1].clone()).read_clients()?;
    assert!(!clients_a.is_empty());
    assert_eq!(clients_a, clients_b);
    Ok(())
}

#[test]
fn test_extraction_reproduces_generated_records() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = common::test_config(temp_dir.path(), 300, 5);
    let layout = SourceLayout::new(&config.raw_dir);
    let generated = generate_sources(&config);
    write_raw_sources(&generated, &layout)?;

    let extracted = Extractor::new(layout).extract_all()?;

    assert_eq!(extracted.transactions.len(), generated.transactions.len());
    assert_eq!(extracted.clients, generated.clients);
    assert_eq!(extracted.events.len(), generated.events.len());
    for (read, written) in extracted.transactions.iter().zip(&generated.transactions) {
        assert_eq!(read.transaction_id, written.transaction_id);
        assert_eq!(read.amount, written.amount);
        assert_eq!(read.city, written.city);
        assert_eq!(read.timestamp.to_canonical()?, written.timestamp);
    }
    Ok(())
}

#[test]
fn test_fraud_rate_close_to_target() {
    let config = common::test_config(std::path::Path::new("unused"), 100_000, 42);
    let mut settings = GeneratorSettings::new(config.transaction_count, config.reference_time);
    settings.events_per_transaction = 0;

    let sources = SourceGenerator::new(StdRng::seed_from_u64(config.seed), settings).generate();

    let fraud = sources.transactions.iter().filter(|tx| tx.is_fraud).count();
    let rate = fraud as f64 / sources.transactions.len() as f64;
    assert!((rate - 0.0025).abs() < 0.001, "fraud rate {}", rate);
    assert!(sources
        .transactions
        .iter()
        .filter(|tx| tx.is_fraud)
        .all(|tx| tx.amount >= 500.0));
    assert!(sources.events.is_empty());
}
