use fraud_etl::config::{Config, LoadTarget, DEFAULT_REFERENCE_TIME};
use fraud_etl::domain::value::parse_timestamp;
use std::path::Path;

pub fn test_config(root: &Path, transactions: usize, seed: u64) -> Config {
    Config {
        raw_dir: root.join("raw"),
        processed_dir: root.join("processed"),
        seed,
        transaction_count: transactions,
        events_per_transaction: 5,
        reference_time: parse_timestamp(DEFAULT_REFERENCE_TIME).unwrap(),
        load_target: LoadTarget::Csv,
        database_url: None,
    }
}
