//! Deterministic per-column remediation.
//!
//! Each pass imputes first, from statistics of the uncleaned columns, then
//! drops rows, then converts timestamps. Re-running a pass on its own output
//! imputes nothing and drops nothing.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::domain::{BehaviorEvent, Client, Tabular, Timestamp, Transaction};
use crate::error::{PipelineError, PipelineResult};
use crate::services::quality::{analyze, QualityReport};
use crate::services::sources::{CLIENTS, LOGS, TRANSACTIONS};

pub const UNKNOWN_CITY: &str = "VILLE_INCONNUE";
pub const DEFAULT_MERCHANT_CATEGORY: &str = "AUTRE";
pub const FALLBACK_LATITUDE: f64 = 46.5;
pub const FALLBACK_LONGITUDE: f64 = 2.0;
pub const FALLBACK_CREDIT_SCORE: u16 = 575;
pub const CREDIT_SCORE_RANGE: std::ops::RangeInclusive<u16> = 300..=850;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Median,
    Mode,
    Constant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Imputation {
    pub column: String,
    pub strategy: Strategy,
    pub fill: String,
    pub count: usize,
}

/// Audit trail of one cleaning pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningReport {
    pub name: String,
    pub before: QualityReport,
    pub after: QualityReport,
    pub imputations: Vec<Imputation>,
    pub duplicates_dropped: usize,
    pub negative_amounts_dropped: usize,
    pub timestamps_converted: usize,
}

impl CleaningReport {
    fn new(name: &str, before: QualityReport) -> Self {
        Self {
            name: name.to_string(),
            after: before.clone(),
            before,
            imputations: Vec::new(),
            duplicates_dropped: 0,
            negative_amounts_dropped: 0,
            timestamps_converted: 0,
        }
    }

    fn impute(&mut self, column: &str, strategy: Strategy, fill: impl ToString, count: usize) {
        debug!(table = %self.name, column, ?strategy, count, "Imputed missing values");
        self.imputations.push(Imputation {
            column: column.to_string(),
            strategy,
            fill: fill.to_string(),
            count,
        });
    }

    /// Total number of values or rows this pass touched.
    pub fn changes(&self) -> usize {
        self.imputations.iter().map(|i| i.count).sum::<usize>()
            + self.duplicates_dropped
            + self.negative_amounts_dropped
            + self.timestamps_converted
    }

    fn finish<T: Tabular>(mut self, records: &[T]) -> Self {
        self.after = analyze(&self.name, records);
        info!(
            table = %self.name,
            rows_before = self.before.rows,
            rows_after = self.after.rows,
            duplicates_dropped = self.duplicates_dropped,
            negative_amounts_dropped = self.negative_amounts_dropped,
            timestamps_converted = self.timestamps_converted,
            "Cleaned table"
        );
        self
    }
}

pub fn clean_transactions(
    mut records: Vec<Transaction>,
) -> PipelineResult<(Vec<Transaction>, CleaningReport)> {
    let mut report = CleaningReport::new(TRANSACTIONS, analyze(TRANSACTIONS, &records));

    let latitude = median(records.iter().filter_map(|tx| tx.latitude)).unwrap_or(FALLBACK_LATITUDE);
    let longitude =
        median(records.iter().filter_map(|tx| tx.longitude)).unwrap_or(FALLBACK_LONGITUDE);
    let category = mode(records.iter().filter_map(|tx| tx.merchant_category.as_deref()))
        .unwrap_or(DEFAULT_MERCHANT_CATEGORY)
        .to_string();

    let mut filled = [0usize; 4];
    for tx in &mut records {
        filled[0] += fill(&mut tx.latitude, latitude);
        filled[1] += fill(&mut tx.longitude, longitude);
        filled[2] += fill(&mut tx.city, UNKNOWN_CITY.to_string());
        filled[3] += fill(&mut tx.merchant_category, category.clone());
    }
    report.impute("latitude", Strategy::Median, latitude, filled[0]);
    report.impute("longitude", Strategy::Median, longitude, filled[1]);
    report.impute("ville", Strategy::Constant, UNKNOWN_CITY, filled[2]);
    report.impute("merchant_category", Strategy::Mode, &category, filled[3]);

    let before_dedup = records.len();
    let mut seen = HashSet::new();
    records.retain(|tx| seen.insert(tx.transaction_id.clone()));
    report.duplicates_dropped = before_dedup - records.len();

    let before_filter = records.len();
    records.retain(|tx| tx.amount >= 0.0);
    report.negative_amounts_dropped = before_filter - records.len();

    for (row, tx) in records.iter_mut().enumerate() {
        report.timestamps_converted += canonicalize(TRANSACTIONS, row, &mut tx.timestamp)?;
    }

    let report = report.finish(&records);
    Ok((records, report))
}

/// Missing credit scores take the rounded median. The fraud date is left alone.
pub fn clean_clients(mut records: Vec<Client>) -> (Vec<Client>, CleaningReport) {
    let mut report = CleaningReport::new(CLIENTS, analyze(CLIENTS, &records));

    let score = median(records.iter().filter_map(|c| c.credit_score.map(f64::from)))
        .map(|m| (m.round() as u16).clamp(*CREDIT_SCORE_RANGE.start(), *CREDIT_SCORE_RANGE.end()))
        .unwrap_or(FALLBACK_CREDIT_SCORE);

    let filled: usize = records
        .iter_mut()
        .map(|client| fill(&mut client.credit_score, score))
        .sum();
    report.impute("score_credit", Strategy::Median, score, filled);

    let report = report.finish(&records);
    (records, report)
}

pub fn clean_events(
    mut records: Vec<BehaviorEvent>,
) -> PipelineResult<(Vec<BehaviorEvent>, CleaningReport)> {
    let mut report = CleaningReport::new(LOGS, analyze(LOGS, &records));

    for (row, event) in records.iter_mut().enumerate() {
        report.timestamps_converted += canonicalize(LOGS, row, &mut event.timestamp)?;
    }

    let before_dedup = records.len();
    let mut seen = HashSet::new();
    records.retain(|event| seen.insert(event.clone()));
    report.duplicates_dropped = before_dedup - records.len();

    let report = report.finish(&records);
    Ok((records, report))
}

fn fill<T>(slot: &mut Option<T>, value: T) -> usize {
    if slot.is_some() {
        return 0;
    }
    *slot = Some(value);
    1
}

/// Returns 1 when a raw value was converted.
fn canonicalize(name: &'static str, row: usize, timestamp: &mut Timestamp) -> PipelineResult<usize> {
    if timestamp.is_parsed() {
        return Ok(0);
    }
    let parsed = timestamp
        .to_canonical()
        .map_err(|_| PipelineError::InvalidTimestamp {
            name,
            row,
            value: timestamp.to_string(),
        })?;
    *timestamp = parsed;
    Ok(1)
}

fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut values: Vec<f64> = values.collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Most frequent value; ties go to the value seen first.
fn mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, value) in values.enumerate() {
        counts.entry(value).or_insert((0, position)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::behavior::fixtures::event;
    use crate::domain::client::fixtures::client;
    use crate::domain::transaction::fixtures::transaction;

    fn gappy_transactions() -> Vec<Transaction> {
        let mut a = transaction("TRX_1", "CLIENT_1", 10.0);
        a.latitude = Some(44.0);
        a.longitude = Some(1.0);
        let mut b = transaction("TRX_2", "CLIENT_2", 20.0);
        b.latitude = Some(48.0);
        b.longitude = Some(3.0);
        b.merchant_category = Some("ESSENCE".to_string());
        let mut c = transaction("TRX_3", "CLIENT_3", 30.0);
        c.city = None;
        c.latitude = None;
        c.longitude = None;
        c.merchant_category = None;
        vec![a, b, c]
    }

    #[test]
    fn test_median_and_mode() {
        assert_eq!(median([3.0, 1.0, 2.0].into_iter()), Some(2.0));
        assert_eq!(median([4.0, 1.0].into_iter()), Some(2.5));
        assert_eq!(median(std::iter::empty()), None);
        assert_eq!(mode(["b", "a", "a", "b", "c"].into_iter()), Some("b"));
        assert_eq!(mode(["x", "y", "y"].into_iter()), Some("y"));
        assert_eq!(mode(std::iter::empty()), None);
    }

    #[test]
    fn test_transactions_imputed() {
        let (cleaned, report) = clean_transactions(gappy_transactions()).unwrap();

        let repaired = &cleaned[2];
        assert_eq!(repaired.latitude, Some(46.0));
        assert_eq!(repaired.longitude, Some(2.0));
        assert_eq!(repaired.city.as_deref(), Some(UNKNOWN_CITY));
        assert_eq!(repaired.merchant_category.as_deref(), Some("RESTAURANT"));

        for column in ["latitude", "longitude", "ville", "merchant_category"] {
            assert_eq!(report.before.missing_count(column), 1, "{}", column);
            assert_eq!(report.after.missing_count(column), 0, "{}", column);
        }
        assert_eq!(report.timestamps_converted, 3);
        assert!(cleaned.iter().all(|tx| tx.timestamp.is_parsed()));
    }

    #[test]
    fn test_all_missing_uses_fallbacks() {
        let mut tx = transaction("TRX_1", "CLIENT_1", 1.0);
        tx.latitude = None;
        tx.longitude = None;
        tx.merchant_category = None;

        let (cleaned, _) = clean_transactions(vec![tx]).unwrap();

        assert_eq!(cleaned[0].latitude, Some(FALLBACK_LATITUDE));
        assert_eq!(cleaned[0].longitude, Some(FALLBACK_LONGITUDE));
        assert_eq!(
            cleaned[0].merchant_category.as_deref(),
            Some(DEFAULT_MERCHANT_CATEGORY)
        );
    }

    #[test]
    fn test_duplicate_ids_keep_first_and_report_drops() {
        let mut records = gappy_transactions();
        records.push(transaction("TRX_1", "CLIENT_1", 10.0));
        records.push(transaction("TRX_1", "CLIENT_1", 10.0));
        records.push(transaction("TRX_2", "CLIENT_2", 20.0));

        let (cleaned, report) = clean_transactions(records).unwrap();

        assert_eq!(cleaned.len(), 3);
        assert_eq!(report.duplicates_dropped, 3);
        assert_eq!(cleaned[0].latitude, Some(44.0));
    }

    #[test]
    fn test_negative_amounts_dropped() {
        let mut records = gappy_transactions();
        records.push(transaction("TRX_4", "CLIENT_4", -12.0));

        let (cleaned, report) = clean_transactions(records).unwrap();

        assert_eq!(report.negative_amounts_dropped, 1);
        assert_eq!(report.before.anomalies.negative_amounts, Some(1));
        assert_eq!(report.after.anomalies.negative_amounts, Some(0));
        assert!(cleaned.iter().all(|tx| tx.amount >= 0.0));
    }

    #[test]
    fn test_transaction_cleaning_is_idempotent() {
        let (once, _) = clean_transactions(gappy_transactions()).unwrap();
        let (twice, report) = clean_transactions(once.clone()).unwrap();

        assert_eq!(twice, once);
        assert_eq!(report.changes(), 0);
    }

    #[test]
    fn test_bad_timestamp_is_fatal() {
        let mut records = gappy_transactions();
        records[1].timestamp = Timestamp::Raw("yesterday".to_string());

        match clean_transactions(records) {
            Err(PipelineError::InvalidTimestamp { name, row, value }) => {
                assert_eq!(name, TRANSACTIONS);
                assert_eq!(row, 1);
                assert_eq!(value, "yesterday");
            }
            other => panic!("expected InvalidTimestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_credit_score_median_keeps_fraud_history_null() {
        let records = vec![
            client("CLIENT_1", Some(600)),
            client("CLIENT_2", None),
            client("CLIENT_3", Some(701)),
        ];

        let (cleaned, report) = clean_clients(records);

        assert_eq!(cleaned[1].credit_score, Some(651));
        assert!(cleaned
            .iter()
            .all(|c| c.fraud_history.last_fraud_date().is_none()));
        assert_eq!(report.after.missing_count("score_credit"), 0);
        assert_eq!(report.after.missing_count("date_derniere_fraude"), 3);

        let (_, again) = clean_clients(cleaned);
        assert_eq!(again.changes(), 0);
    }

    #[test]
    fn test_credit_score_fallback() {
        let (cleaned, _) = clean_clients(vec![client("CLIENT_1", None)]);
        assert_eq!(cleaned[0].credit_score, Some(FALLBACK_CREDIT_SCORE));
    }

    #[test]
    fn test_events_converted_then_deduplicated() {
        let mut spaced = event("S1", "CLIENT_1", 60);
        spaced.timestamp = Timestamp::Raw("2024-06-02 08:15:00".to_string());
        let records = vec![
            event("S1", "CLIENT_1", 60),
            spaced,
            event("S2", "CLIENT_1", 60),
        ];

        let (cleaned, report) = clean_events(records).unwrap();

        assert_eq!(cleaned.len(), 2);
        assert_eq!(report.duplicates_dropped, 1);
        assert_eq!(report.timestamps_converted, 3);

        let (again, second) = clean_events(cleaned.clone()).unwrap();
        assert_eq!(again, cleaned);
        assert_eq!(second.changes(), 0);
    }
}
