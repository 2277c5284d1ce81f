//! Data-quality statistics over any [`Tabular`] collection.
//!
//! Pure functions: the same report is computed before and after cleaning so the
//! run report can show the improvement.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::domain::{Tabular, Value};

/// Amounts strictly above this are flagged as extreme.
pub const EXTREME_AMOUNT_THRESHOLD: f64 = 10_000.0;

const AMOUNT_COLUMN: &str = "montant";
const LATITUDE_COLUMN: &str = "latitude";
const LONGITUDE_COLUMN: &str = "longitude";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingStat {
    pub count: usize,
    /// Percentage of rows, two decimals.
    pub pct: f64,
}

/// Domain anomalies. Each counter is `None` when the columns it needs are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Anomalies {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_amounts: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extreme_amounts: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_coordinates: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    /// Only fields with at least one missing value.
    pub missing: BTreeMap<String, MissingStat>,
    pub duplicates: usize,
    pub anomalies: Anomalies,
}

impl QualityReport {
    pub fn missing_count(&self, column: &str) -> usize {
        self.missing.get(column).map_or(0, |stat| stat.count)
    }
}

pub fn analyze<T: Tabular>(name: &str, records: &[T]) -> QualityReport {
    let columns = T::columns();
    let rows: Vec<Vec<Value>> = records.iter().map(Tabular::cells).collect();

    let mut missing = BTreeMap::new();
    for (index, column) in columns.iter().enumerate() {
        let count = rows.iter().filter(|row| row[index].is_null()).count();
        if count > 0 {
            missing.insert(
                column.clone(),
                MissingStat {
                    count,
                    pct: percentage(count, rows.len()),
                },
            );
        }
    }

    let mut seen = HashSet::new();
    let duplicates = rows
        .iter()
        .filter(|row| !seen.insert(row.iter().map(CellKey::from).collect::<Vec<_>>()))
        .count();

    let position = |name: &str| columns.iter().position(|c| c == name);
    let amount = position(AMOUNT_COLUMN);
    let coordinates = position(LATITUDE_COLUMN).zip(position(LONGITUDE_COLUMN));

    let anomalies = Anomalies {
        negative_amounts: amount.map(|i| count_where(&rows, i, |v| v < 0.0)),
        extreme_amounts: amount.map(|i| count_where(&rows, i, |v| v > EXTREME_AMOUNT_THRESHOLD)),
        invalid_coordinates: coordinates.map(|(lat, lon)| {
            rows.iter()
                .filter(|row| {
                    let bad_lat = row[lat].as_f64().is_some_and(|v| !(-90.0..=90.0).contains(&v));
                    let bad_lon = row[lon]
                        .as_f64()
                        .is_some_and(|v| !(-180.0..=180.0).contains(&v));
                    bad_lat || bad_lon
                })
                .count()
        }),
    };

    QualityReport {
        name: name.to_string(),
        rows: rows.len(),
        columns: columns.len(),
        missing,
        duplicates,
        anomalies,
    }
}

/// Hashable form of a cell. Equal keys mean equal cells of the same type.
#[derive(PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Null,
    Text(&'a str),
    Int(i64),
    Float(u64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl<'a> From<&'a Value> for CellKey<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => CellKey::Null,
            Value::Text(v) => CellKey::Text(v),
            Value::Int(v) => CellKey::Int(*v),
            // 0.0 and -0.0 compare equal
            Value::Float(v) if *v == 0.0 => CellKey::Float(0f64.to_bits()),
            Value::Float(v) => CellKey::Float(v.to_bits()),
            Value::Bool(v) => CellKey::Bool(*v),
            Value::Date(v) => CellKey::Date(*v),
            Value::DateTime(v) => CellKey::DateTime(*v),
        }
    }
}

fn count_where(rows: &[Vec<Value>], index: usize, predicate: impl Fn(f64) -> bool) -> usize {
    rows.iter()
        .filter(|row| row[index].as_f64().is_some_and(&predicate))
        .count()
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 10_000.0 / total as f64).round() / 100.0
}
