use csv::Writer;
use serde::Serialize;

use crate::domain::{Tabular, Value};

/// A named, fully materialized table ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFrame {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Row and column counts of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableShape {
    pub rows: usize,
    pub columns: usize,
}

impl TableFrame {
    pub fn from_records<T: Tabular>(name: &str, records: &[T]) -> Self {
        Self {
            name: name.to_string(),
            columns: T::columns(),
            rows: records.iter().map(Tabular::cells).collect(),
        }
    }

    pub fn shape(&self) -> TableShape {
        TableShape {
            rows: self.rows.len(),
            columns: self.columns.len(),
        }
    }

    /// Header plus one line per row; nulls become empty fields.
    pub fn to_csv_bytes(&self) -> std::io::Result<Vec<u8>> {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(Value::render))?;
        }
        wtr.into_inner().map_err(|e| e.into_error())
    }
}
