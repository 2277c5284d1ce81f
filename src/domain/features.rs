//! Per-client behavioral features and the denormalized training row.

use super::client::{Client, CLIENT_KEY};
use super::transaction::Transaction;
use super::value::{Tabular, Value};

pub const FEATURE_COLUMNS: [&str; 2] = ["nb_sessions", "duree_moy_session_sec"];

/// Suffix applied to right-side columns that collide with a left-side name.
pub const RIGHT_SUFFIX: &str = "_client";

#[derive(Debug, Clone, PartialEq)]
pub struct SessionFeatures {
    pub client_id: String,
    pub session_count: u64,
    pub mean_session_duration_secs: f64,
}

impl SessionFeatures {
    /// Features of a client absent from the event log: no history, not a gap.
    pub fn without_history(client_id: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            session_count: 0,
            mean_session_duration_secs: 0.0,
        }
    }
}

/// Transaction left-joined to its client and to its session features.
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedRecord {
    pub transaction: Transaction,
    pub client: Option<Client>,
    pub session_count: u64,
    pub mean_session_duration_secs: f64,
}

/// Output header of a left join: left columns as-is, right columns minus the
/// join key, with `suffix` appended to any right name already taken.
pub fn join_columns(left: &[String], right: &[String], key: &str, suffix: &str) -> Vec<String> {
    let mut columns = left.to_vec();
    for name in right.iter().filter(|name| name.as_str() != key) {
        if left.contains(name) {
            columns.push(format!("{}{}", name, suffix));
        } else {
            columns.push(name.clone());
        }
    }
    columns
}

impl Tabular for UnifiedRecord {
    fn columns() -> Vec<String> {
        let mut columns = join_columns(
            &Transaction::columns(),
            &Client::columns(),
            CLIENT_KEY,
            RIGHT_SUFFIX,
        );
        columns.extend(FEATURE_COLUMNS.iter().map(|c| c.to_string()));
        columns
    }

    fn cells(&self) -> Vec<Value> {
        let mut cells = self.transaction.cells();
        match &self.client {
            Some(client) => cells.extend(client.cells().into_iter().skip(1)),
            None => cells.extend(std::iter::repeat(Value::Null).take(Client::columns().len() - 1)),
        }
        cells.push(Value::Int(self.session_count as i64));
        cells.push(Value::Float(self.mean_session_duration_secs));
        cells
    }
}
