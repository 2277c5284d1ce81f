//! Dynamic cell values and the tabular view shared by every record type.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single cell as seen by the quality analyzer and the loader.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Text form used in delimited files. Null renders as an empty field.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(v) => v.clone(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Date(v) => v.format(DATE_FORMAT).to_string(),
            Value::DateTime(v) => v.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map(Value::Text).unwrap_or(Value::Null)
    }
}

impl From<Option<f64>> for Value {
    fn from(value: Option<f64>) -> Self {
        value.map(Value::Float).unwrap_or(Value::Null)
    }
}

/// Column names plus row cells, in matching order.
pub trait Tabular {
    fn columns() -> Vec<String>;

    fn cells(&self) -> Vec<Value>;
}

/// Event time as read from a source (`Raw`) or after cleaning (`Parsed`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Timestamp {
    Raw(String),
    Parsed(NaiveDateTime),
}

impl Timestamp {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Timestamp::Parsed(_))
    }

    /// Parse raw text into the canonical temporal type. Parsed values pass through.
    pub fn to_canonical(&self) -> Result<Timestamp, chrono::ParseError> {
        match self {
            Timestamp::Parsed(at) => Ok(Timestamp::Parsed(*at)),
            Timestamp::Raw(text) => parse_timestamp(text).map(Timestamp::Parsed),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Timestamp::Raw(text) => Value::Text(text.clone()),
            Timestamp::Parsed(at) => Value::DateTime(*at),
        }
    }

    pub fn parsed(&self) -> Option<NaiveDateTime> {
        match self {
            Timestamp::Parsed(at) => Some(*at),
            Timestamp::Raw(_) => None,
        }
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(at: NaiveDateTime) -> Self {
        Timestamp::Parsed(at)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Raw(text) => f.write_str(text),
            Timestamp::Parsed(at) => write!(f, "{}", at.format(TIMESTAMP_FORMAT)),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Timestamp::Raw)
    }
}

/// Accepts `T` or space separated ISO-8601, optional fraction, optional offset.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let text = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Ok(at.naive_utc());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
}
