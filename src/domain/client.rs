//! Client (KYC) domain entity.

use chrono::NaiveDate;
use std::str::FromStr;

use super::value::{Tabular, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SexCode {
    M,
    F,
    X,
}

impl SexCode {
    pub const ALL: [SexCode; 3] = [SexCode::M, SexCode::F, SexCode::X];

    pub fn as_str(&self) -> &'static str {
        match self {
            SexCode::M => "M",
            SexCode::F => "F",
            SexCode::X => "X",
        }
    }
}

impl FromStr for SexCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "M" => Ok(SexCode::M),
            "F" => Ok(SexCode::F),
            "X" => Ok(SexCode::X),
            other => Err(format!("unknown sex code {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncomeBracket {
    UpTo20K,
    From20To40K,
    From40To60K,
    From60To100K,
    Above100K,
}

impl IncomeBracket {
    pub const ALL: [IncomeBracket; 5] = [
        IncomeBracket::UpTo20K,
        IncomeBracket::From20To40K,
        IncomeBracket::From40To60K,
        IncomeBracket::From60To100K,
        IncomeBracket::Above100K,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeBracket::UpTo20K => "0-20K",
            IncomeBracket::From20To40K => "20-40K",
            IncomeBracket::From40To60K => "40-60K",
            IncomeBracket::From60To100K => "60-100K",
            IncomeBracket::Above100K => ">100K",
        }
    }
}

impl FromStr for IncomeBracket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IncomeBracket::ALL
            .into_iter()
            .find(|bracket| bracket.as_str() == s.trim())
            .ok_or_else(|| format!("unknown income bracket {:?}", s))
    }
}

/// Fraud history of a client. An empty source cell means the client was never
/// defrauded; it is not a missing measurement and is never imputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FraudHistory {
    Never,
    LastOn(NaiveDate),
}

impl FraudHistory {
    pub fn last_fraud_date(&self) -> Option<NaiveDate> {
        match self {
            FraudHistory::Never => None,
            FraudHistory::LastOn(date) => Some(*date),
        }
    }
}

/// Domain entity representing a client. One record per `client_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub client_id: String,
    pub age: u8,
    pub sex: SexCode,
    pub postal_code: String,
    pub tenure_months: u16,
    pub product_count: u8,
    pub income_bracket: IncomeBracket,
    /// 300..=850 once imputed.
    pub credit_score: Option<u16>,
    pub fraud_history: FraudHistory,
}

pub const CLIENT_KEY: &str = "client_id";

pub const CLIENT_COLUMNS: [&str; 9] = [
    "client_id",
    "age",
    "sexe",
    "code_postal",
    "anciennete_mois",
    "nb_produits",
    "revenu_annuel_tranche",
    "score_credit",
    "date_derniere_fraude",
];

impl Tabular for Client {
    fn columns() -> Vec<String> {
        CLIENT_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn cells(&self) -> Vec<Value> {
        vec![
            Value::Text(self.client_id.clone()),
            Value::Int(self.age.into()),
            Value::Text(self.sex.as_str().to_string()),
            Value::Text(self.postal_code.clone()),
            Value::Int(self.tenure_months.into()),
            Value::Int(self.product_count.into()),
            Value::Text(self.income_bracket.as_str().to_string()),
            self.credit_score
                .map(|score| Value::Int(score.into()))
                .unwrap_or(Value::Null),
            self.fraud_history
                .last_fraud_date()
                .map(Value::Date)
                .unwrap_or(Value::Null),
        ]
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_bracket_round_trips_labels() {
        for bracket in IncomeBracket::ALL {
            assert_eq!(bracket.as_str().parse::<IncomeBracket>().unwrap(), bracket);
        }
        assert!("100K+".parse::<IncomeBracket>().is_err());
    }

    #[test]
    fn test_never_defrauded_renders_null() {
        let client = fixtures::client("CLIENT_000001", Some(700));
        let cells = client.cells();
        assert_eq!(cells.len(), CLIENT_COLUMNS.len());
        assert!(cells[8].is_null());
        assert_eq!(cells[7], Value::Int(700));
    }
}
