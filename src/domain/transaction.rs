//! Transaction domain entity.
//! One card or account movement as exported by the core banking system.

use serde::{Deserialize, Serialize};

use super::value::{Tabular, Timestamp, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "PAIEMENT")]
    Payment,
    #[serde(rename = "RETRAIT")]
    Withdrawal,
    #[serde(rename = "VIREMENT")]
    Transfer,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 3] = [
        TransactionKind::Payment,
        TransactionKind::Withdrawal,
        TransactionKind::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Payment => "PAIEMENT",
            TransactionKind::Withdrawal => "RETRAIT",
            TransactionKind::Transfer => "VIREMENT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    #[serde(rename = "DEBIT")]
    Debit,
    #[serde(rename = "CREDIT")]
    Credit,
    #[serde(rename = "PREPAYEE")]
    Prepaid,
}

impl CardType {
    pub const ALL: [CardType; 3] = [CardType::Debit, CardType::Credit, CardType::Prepaid];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Debit => "DEBIT",
            CardType::Credit => "CREDIT",
            CardType::Prepaid => "PREPAYEE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Web,
    Mobile,
    Atm,
    Pos,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Web, Channel::Mobile, Channel::Atm, Channel::Pos];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Web => "WEB",
            Channel::Mobile => "MOBILE",
            Channel::Atm => "ATM",
            Channel::Pos => "POS",
        }
    }
}

/// Domain entity representing a transaction.
///
/// `latitude` and `longitude` are either both present or both absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub client_id: String,
    #[serde(rename = "montant")]
    pub amount: f64,
    #[serde(rename = "devise")]
    pub currency: String,
    #[serde(rename = "date_heure")]
    pub timestamp: Timestamp,
    #[serde(rename = "type_transaction")]
    pub kind: TransactionKind,
    #[serde(rename = "type_carte")]
    pub card_type: CardType,
    pub merchant_id: String,
    pub merchant_category: Option<String>,
    #[serde(rename = "pays")]
    pub country: String,
    #[serde(rename = "ville")]
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(rename = "canal")]
    pub channel: Channel,
    pub is_fraud: bool,
}

pub const TRANSACTION_COLUMNS: [&str; 15] = [
    "transaction_id",
    "client_id",
    "montant",
    "devise",
    "date_heure",
    "type_transaction",
    "type_carte",
    "merchant_id",
    "merchant_category",
    "pays",
    "ville",
    "latitude",
    "longitude",
    "canal",
    "is_fraud",
];

impl Tabular for Transaction {
    fn columns() -> Vec<String> {
        TRANSACTION_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn cells(&self) -> Vec<Value> {
        vec![
            Value::Text(self.transaction_id.clone()),
            Value::Text(self.client_id.clone()),
            Value::Float(self.amount),
            Value::Text(self.currency.clone()),
            self.timestamp.to_value(),
            Value::Text(self.kind.as_str().to_string()),
            Value::Text(self.card_type.as_str().to_string()),
            Value::Text(self.merchant_id.clone()),
            Value::from(self.merchant_category.clone()),
            Value::Text(self.country.clone()),
            Value::from(self.city.clone()),
            Value::from(self.latitude),
            Value::from(self.longitude),
            Value::Text(self.channel.as_str().to_string()),
            Value::Bool(self.is_fraud),
        ]
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_align_with_columns() {
        let tx = fixtures::transaction("TRX_00000001", "CLIENT_000001", 42.0);
        assert_eq!(tx.cells().len(), Transaction::columns().len());
    }

    #[test]
    fn test_csv_row_with_missing_fields() {
        let data = "\
transaction_id,client_id,montant,devise,date_heure,type_transaction,type_carte,merchant_id,merchant_category,pays,ville,latitude,longitude,canal,is_fraud
TRX_00000001,CLIENT_000042,12.5,EUR,2024-06-01T10:00:00,RETRAIT,PREPAYEE,MERCHANT_00007,,FR,,,,ATM,false
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let tx: Transaction = reader.deserialize().next().unwrap().unwrap();

        assert_eq!(tx.kind, TransactionKind::Withdrawal);
        assert_eq!(tx.card_type, CardType::Prepaid);
        assert_eq!(tx.channel, Channel::Atm);
        assert_eq!(tx.merchant_category, None);
        assert_eq!(tx.city, None);
        assert_eq!(tx.latitude, None);
        assert_eq!(tx.timestamp, Timestamp::Raw("2024-06-01T10:00:00".to_string()));
    }
}
