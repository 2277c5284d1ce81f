pub mod behavior;
pub mod client;
pub mod features;
pub mod transaction;
pub mod value;

pub use behavior::{BehaviorEvent, SessionAction};
pub use client::{Client, FraudHistory, IncomeBracket, SexCode};
pub use features::{SessionFeatures, UnifiedRecord};
pub use transaction::{CardType, Channel, Transaction, TransactionKind};
pub use value::{Tabular, Timestamp, Value};

/// The three raw record collections, in source shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceSet {
    pub transactions: Vec<Transaction>,
    pub clients: Vec<Client>,
    pub events: Vec<BehaviorEvent>,
}
