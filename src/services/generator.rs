//! Synthetic source generator.
//!
//! Produces the three raw datasets with a fixed fraud rate and deliberately
//! injected gaps so the cleaner has something to repair. All randomness comes
//! from the `Rng` handed to [`SourceGenerator::new`]; two generators never
//! share state.

use chrono::{Duration, NaiveDateTime};
use fake::faker::address::fr_fr::{CityName, ZipCode};
use fake::faker::internet::en::IPv4;
use fake::Fake;
use rand::Rng;
use std::collections::HashSet;
use std::fs;
use tracing::info;

use crate::domain::{
    BehaviorEvent, CardType, Channel, Client, FraudHistory, IncomeBracket, SessionAction,
    SexCode, SourceSet, Transaction, TransactionKind,
};
use crate::error::{PipelineError, PipelineResult};
use crate::services::frame::TableFrame;
use crate::services::sources::{SourceLayout, TRANSACTIONS};

pub const FRAUD_RATE: f64 = 0.0025;
pub const CITY_MISSING_RATE: f64 = 0.03;
pub const CREDIT_SCORE_MISSING_RATE: f64 = 0.11;
pub const FRAUD_HISTORY_RATE: f64 = 0.05;

const LEGIT_AMOUNT: std::ops::Range<f64> = 5.0..2000.0;
const FRAUD_AMOUNT: std::ops::Range<f64> = 500.0..5000.0;

/// `None` is drawn as often as any category.
const MERCHANT_CATEGORIES: [Option<&str>; 7] = [
    Some("SUPERMARCHE"),
    Some("RESTAURANT"),
    Some("ESSENCE"),
    Some("VETEMENTS"),
    Some("PHARMACIE"),
    Some("LOISIRS"),
    None,
];
const DEVICE_TYPES: [&str; 3] = ["mobile", "desktop", "tablet"];
const OPERATING_SYSTEMS: [&str; 4] = ["iOS", "Android", "Windows", "macOS"];
const BROWSERS: [&str; 4] = ["Chrome", "Safari", "Firefox", "Edge"];

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub transaction_count: usize,
    pub events_per_transaction: usize,
    pub client_pool: u32,
    pub merchant_pool: u32,
    /// Upper bound of every generated timestamp.
    pub reference_time: NaiveDateTime,
    pub window_days: i64,
    pub fraud_history_days: i64,
}

impl GeneratorSettings {
    pub fn new(transaction_count: usize, reference_time: NaiveDateTime) -> Self {
        Self {
            transaction_count,
            events_per_transaction: 5,
            client_pool: 5000,
            merchant_pool: 500,
            reference_time,
            window_days: 30,
            fraud_history_days: 730,
        }
    }
}

pub struct SourceGenerator<R> {
    rng: R,
    settings: GeneratorSettings,
}

impl<R: Rng> SourceGenerator<R> {
    pub fn new(rng: R, settings: GeneratorSettings) -> Self {
        Self { rng, settings }
    }

    pub fn generate(&mut self) -> SourceSet {
        let transactions: Vec<Transaction> = (0..self.settings.transaction_count)
            .map(|i| self.transaction(i))
            .collect();

        let mut seen = HashSet::new();
        let client_ids: Vec<String> = transactions
            .iter()
            .filter(|tx| seen.insert(tx.client_id.as_str()))
            .map(|tx| tx.client_id.clone())
            .collect();

        let clients: Vec<Client> = client_ids.iter().map(|id| self.client(id)).collect();

        let event_count = if client_ids.is_empty() {
            0
        } else {
            self.settings.transaction_count * self.settings.events_per_transaction
        };
        let events: Vec<BehaviorEvent> = (0..event_count)
            .map(|i| self.event(i, &client_ids))
            .collect();

        let fraud_count = transactions.iter().filter(|tx| tx.is_fraud).count();
        info!(
            transactions = transactions.len(),
            fraud = fraud_count,
            clients = clients.len(),
            events = events.len(),
            "Generated synthetic sources"
        );

        SourceSet {
            transactions,
            clients,
            events,
        }
    }

    fn transaction(&mut self, index: usize) -> Transaction {
        let is_fraud = self.rng.random::<f64>() < FRAUD_RATE;
        let amount = if is_fraud {
            self.rng.random_range(FRAUD_AMOUNT)
        } else {
            self.rng.random_range(LEGIT_AMOUNT)
        };

        let city: Option<String> = if self.rng.random::<f64>() > CITY_MISSING_RATE {
            Some(CityName().fake_with_rng(&mut self.rng))
        } else {
            None
        };
        let merchant_category = pick(&mut self.rng, &MERCHANT_CATEGORIES).map(str::to_string);
        let client = self.rng.random_range(1..=self.settings.client_pool);
        let timestamp = self.recent_instant();
        let kind = pick(&mut self.rng, &TransactionKind::ALL);
        let card_type = pick(&mut self.rng, &CardType::ALL);
        let merchant = self.rng.random_range(1..=self.settings.merchant_pool);

        let (latitude, longitude) = if city.is_some() {
            (
                Some(round_to(self.rng.random_range(42.0..51.0), 6)),
                Some(round_to(self.rng.random_range(-4.0..8.0), 6)),
            )
        } else {
            (None, None)
        };
        let channel = pick(&mut self.rng, &Channel::ALL);

        Transaction {
            transaction_id: format!("TRX_{:08}", index),
            client_id: format!("CLIENT_{:06}", client),
            amount: round_to(amount, 2),
            currency: "EUR".to_string(),
            timestamp: timestamp.into(),
            kind,
            card_type,
            merchant_id: format!("MERCHANT_{:05}", merchant),
            merchant_category,
            country: "FR".to_string(),
            city,
            latitude,
            longitude,
            channel,
            is_fraud,
        }
    }

    fn client(&mut self, client_id: &str) -> Client {
        let credit_score = if self.rng.random::<f64>() > CREDIT_SCORE_MISSING_RATE {
            Some(self.rng.random_range(300..=850))
        } else {
            None
        };
        let zip: String = ZipCode().fake_with_rng(&mut self.rng);
        let fraud_history = if self.rng.random::<f64>() < FRAUD_HISTORY_RATE {
            let days_ago = self.rng.random_range(0..=self.settings.fraud_history_days);
            FraudHistory::LastOn(self.settings.reference_time.date() - Duration::days(days_ago))
        } else {
            FraudHistory::Never
        };

        Client {
            client_id: client_id.to_string(),
            age: self.rng.random_range(18..=80),
            sex: pick(&mut self.rng, &SexCode::ALL),
            postal_code: zip.chars().take(5).collect(),
            tenure_months: self.rng.random_range(1..=120),
            product_count: self.rng.random_range(1..=5),
            income_bracket: pick(&mut self.rng, &IncomeBracket::ALL),
            credit_score,
            fraud_history,
        }
    }

    fn event(&mut self, index: usize, client_ids: &[String]) -> BehaviorEvent {
        let client_id = client_ids[self.rng.random_range(0..client_ids.len())].clone();
        let timestamp = self.recent_instant();

        BehaviorEvent {
            session_id: format!("SESSION_{:08}", index),
            client_id,
            timestamp: timestamp.into(),
            action: pick(&mut self.rng, &SessionAction::ALL),
            device_type: pick(&mut self.rng, &DEVICE_TYPES).to_string(),
            os: pick(&mut self.rng, &OPERATING_SYSTEMS).to_string(),
            browser: pick(&mut self.rng, &BROWSERS).to_string(),
            ip_address: IPv4().fake_with_rng(&mut self.rng),
            session_duration_secs: self.rng.random_range(30..=3600),
        }
    }

    fn recent_instant(&mut self) -> NaiveDateTime {
        let window_secs = self.settings.window_days * 86_400;
        let offset = self.rng.random_range(0..window_secs);
        self.settings.reference_time - Duration::seconds(offset)
    }
}

fn pick<T: Copy, R: Rng>(rng: &mut R, items: &[T]) -> T {
    items[rng.random_range(0..items.len())]
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Write the raw artifacts: CSV transactions, XLSX clients, JSON events.
pub fn write_raw_sources(sources: &SourceSet, layout: &SourceLayout) -> PipelineResult<()> {
    fs::create_dir_all(layout.raw_dir()).map_err(|e| PipelineError::io(layout.raw_dir(), e))?;

    let tx_path = layout.transactions_path();
    let bytes = TableFrame::from_records(TRANSACTIONS, &sources.transactions)
        .to_csv_bytes()
        .map_err(|e| PipelineError::io(&tx_path, e))?;
    fs::write(&tx_path, bytes).map_err(|e| PipelineError::io(&tx_path, e))?;

    crate::services::spreadsheet::write_clients(&layout.clients_path(), &sources.clients)?;

    let events_path = layout.events_path();
    let json = serde_json::to_vec_pretty(&sources.events).map_err(|e| {
        PipelineError::io(&events_path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    fs::write(&events_path, json).map_err(|e| PipelineError::io(&events_path, e))?;

    info!(raw_dir = %layout.raw_dir().display(), "Raw sources written");
    Ok(())
}
