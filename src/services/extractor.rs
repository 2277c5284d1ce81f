use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

use crate::domain::{BehaviorEvent, Client, SourceSet, Transaction};
use crate::error::{PipelineError, PipelineResult};
use crate::services::sources::{SourceLayout, CLIENTS, LOGS, TRANSACTIONS};
use crate::services::spreadsheet;

/// Reads the raw artifacts as-is. A source either loads completely or fails.
pub struct Extractor {
    layout: SourceLayout,
}

impl Extractor {
    pub fn new(layout: SourceLayout) -> Self {
        Self { layout }
    }

    pub fn extract_all(&self) -> PipelineResult<SourceSet> {
        let sources = SourceSet {
            transactions: self.read_transactions()?,
            clients: self.read_clients()?,
            events: self.read_events()?,
        };

        info!(
            transactions = sources.transactions.len(),
            clients = sources.clients.len(),
            events = sources.events.len(),
            "Extraction complete"
        );
        Ok(sources)
    }

    pub fn read_transactions(&self) -> PipelineResult<Vec<Transaction>> {
        let path = self.layout.transactions_path();
        let file = open_source(TRANSACTIONS, &path)?;

        let mut reader = csv::Reader::from_reader(BufReader::new(file));
        let transactions = reader
            .deserialize()
            .collect::<Result<Vec<Transaction>, csv::Error>>()
            .map_err(|e| PipelineError::SourceFormat {
                name: TRANSACTIONS,
                path: path.clone(),
                detail: e.to_string(),
            })?;

        info!(path = %path.display(), rows = transactions.len(), "Read transactions");
        Ok(transactions)
    }

    pub fn read_clients(&self) -> PipelineResult<Vec<Client>> {
        let path = self.layout.clients_path();
        ensure_exists(CLIENTS, &path)?;

        let clients = spreadsheet::read_clients(&path)?;
        info!(path = %path.display(), rows = clients.len(), "Read clients");
        Ok(clients)
    }

    pub fn read_events(&self) -> PipelineResult<Vec<BehaviorEvent>> {
        let path = self.layout.events_path();
        let file = open_source(LOGS, &path)?;

        let events: Vec<BehaviorEvent> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| PipelineError::SourceFormat {
                name: LOGS,
                path: path.clone(),
                detail: e.to_string(),
            })?;

        info!(path = %path.display(), rows = events.len(), "Read behavior events");
        Ok(events)
    }
}

fn ensure_exists(name: &'static str, path: &Path) -> PipelineResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PipelineError::SourceNotFound {
            name,
            path: path.to_path_buf(),
        })
    }
}

fn open_source(name: &'static str, path: &Path) -> PipelineResult<File> {
    ensure_exists(name, path)?;
    File::open(path).map_err(|e| PipelineError::io(path, e))
}
