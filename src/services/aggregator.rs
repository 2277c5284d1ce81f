use std::collections::{BTreeMap, HashMap};
use tracing::info;

use crate::domain::{BehaviorEvent, Client, SessionFeatures, Transaction, UnifiedRecord};
use crate::error::{PipelineError, PipelineResult};

/// Session count and mean duration per client, ordered by client id.
pub fn session_features(events: &[BehaviorEvent]) -> Vec<SessionFeatures> {
    let mut totals: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for event in events {
        let entry = totals.entry(event.client_id.as_str()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += u64::from(event.session_duration_secs);
    }

    totals
        .into_iter()
        .map(|(client_id, (count, total))| SessionFeatures {
            client_id: client_id.to_string(),
            session_count: count,
            mean_session_duration_secs: total as f64 / count as f64,
        })
        .collect()
}

/// Left-join transactions to clients, then to session features.
///
/// A duplicated client or feature key would multiply transaction rows, so it
/// is rejected instead.
pub fn unify(
    transactions: &[Transaction],
    clients: &[Client],
    features: &[SessionFeatures],
) -> PipelineResult<Vec<UnifiedRecord>> {
    let clients_by_id = index_unique("clients", clients, |c| c.client_id.as_str())?;
    let features_by_id = index_unique("session_features", features, |f| f.client_id.as_str())?;

    let unified: Vec<UnifiedRecord> = transactions
        .iter()
        .map(|tx| {
            let features = features_by_id
                .get(tx.client_id.as_str())
                .map(|f| (*f).clone())
                .unwrap_or_else(|| SessionFeatures::without_history(&tx.client_id));
            UnifiedRecord {
                transaction: tx.clone(),
                client: clients_by_id.get(tx.client_id.as_str()).map(|c| (*c).clone()),
                session_count: features.session_count,
                mean_session_duration_secs: features.mean_session_duration_secs,
            }
        })
        .collect();

    let unmatched = unified.iter().filter(|r| r.client.is_none()).count();
    info!(
        rows = unified.len(),
        unmatched_clients = unmatched,
        clients_with_sessions = features.len(),
        "Unified dataset built"
    );
    Ok(unified)
}

fn index_unique<'a, T>(
    table: &'static str,
    records: &'a [T],
    key: impl Fn(&'a T) -> &'a str,
) -> PipelineResult<HashMap<&'a str, &'a T>> {
    let mut index = HashMap::with_capacity(records.len());
    for record in records {
        let id = key(record);
        if index.insert(id, record).is_some() {
            return Err(PipelineError::DuplicateJoinKey {
                table,
                key: id.to_string(),
            });
        }
    }
    Ok(index)
}
