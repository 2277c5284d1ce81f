//! Behavioral event captured by the web and mobile front ends.

use serde::{Deserialize, Serialize};

use super::value::{Tabular, Timestamp, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionAction {
    Login,
    NavigationCompte,
    ConsultationSolde,
    Transaction,
    Logout,
}

impl SessionAction {
    pub const ALL: [SessionAction; 5] = [
        SessionAction::Login,
        SessionAction::NavigationCompte,
        SessionAction::ConsultationSolde,
        SessionAction::Transaction,
        SessionAction::Logout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionAction::Login => "login",
            SessionAction::NavigationCompte => "navigation_compte",
            SessionAction::ConsultationSolde => "consultation_solde",
            SessionAction::Transaction => "transaction",
            SessionAction::Logout => "logout",
        }
    }
}

/// `client_id` refers to a client but is not enforced as a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BehaviorEvent {
    pub session_id: String,
    pub client_id: String,
    pub timestamp: Timestamp,
    pub action: SessionAction,
    pub device_type: String,
    pub os: String,
    pub browser: String,
    /// Pseudonymized.
    pub ip_address: String,
    #[serde(rename = "duree_session_sec")]
    pub session_duration_secs: u32,
}

pub const EVENT_COLUMNS: [&str; 9] = [
    "session_id",
    "client_id",
    "timestamp",
    "action",
    "device_type",
    "os",
    "browser",
    "ip_address",
    "duree_session_sec",
];

impl Tabular for BehaviorEvent {
    fn columns() -> Vec<String> {
        EVENT_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn cells(&self) -> Vec<Value> {
        vec![
            Value::Text(self.session_id.clone()),
            Value::Text(self.client_id.clone()),
            self.timestamp.to_value(),
            Value::Text(self.action.as_str().to_string()),
            Value::Text(self.device_type.clone()),
            Value::Text(self.os.clone()),
            Value::Text(self.browser.clone()),
            Value::Text(self.ip_address.clone()),
            Value::Int(self.session_duration_secs.into()),
        ]
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn event(session_id: &str, client_id: &str, duration: u32) -> BehaviorEvent {
        BehaviorEvent {
            session_id: session_id.to_string(),
            client_id: client_id.to_string(),
            timestamp: Timestamp::Raw("2024-06-02T08:15:00".to_string()),
            action: SessionAction::Login,
            device_type: "mobile".to_string(),
            os: "Android".to_string(),
            browser: "Chrome".to_string(),
            ip_address: "10.0.0.1".to_string(),
            session_duration_secs: duration,
        }
    }
}
