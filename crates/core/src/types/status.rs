//! Status enums for accounts and synchronization runs.

use serde::{Deserialize, Serialize};

/// Error returned when parsing a [`ConnectionStatus`] from a string fails.
#[derive(thiserror::Error, Debug, Clone)]
#[error("invalid connection status: {0}")]
pub struct ParseStatusError(String);

/// Connection lifecycle of a marketplace account.
///
/// `Pending` accounts have stored credentials but have never completed a
/// successful sync. `Connected` and `Error` alternate as scheduled cycles
/// succeed or fail; an `Error` account stays in the scheduler's rotation so
/// a transient failure heals itself on the next cycle. `Disconnected` is a
/// manual opt-out and is skipped until the account is reconnected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "connection_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Pending,
    Connected,
    Error,
    Disconnected,
}

impl ConnectionStatus {
    /// Whether scheduled sync cycles should pick this account up.
    #[must_use]
    pub const fn is_sync_eligible(self) -> bool {
        matches!(self, Self::Connected | Self::Error)
    }

    /// Status to persist after a sync attempt.
    #[must_use]
    pub const fn after_sync(success: bool) -> Self {
        if success { Self::Connected } else { Self::Error }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Connected => write!(f, "connected"),
            Self::Error => write!(f, "error"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

impl std::str::FromStr for ConnectionStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "connected" => Ok(Self::Connected),
            "error" => Ok(Self::Error),
            "disconnected" => Ok(Self::Disconnected),
            _ => Err(ParseStatusError(s.to_owned())),
        }
    }
}

/// Kind of synchronization work a cycle performs for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncKind {
    Products,
    Orders,
    Finances,
}

impl std::fmt::Display for SyncKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Products => write!(f, "products"),
            Self::Orders => write!(f, "orders"),
            Self::Finances => write!(f, "finances"),
        }
    }
}

/// Category of a settled financial event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "financial_event_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum FinancialEventType {
    Shipment,
    Refund,
    ServiceFee,
}

impl std::fmt::Display for FinancialEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shipment => write!(f, "shipment"),
            Self::Refund => write!(f, "refund"),
            Self::ServiceFee => write!(f, "service_fee"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_connected_and_error_accounts_are_picked_up_by_the_scheduler() {
        assert!(!ConnectionStatus::Pending.is_sync_eligible());
        assert!(ConnectionStatus::Connected.is_sync_eligible());
        assert!(ConnectionStatus::Error.is_sync_eligible());
        assert!(!ConnectionStatus::Disconnected.is_sync_eligible());
    }

    #[test]
    fn sync_outcome_maps_to_status() {
        assert_eq!(ConnectionStatus::after_sync(true), ConnectionStatus::Connected);
        assert_eq!(ConnectionStatus::after_sync(false), ConnectionStatus::Error);
    }

    #[test]
    fn status_round_trips_through_its_string_form() {
        for status in [
            ConnectionStatus::Pending,
            ConnectionStatus::Connected,
            ConnectionStatus::Error,
            ConnectionStatus::Disconnected,
        ] {
            let parsed: ConnectionStatus = status.to_string().parse().expect("round trip");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn status_wire_form_is_snake_case() {
        let json = serde_json::to_value(ConnectionStatus::Disconnected).expect("status json");
        assert_eq!(json, serde_json::json!("disconnected"));

        let json = serde_json::to_value(FinancialEventType::ServiceFee).expect("event json");
        assert_eq!(json, serde_json::json!("service_fee"));
    }
}
