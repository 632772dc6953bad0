use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One analyzed betting opportunity as stored in a sport's daily-bets table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetRecord {
    pub id: Option<i64>,
    /// Opaque analysis payload produced by the ingestion side
    pub analysis: serde_json::Value,
    pub price: Option<Decimal>,
    pub game_time: Option<DateTime<Utc>>,
    pub game_tag: Option<String>,
    /// Assigned by the store at insert time
    pub created_at: DateTime<Utc>,
}

impl BetRecord {
    /// Whether the record is past the given retention window as of `now`
    pub fn is_expired(&self, window: Duration, now: DateTime<Utc>) -> bool {
        now - self.created_at > window
    }
}

/// Insert shape for a bet; the store assigns id and created_at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBet {
    pub analysis: serde_json::Value,
    pub price: Option<Decimal>,
    pub game_time: Option<DateTime<Utc>>,
    pub game_tag: Option<String>,
}
