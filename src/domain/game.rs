use chrono::{DateTime, NaiveDate, Utc};

use serde::{Deserialize, Serialize};

use uuid::Uuid;

/// A free game promotion, identified by its title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub title: String,
    /// First day of the promotion window
    pub start_date: NaiveDate,
    /// Last day of the promotion window
    pub end_date: NaiveDate,
}

impl GameRecord {
    /// Two records describe the same promotion when their titles match
    pub fn same_game(&self, other: &GameRecord) -> bool {
        self.title == other.title
    }
}

/// A previously announced game
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    #[serde(flatten)]
    pub game: GameRecord,
    pub recorded_at: DateTime<Utc>,
}
