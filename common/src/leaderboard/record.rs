use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::Username;

/// One leaderboard row. Ids and timestamps are assigned by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: i64,
    pub inserted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub username: Username,
    pub score: u32,
}

/// Highest score first; equal scores keep insertion order.
pub fn rank_order(a: &ScoreRecord, b: &ScoreRecord) -> std::cmp::Ordering {
    b.score.cmp(&a.score).then(a.id.cmp(&b.id))
}
