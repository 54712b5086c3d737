use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::identifiers::Username;
use super::gateway::{GatewayError, ScoreGateway};
use super::record::{rank_order, ScoreRecord};

#[derive(Default)]
struct StoreData {
    records: Vec<ScoreRecord>,
    last_id: i64,
}

/// Process-local store. The uniqueness check and insert happen under one lock.
#[derive(Clone, Default)]
pub struct InMemoryScoreStore {
    data: Arc<Mutex<StoreData>>,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.data.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl ScoreGateway for InMemoryScoreStore {
    async fn find_by_username(&self, username: &Username) -> Result<Option<ScoreRecord>, GatewayError> {
        let data = self.data.lock().await;
        Ok(data.records.iter().find(|r| &r.username == username).cloned())
    }

    async fn create(&self, username: &Username, score: u32) -> Result<ScoreRecord, GatewayError> {
        let mut data = self.data.lock().await;
        if data.records.iter().any(|r| &r.username == username) {
            return Err(GatewayError::DuplicateUsername(username.clone()));
        }

        data.last_id += 1;
        let now = Utc::now();
        let record = ScoreRecord {
            id: data.last_id,
            inserted_at: now,
            updated_at: now,
            username: username.clone(),
            score,
        };
        data.records.push(record.clone());
        Ok(record)
    }

    async fn list_top(&self, limit: usize) -> Result<Vec<ScoreRecord>, GatewayError> {
        let data = self.data.lock().await;
        let mut records = data.records.clone();
        records.sort_by(rank_order);
        records.truncate(limit);
        Ok(records)
    }
}
