use std::fmt;
use std::sync::Arc;

use crate::identifiers::{Username, UsernameError};
use crate::log;
use super::gateway::{GatewayError, ScoreGateway};
use super::record::ScoreRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardError {
    InvalidUsername(UsernameError),
    DuplicateUsername(Username),
    Gateway(GatewayError),
}

impl fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaderboardError::InvalidUsername(e) => write!(f, "{}", e),
            LeaderboardError::DuplicateUsername(name) => {
                write!(f, "Username '{}' is already taken", name)
            }
            LeaderboardError::Gateway(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LeaderboardError {}

impl From<UsernameError> for LeaderboardError {
    fn from(e: UsernameError) -> Self {
        LeaderboardError::InvalidUsername(e)
    }
}

impl From<GatewayError> for LeaderboardError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::DuplicateUsername(name) => LeaderboardError::DuplicateUsername(name),
            other => LeaderboardError::Gateway(other),
        }
    }
}

/// Save and ranking rules on top of a [`ScoreGateway`].
pub struct LeaderboardService<G: ScoreGateway> {
    gateway: Arc<G>,
    size: usize,
}

impl<G: ScoreGateway> Clone for LeaderboardService<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            size: self.size,
        }
    }
}

impl<G: ScoreGateway> LeaderboardService<G> {
    pub fn new(gateway: G, size: usize) -> Self {
        Self {
            gateway: Arc::new(gateway),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Checks the name is free before inserting. The store may still report a
    /// duplicate if another save wins the race in between.
    pub async fn save_score(&self, raw_username: &str, score: u32) -> Result<ScoreRecord, LeaderboardError> {
        let username = Username::parse(raw_username)?;

        if self.gateway.find_by_username(&username).await?.is_some() {
            log!("Rejected score {} for '{}': name taken", score, username);
            return Err(LeaderboardError::DuplicateUsername(username));
        }

        let record = self.gateway.create(&username, score).await?;
        log!("Saved score {} for '{}' (id {})", record.score, record.username, record.id);
        Ok(record)
    }

    /// Looks up a stored name. The length limit only guards new saves, so a
    /// longer stored name can still be found.
    pub async fn find(&self, raw_username: &str) -> Result<Option<ScoreRecord>, LeaderboardError> {
        let username = match Username::parse(raw_username) {
            Err(UsernameError::TooLong { .. }) => {
                Username::from_stored(raw_username.trim().to_string())
            }
            parsed => parsed?,
        };
        Ok(self.gateway.find_by_username(&username).await?)
    }

    pub async fn top(&self) -> Result<Vec<ScoreRecord>, LeaderboardError> {
        Ok(self.gateway.list_top(self.size).await?)
    }

    pub async fn top_score(&self) -> Result<u32, LeaderboardError> {
        let best = self.gateway.list_top(1).await?;
        Ok(best.first().map(|r| r.score).unwrap_or(0))
    }
}
