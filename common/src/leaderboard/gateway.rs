use std::fmt;
use std::future::Future;

use crate::identifiers::Username;
use super::record::ScoreRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    DuplicateUsername(Username),
    Storage(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::DuplicateUsername(name) => {
                write!(f, "Username '{}' is already taken", name)
            }
            GatewayError::Storage(e) => write!(f, "Score store error: {}", e),
        }
    }
}

impl std::error::Error for GatewayError {}

/// Access to the score record store.
pub trait ScoreGateway: Send + Sync + 'static {
    /// Exact, case-sensitive match.
    fn find_by_username(
        &self,
        username: &Username,
    ) -> impl Future<Output = Result<Option<ScoreRecord>, GatewayError>> + Send;

    /// Fails with [`GatewayError::DuplicateUsername`] if the name is taken.
    fn create(
        &self,
        username: &Username,
        score: u32,
    ) -> impl Future<Output = Result<ScoreRecord, GatewayError>> + Send;

    /// Best scores first, at most `limit` records.
    fn list_top(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ScoreRecord>, GatewayError>> + Send;
}
