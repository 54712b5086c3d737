use std::sync::Arc;

use tokio::sync::Mutex;

use common::games::snake::{GameSnapshot, GameStatus};
use common::leaderboard::{LeaderboardError, LeaderboardService, ScoreGateway, ScoreRecord};
use common::log;

use crate::protocol::SaveStatus;

#[derive(Debug, Default)]
struct SaveGate {
    saved_run: Option<u64>,
    in_flight: bool,
}

impl SaveGate {
    fn begin(&mut self, snapshot: &GameSnapshot) -> Result<(), &'static str> {
        if snapshot.status != GameStatus::GameOver {
            return Err("Scores can only be saved after the game is over");
        }
        if self.saved_run == Some(snapshot.run) {
            return Err("Score for this game is already saved");
        }
        if self.in_flight {
            return Err("A save is already in progress");
        }
        self.in_flight = true;
        Ok(())
    }

    fn finish(&mut self, run: u64, saved: bool) {
        self.in_flight = false;
        if saved {
            self.saved_run = Some(run);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveReply {
    pub status: SaveStatus,
    pub message: Option<String>,
    pub record: Option<ScoreRecord>,
}

impl SaveReply {
    fn rejected(message: &str) -> Self {
        Self {
            status: SaveStatus::NotAllowed,
            message: Some(message.to_string()),
            record: None,
        }
    }
}

fn reply_for(result: Result<ScoreRecord, LeaderboardError>) -> SaveReply {
    match result {
        Ok(record) => SaveReply {
            status: SaveStatus::Saved,
            message: None,
            record: Some(record),
        },
        Err(e) => {
            let status = match &e {
                LeaderboardError::InvalidUsername(_) => SaveStatus::InvalidUsername,
                LeaderboardError::DuplicateUsername(_) => SaveStatus::DuplicateUsername,
                LeaderboardError::Gateway(_) => SaveStatus::Failed,
            };
            SaveReply {
                status,
                message: Some(e.to_string()),
                record: None,
            }
        }
    }
}

/// Saves the final score of one connection's games. At most one save runs at
/// a time and each finished run is saved at most once. Failed saves can be
/// retried.
pub struct ScoreSaver<G: ScoreGateway> {
    leaderboard: LeaderboardService<G>,
    gate: Arc<Mutex<SaveGate>>,
}

impl<G: ScoreGateway> Clone for ScoreSaver<G> {
    fn clone(&self) -> Self {
        Self {
            leaderboard: self.leaderboard.clone(),
            gate: self.gate.clone(),
        }
    }
}

impl<G: ScoreGateway> ScoreSaver<G> {
    pub fn new(leaderboard: LeaderboardService<G>) -> Self {
        Self {
            leaderboard,
            gate: Arc::new(Mutex::new(SaveGate::default())),
        }
    }

    pub async fn save(&self, snapshot: &GameSnapshot, username: &str) -> SaveReply {
        if let Err(reason) = self.gate.lock().await.begin(snapshot) {
            return SaveReply::rejected(reason);
        }

        let result = self.leaderboard.save_score(username, snapshot.score).await;
        if let Err(LeaderboardError::Gateway(e)) = &result {
            log!("Saving score for run {} failed: {}", snapshot.run, e);
        }

        let reply = reply_for(result);
        self.gate
            .lock()
            .await
            .finish(snapshot.run, reply.status == SaveStatus::Saved);
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::games::SessionRng;
    use common::games::snake::{SnakeGameState, SnakeSettings};
    use common::leaderboard::{GatewayError, InMemoryScoreStore};
    use common::Username;

    fn finished(run: u64, score: u32) -> GameSnapshot {
        let mut snapshot =
            SnakeGameState::new(SnakeSettings::default(), &mut SessionRng::new(3)).snapshot();
        snapshot.status = GameStatus::GameOver;
        snapshot.run = run;
        snapshot.score = score;
        snapshot
    }

    fn saver() -> ScoreSaver<InMemoryScoreStore> {
        ScoreSaver::new(LeaderboardService::new(InMemoryScoreStore::default(), 10))
    }

    #[tokio::test]
    async fn test_save_finished_game() {
        let saver = saver();
        let reply = saver.save(&finished(1, 42), "Alice").await;

        assert_eq!(reply.status, SaveStatus::Saved);
        let record = reply.record.unwrap();
        assert_eq!(record.username.as_str(), "Alice");
        assert_eq!(record.score, 42);
    }

    #[tokio::test]
    async fn test_running_game_cannot_be_saved() {
        let saver = saver();
        let mut snapshot = finished(1, 42);
        snapshot.status = GameStatus::Running;

        let reply = saver.save(&snapshot, "Alice").await;
        assert_eq!(reply.status, SaveStatus::NotAllowed);
        assert!(saver.leaderboard.top().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_is_saved_once() {
        let saver = saver();
        assert_eq!(saver.save(&finished(1, 42), "Alice").await.status, SaveStatus::Saved);
        assert_eq!(saver.save(&finished(1, 42), "Bob").await.status, SaveStatus::NotAllowed);

        // The next run may be saved again.
        assert_eq!(saver.save(&finished(2, 7), "Bob").await.status, SaveStatus::Saved);
    }

    #[tokio::test]
    async fn test_rejected_name_allows_retry() {
        let saver = saver();
        saver.save(&finished(1, 10), "Alice").await;

        let reply = saver.save(&finished(2, 50), "Alice").await;
        assert_eq!(reply.status, SaveStatus::DuplicateUsername);
        assert!(reply.message.is_some());

        let reply = saver.save(&finished(2, 50), "   ").await;
        assert_eq!(reply.status, SaveStatus::InvalidUsername);

        let reply = saver.save(&finished(2, 50), "Carol").await;
        assert_eq!(reply.status, SaveStatus::Saved);
    }

    #[test]
    fn test_gate_blocks_concurrent_save() {
        let mut gate = SaveGate::default();
        let snapshot = finished(1, 5);
        assert!(gate.begin(&snapshot).is_ok());
        assert!(gate.begin(&snapshot).is_err());

        gate.finish(1, false);
        assert!(gate.begin(&snapshot).is_ok());
    }

    #[test]
    fn test_store_failure_maps_to_failed() {
        let reply = reply_for(Err(LeaderboardError::Gateway(GatewayError::Storage(
            "disk full".to_string(),
        ))));
        assert_eq!(reply.status, SaveStatus::Failed);

        let reply = reply_for(Err(LeaderboardError::DuplicateUsername(
            Username::parse("x").unwrap(),
        )));
        assert_eq!(reply.status, SaveStatus::DuplicateUsername);
    }
}
