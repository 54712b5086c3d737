use serde::{Deserialize, Serialize};

use common::games::snake::GameSnapshot;
use common::leaderboard::ScoreRecord;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Key { key: String },
    Start,
    Save { username: String },
}

impl ClientMessage {
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Saved,
    DuplicateUsername,
    InvalidUsername,
    Failed,
    NotAllowed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Hello {
        session_id: String,
        grid_size: u32,
    },
    State {
        state: GameSnapshot,
    },
    Leaderboard {
        records: Vec<ScoreRecord>,
        top_score: u32,
    },
    SaveResult {
        result: SaveStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    ShuttingDown {
        message: String,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    pub fn leaderboard(records: Vec<ScoreRecord>) -> Self {
        let top_score = records.first().map(|r| r.score).unwrap_or(0);
        ServerMessage::Leaderboard { records, top_score }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::Username;

    #[test]
    fn test_parse_client_messages() {
        assert_eq!(
            ClientMessage::parse(r#"{"type":"key","key":"ArrowUp"}"#),
            Some(ClientMessage::Key {
                key: "ArrowUp".to_string()
            })
        );
        assert_eq!(ClientMessage::parse(r#"{"type":"start"}"#), Some(ClientMessage::Start));
        assert_eq!(
            ClientMessage::parse(r#"{"type":"save","username":" Bob "}"#),
            Some(ClientMessage::Save {
                username: " Bob ".to_string()
            })
        );
    }

    #[test]
    fn test_parse_rejects_unknown_or_malformed() {
        assert_eq!(ClientMessage::parse(r#"{"type":"fly"}"#), None);
        assert_eq!(ClientMessage::parse(r#"{"type":"key"}"#), None);
        assert_eq!(ClientMessage::parse("not json"), None);
    }

    #[test]
    fn test_save_result_wire_format() {
        let json = ServerMessage::SaveResult {
            result: SaveStatus::DuplicateUsername,
            message: None,
        }
        .to_json()
        .unwrap();
        assert_eq!(json, r#"{"type":"save_result","result":"duplicate_username"}"#);
    }

    #[test]
    fn test_leaderboard_top_score_from_first_record() {
        let now = Utc::now();
        let record = |id, score| ScoreRecord {
            id,
            inserted_at: now,
            updated_at: now,
            username: Username::parse(&format!("p{}", id)).unwrap(),
            score,
        };

        let msg = ServerMessage::leaderboard(vec![record(2, 30), record(1, 10)]);
        match msg {
            ServerMessage::Leaderboard { records, top_score } => {
                assert_eq!(records.len(), 2);
                assert_eq!(top_score, 30);
            }
            other => panic!("unexpected message: {:?}", other),
        }

        assert_eq!(
            ServerMessage::leaderboard(Vec::new()),
            ServerMessage::Leaderboard {
                records: Vec::new(),
                top_score: 0
            }
        );
    }
}
