use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use common::config::Validate;
use common::defaults;
use common::games::snake::SnakeSettings;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";
pub const DEFAULT_DATABASE_PATH: &str = "snake_scores.db";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    /// `None` keeps scores in memory only.
    pub database_path: Option<String>,
    pub static_files_path: Option<String>,
    pub leaderboard_size: usize,
    pub game: SnakeSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            database_path: Some(DEFAULT_DATABASE_PATH.to_string()),
            static_files_path: None,
            leaderboard_size: defaults::LEADERBOARD_SIZE,
            game: SnakeSettings::default(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.bind_address.parse::<SocketAddr>().is_err() {
            return Err(format!("bind_address '{}' is not a socket address", self.bind_address));
        }
        if matches!(&self.database_path, Some(path) if path.trim().is_empty()) {
            return Err("database_path must not be empty".to_string());
        }
        if !(1..=100).contains(&self.leaderboard_size) {
            return Err("leaderboard_size must be between 1 and 100".to_string());
        }
        self.game.validate().map_err(|e| format!("game: {}", e))
    }
}
