mod gateway;
mod memory_store;
mod record;
mod service;

pub use gateway::{GatewayError, ScoreGateway};
pub use memory_store::InMemoryScoreStore;
pub use record::{rank_order, ScoreRecord};
pub use service::{LeaderboardError, LeaderboardService};
