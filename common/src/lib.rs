pub mod config;
pub mod defaults;
pub mod games;
pub mod identifiers;
pub mod leaderboard;
pub mod logger;

pub use identifiers::*;
