mod controller;
mod food;
mod game_state;
mod grid;
mod input;
mod scheduler;
mod settings;
mod snake;
mod types;

pub use controller::GameController;
pub use food::Food;
pub use game_state::{GameSnapshot, SnakeGameState, TickOutcome};
pub use grid::{occupied_by, Grid};
pub use input::{map_key, Command};
pub use scheduler::{TickHandler, TickScheduler, MIN_TICK_INTERVAL};
pub use settings::SnakeSettings;
pub use snake::Snake;
pub use types::{DeathReason, Direction, GameStatus, Point};
