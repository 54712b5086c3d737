use crate::games::snake::Direction;

pub const GRID_SIZE: u32 = 20;
pub const INITIAL_SNAKE_LENGTH: u32 = 2;
pub const INITIAL_DIRECTION: Direction = Direction::Down;
pub const INITIAL_SPEED_MS: u32 = 150;
pub const LEVEL_THRESHOLD: u32 = 50;
pub const SPEED_DECREMENT_MS: u32 = 10;
pub const FOOD_VALUES: [u32; 3] = [1, 5, 10];
pub const LEADERBOARD_SIZE: usize = 10;
