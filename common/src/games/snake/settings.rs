use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Validate;
use crate::defaults;
use super::types::Direction;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeSettings {
    pub grid_size: u32,
    pub initial_snake_length: u32,
    pub initial_direction: Direction,
    pub initial_speed_ms: u32,
    pub level_threshold: u32,
    pub speed_decrement_ms: u32,
    pub food_values: Vec<u32>,
}

impl Default for SnakeSettings {
    fn default() -> Self {
        Self {
            grid_size: defaults::GRID_SIZE,
            initial_snake_length: defaults::INITIAL_SNAKE_LENGTH,
            initial_direction: defaults::INITIAL_DIRECTION,
            initial_speed_ms: defaults::INITIAL_SPEED_MS,
            level_threshold: defaults::LEVEL_THRESHOLD,
            speed_decrement_ms: defaults::SPEED_DECREMENT_MS,
            food_values: defaults::FOOD_VALUES.to_vec(),
        }
    }
}

impl SnakeSettings {
    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_speed_ms as u64)
    }
}

impl Validate for SnakeSettings {
    fn validate(&self) -> Result<(), String> {
        if !(5..=100).contains(&self.grid_size) {
            return Err("grid_size must be between 5 and 100".to_string());
        }
        if self.initial_snake_length < 1 || self.initial_snake_length > self.grid_size {
            return Err("initial_snake_length must be between 1 and grid_size".to_string());
        }
        if self.initial_speed_ms < 10 || self.initial_speed_ms > 5000 {
            return Err("initial_speed_ms must be between 10 and 5000".to_string());
        }
        if self.level_threshold == 0 {
            return Err("level_threshold must be greater than 0".to_string());
        }
        if self.food_values.is_empty() {
            return Err("food_values must not be empty".to_string());
        }
        if self.food_values.contains(&0) {
            return Err("food_values must be positive".to_string());
        }
        Ok(())
    }
}
