use serde::{Deserialize, Serialize};

use crate::games::SessionRng;
use crate::log;
use super::food::Food;
use super::grid::Grid;
use super::settings::SnakeSettings;
use super::snake::Snake;
use super::types::{DeathReason, Direction, GameStatus, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session was not running.
    Ignored,
    Moved,
    Ate { value: u32, leveled_up: bool },
    GameOver(DeathReason),
}

/// Read-only copy of everything a renderer needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub status: GameStatus,
    pub grid_size: u32,
    pub snake: Vec<Point>,
    pub food: Food,
    pub direction: Direction,
    pub score: u32,
    pub level: u32,
    pub speed_ms: u32,
    pub run: u64,
    pub ticks: u64,
    pub death_reason: Option<DeathReason>,
}

pub struct SnakeGameState {
    settings: SnakeSettings,
    grid: Grid,
    status: GameStatus,
    snake: Snake,
    food: Food,
    direction: Direction,
    // Direction of the last executed move; turns are checked against it too.
    last_moved: Direction,
    score: u32,
    level: u32,
    speed_ms: u32,
    // Number of runs started so far; identifies the current run.
    run: u64,
    ticks: u64,
    death_reason: Option<DeathReason>,
}

impl SnakeGameState {
    pub fn new(settings: SnakeSettings, rng: &mut SessionRng) -> Self {
        let grid = Grid::new(settings.grid_size);
        let snake = Snake::along_top_row(settings.initial_snake_length as usize);
        let food = Food::spawn(&grid, &snake, &settings.food_values, rng);
        Self {
            grid,
            status: GameStatus::Idle,
            snake,
            food,
            direction: settings.initial_direction,
            last_moved: settings.initial_direction,
            score: 0,
            level: 0,
            speed_ms: settings.initial_speed_ms,
            run: 0,
            ticks: 0,
            death_reason: None,
            settings,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn speed_ms(&self) -> u32 {
        self.speed_ms
    }

    pub fn run(&self) -> u64 {
        self.run
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Food {
        self.food
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            status: self.status,
            grid_size: self.grid.size(),
            snake: self.snake.to_vec(),
            food: self.food,
            direction: self.direction,
            score: self.score,
            level: self.level,
            speed_ms: self.speed_ms,
            run: self.run,
            ticks: self.ticks,
            death_reason: self.death_reason,
        }
    }

    /// Begins a fresh run. Only valid from `Idle` or `GameOver`.
    pub fn start(&mut self, rng: &mut SessionRng) -> bool {
        if !matches!(self.status, GameStatus::Idle | GameStatus::GameOver) {
            return false;
        }

        self.score = 0;
        self.level = 0;
        self.speed_ms = self.settings.initial_speed_ms;
        self.direction = self.settings.initial_direction;
        self.last_moved = self.settings.initial_direction;
        self.run += 1;
        self.ticks = 0;
        self.death_reason = None;
        self.snake = Snake::along_top_row(self.settings.initial_snake_length as usize);
        self.food = Food::spawn(&self.grid, &self.snake, &self.settings.food_values, rng);
        self.status = GameStatus::Running;
        true
    }

    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if self.status == GameStatus::Paused {
            return false;
        }
        if direction.is_opposite(&self.direction) || direction.is_opposite(&self.last_moved) {
            return false;
        }
        self.direction = direction;
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.status = match self.status {
            GameStatus::Running => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Running,
            GameStatus::Idle | GameStatus::GameOver => return false,
        };
        true
    }

    pub fn tick(&mut self, rng: &mut SessionRng) -> TickOutcome {
        if self.status != GameStatus::Running {
            return TickOutcome::Ignored;
        }

        let next_head = self.snake.head().step(self.direction);

        let collision = if !self.grid.in_bounds(next_head) {
            Some(DeathReason::WallCollision)
        } else if self.snake.occupies(next_head) {
            Some(DeathReason::SelfCollision)
        } else {
            None
        };

        if let Some(reason) = collision {
            self.status = GameStatus::GameOver;
            self.death_reason = Some(reason);
            log!(
                "Game over ({:?}) at ({}, {}), score {}",
                reason,
                next_head.x,
                next_head.y,
                self.score
            );
            return TickOutcome::GameOver(reason);
        }

        self.ticks += 1;
        self.last_moved = self.direction;
        self.snake.push_head(next_head);

        if next_head != self.food.position {
            self.snake.drop_tail();
            return TickOutcome::Moved;
        }

        let value = self.food.value;
        self.score += value;
        self.food = Food::spawn(&self.grid, &self.snake, &self.settings.food_values, rng);
        let leveled_up = self.apply_level_ups();

        TickOutcome::Ate { value, leveled_up }
    }

    fn apply_level_ups(&mut self) -> bool {
        let mut leveled_up = false;
        while self.score / self.settings.level_threshold > self.level {
            self.level += 1;
            self.speed_ms = self.speed_ms.saturating_sub(self.settings.speed_decrement_ms);
            leveled_up = true;
            log!("Level {} reached, speed {}ms", self.level, self.speed_ms);
        }
        leveled_up
    }

    #[cfg(test)]
    pub(crate) fn with_layout(
        settings: SnakeSettings,
        segments: &[Point],
        direction: Direction,
        food: Food,
    ) -> Self {
        let mut rng = SessionRng::new(0);
        let mut state = Self::new(settings, &mut rng);
        state.snake = Snake::from_segments(segments.iter().copied()).unwrap();
        state.direction = direction;
        state.last_moved = direction;
        state.food = food;
        state.status = GameStatus::Running;
        state.run = 1;
        state
    }

    #[cfg(test)]
    pub(crate) fn set_score(&mut self, score: u32) {
        self.score = score;
    }
}
