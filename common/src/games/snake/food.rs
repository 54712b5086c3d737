use serde::{Deserialize, Serialize};

use crate::games::SessionRng;
use super::grid::Grid;
use super::snake::Snake;
use super::types::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Food {
    pub position: Point,
    pub value: u32,
}

impl Food {
    pub fn new(position: Point, value: u32) -> Self {
        Self { position, value }
    }

    /// Picks a free cell and a value from `values`, independently and uniformly.
    /// Falls back to any cell when the snake covers the whole grid.
    pub fn spawn(grid: &Grid, snake: &Snake, values: &[u32], rng: &mut SessionRng) -> Self {
        let free: Vec<Point> = grid.cells().filter(|cell| !snake.occupies(*cell)).collect();
        let position = match rng.pick(&free) {
            Some(cell) => *cell,
            None => {
                let size = grid.size() as i32;
                Point::new(rng.random_range(0..size), rng.random_range(0..size))
            }
        };
        let value = rng.pick(values).copied().unwrap_or(1);

        Self::new(position, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_avoids_snake() {
        let grid = Grid::new(3);
        // Everything but (2,2) is covered.
        let snake = Snake::from_segments(grid.cells().filter(|c| *c != Point::new(2, 2))).unwrap();
        let mut rng = SessionRng::new(7);
        for _ in 0..20 {
            let food = Food::spawn(&grid, &snake, &[1, 5, 10], &mut rng);
            assert_eq!(food.position, Point::new(2, 2));
        }
    }

    #[test]
    fn test_spawn_values_come_from_set() {
        let grid = Grid::new(20);
        let snake = Snake::along_top_row(2);
        let mut rng = SessionRng::new(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let food = Food::spawn(&grid, &snake, &[1, 5, 10], &mut rng);
            assert!(grid.in_bounds(food.position));
            assert!(!snake.occupies(food.position));
            seen.insert(food.value);
        }
        assert_eq!(seen, [1, 5, 10].into_iter().collect());
    }

    #[test]
    fn test_spawn_on_full_grid_stays_in_bounds() {
        let grid = Grid::new(2);
        let snake = Snake::from_segments(grid.cells()).unwrap();
        let mut rng = SessionRng::new(1);
        let food = Food::spawn(&grid, &snake, &[5], &mut rng);
        assert!(grid.in_bounds(food.position));
        assert_eq!(food.value, 5);
    }
}
