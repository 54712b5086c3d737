use std::collections::VecDeque;

use super::grid::occupied_by;
use super::types::Point;

/// Snake body, head first. Never empty once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Point>,
}

impl Snake {
    /// Segments `(0,0), (1,0), ..` along the top row; the head is `(0,0)`.
    pub fn along_top_row(length: usize) -> Self {
        let body = (0..length.max(1) as i32).map(|x| Point::new(x, 0)).collect();
        Self { body }
    }

    /// Returns `None` for an empty body.
    pub fn from_segments(segments: impl IntoIterator<Item = Point>) -> Option<Self> {
        let body: VecDeque<Point> = segments.into_iter().collect();
        if body.is_empty() {
            return None;
        }
        Some(Self { body })
    }

    pub fn head(&self) -> Point {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Point> {
        self.body.iter()
    }

    pub fn occupies(&self, p: Point) -> bool {
        occupied_by(&self.body, p)
    }

    pub(crate) fn push_head(&mut self, head: Point) {
        self.body.push_front(head);
    }

    pub(crate) fn drop_tail(&mut self) {
        if self.body.len() > 1 {
            self.body.pop_back();
        }
    }

    pub fn to_vec(&self) -> Vec<Point> {
        self.body.iter().copied().collect()
    }
}
