use super::types::Point;

/// Square playing field. Cells are `0..size` on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    size: i32,
}

impl Grid {
    pub fn new(size: u32) -> Self {
        Self { size: size as i32 }
    }

    pub fn size(&self) -> u32 {
        self.size as u32
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        (0..self.size).contains(&p.x) && (0..self.size).contains(&p.y)
    }

    /// Row-major iteration over every cell.
    pub fn cells(&self) -> impl Iterator<Item = Point> + use<> {
        let size = self.size;
        (0..size).flat_map(move |y| (0..size).map(move |x| Point::new(x, y)))
    }
}

pub fn occupied_by<'a>(points: impl IntoIterator<Item = &'a Point>, p: Point) -> bool {
    points.into_iter().any(|segment| *segment == p)
}
