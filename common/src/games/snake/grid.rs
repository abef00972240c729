use super::error::GameError;
use super::types::{Obstacle, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Derives the cell grid from a pixel canvas. The canvas must divide evenly into cells.
    pub fn from_canvas(canvas_width: u32, canvas_height: u32, cell_size: u32) -> Result<Self, GameError> {
        let invalid = || GameError::InvalidGrid {
            canvas_width,
            canvas_height,
            cell_size,
        };

        if cell_size == 0
            || canvas_width == 0
            || canvas_height == 0
            || canvas_width % cell_size != 0
            || canvas_height % cell_size != 0
        {
            return Err(invalid());
        }

        let width = i32::try_from(canvas_width / cell_size).map_err(|_| invalid())?;
        let height = i32::try_from(canvas_height / cell_size).map_err(|_| invalid())?;
        Ok(Self::new(width, height))
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Point::new(x, y)))
    }
}

pub fn overlaps_obstacle(point: Point, obstacles: &[Obstacle]) -> bool {
    obstacles.iter().any(|obstacle| obstacle.contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_canvas_divides_evenly() {
        let grid = Grid::from_canvas(400, 400, 20).unwrap();
        assert_eq!(grid, Grid::new(20, 20));
        assert_eq!(grid.cell_count(), 400);
    }

    #[test]
    fn test_from_canvas_rejects_partial_cells() {
        assert!(matches!(
            Grid::from_canvas(410, 400, 20),
            Err(GameError::InvalidGrid { .. })
        ));
        assert!(Grid::from_canvas(400, 400, 0).is_err());
        assert!(Grid::from_canvas(0, 400, 20).is_err());
    }

    #[test]
    fn test_in_bounds_edges() {
        let grid = Grid::new(20, 20);
        assert!(grid.in_bounds(Point::new(0, 0)));
        assert!(grid.in_bounds(Point::new(19, 19)));
        assert!(!grid.in_bounds(Point::new(20, 0)));
        assert!(!grid.in_bounds(Point::new(0, 20)));
        assert!(!grid.in_bounds(Point::new(-1, 5)));
        assert!(!grid.in_bounds(Point::new(5, -1)));
    }

    #[test]
    fn test_overlaps_any_obstacle() {
        let obstacles = [Obstacle::new(5, 5, 2, 10), Obstacle::new(15, 5, 2, 10)];
        assert!(overlaps_obstacle(Point::new(6, 14), &obstacles));
        assert!(overlaps_obstacle(Point::new(15, 5), &obstacles));
        assert!(!overlaps_obstacle(Point::new(7, 5), &obstacles));
        assert!(!overlaps_obstacle(Point::new(10, 10), &[]));
    }

    #[test]
    fn test_cells_covers_grid() {
        let grid = Grid::new(3, 2);
        let cells: Vec<Point> = grid.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Point::new(0, 0));
        assert_eq!(cells[5], Point::new(2, 1));
    }
}
