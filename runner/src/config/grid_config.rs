use common::config::Validate;
use common::games::snake::{GameError, Grid, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct GridConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub cell_size: u32,
    pub start_x: i32,
    pub start_y: i32,
}

impl GridConfig {
    pub fn grid(&self) -> Result<Grid, GameError> {
        Grid::from_canvas(self.canvas_width, self.canvas_height, self.cell_size)
    }

    pub fn start(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }
}

impl Validate for GridConfig {
    fn validate(&self) -> Result<(), String> {
        let grid = self.grid().map_err(|e| e.to_string())?;
        if !grid.in_bounds(self.start()) {
            return Err(format!(
                "start cell {} is outside the {}x{} grid",
                self.start(),
                grid.width,
                grid.height
            ));
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            canvas_width: 400,
            canvas_height: 400,
            cell_size: 20,
            start_x: 10,
            start_y: 10,
        }
    }
}
