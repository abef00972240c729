use crate::games::SessionRng;
use super::effects::EffectType;
use super::error::GameError;
use super::grid::{Grid, overlaps_obstacle};
use super::types::{Obstacle, Point};

/// Random probes before falling back to scanning every free cell.
const MAX_PLACEMENT_ATTEMPTS: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpecialFood {
    pub position: Point,
    pub effect: EffectType,
}

pub struct FoodProvider;

impl FoodProvider {
    /// Uniformly random free cell: not occupied and not inside an obstacle.
    ///
    /// Rejection sampling first; on a crowded grid it switches to picking from
    /// the list of free cells, so it always terminates.
    pub fn place_standard_food(
        rng: &mut SessionRng,
        grid: &Grid,
        is_occupied: impl Fn(Point) -> bool,
        obstacles: &[Obstacle],
    ) -> Result<Point, GameError> {
        let is_free = |p: Point| !is_occupied(p) && !overlaps_obstacle(p, obstacles);

        if grid.cell_count() == 0 {
            return Err(GameError::NoFreeCell);
        }

        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let candidate = Point::new(
                rng.random_range(0..grid.width),
                rng.random_range(0..grid.height),
            );
            if is_free(candidate) {
                return Ok(candidate);
            }
        }

        let free: Vec<Point> = grid.cells().filter(|p| is_free(*p)).collect();
        rng.pick(&free).copied().ok_or(GameError::NoFreeCell)
    }

    /// Rolls for special food. On success picks an effect uniformly from `pool`
    /// and places it on a free cell.
    pub fn maybe_spawn_special_food(
        rng: &mut SessionRng,
        probability: f64,
        pool: &[EffectType],
        grid: &Grid,
        is_occupied: impl Fn(Point) -> bool,
        obstacles: &[Obstacle],
    ) -> Option<SpecialFood> {
        if !rng.chance(probability) {
            return None;
        }
        let effect = *rng.pick(pool)?;
        let position = Self::place_standard_food(rng, grid, is_occupied, obstacles).ok()?;
        Some(SpecialFood { position, effect })
    }
}
