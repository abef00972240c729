use crate::games::SessionRng;
use super::game_state::{SessionPhase, SnakeGameState};
use super::grid::overlaps_obstacle;
use super::types::{Direction, Point};

/// Greedy autopilot: steps towards the nearest food without hitting anything
/// on the next move.
pub struct BotController;

impl BotController {
    /// The direction to hand to [`SnakeGameState::set_direction`]. Under control
    /// reversal the answer is pre-flipped so the snake still goes where the bot wants.
    pub fn calculate_move(state: &SnakeGameState, rng: &mut SessionRng) -> Option<Direction> {
        if !matches!(state.phase(), SessionPhase::Idle | SessionPhase::Running) {
            return None;
        }

        let direction = Self::efficient_pathfinding(state, rng)?;
        if state.controls_reversed() {
            Some(direction.opposite())
        } else {
            Some(direction)
        }
    }

    fn efficient_pathfinding(state: &SnakeGameState, rng: &mut SessionRng) -> Option<Direction> {
        let head = state.snake().head();
        let target = Self::find_nearest_food(head, state);

        let mut best_dir = None;
        let mut best_distance = u32::MAX;

        for dir in Self::get_valid_directions(state.direction()) {
            let next_pos = head.offset(dir);
            if Self::is_safe_position(next_pos, state) {
                let distance = next_pos.manhattan_distance(target);
                if distance < best_distance {
                    best_distance = distance;
                    best_dir = Some(dir);
                }
            }
        }

        best_dir.or_else(|| Self::random_valid_move(state, rng))
    }

    fn random_valid_move(state: &SnakeGameState, rng: &mut SessionRng) -> Option<Direction> {
        let head = state.snake().head();
        let safe_directions: Vec<Direction> = Self::get_valid_directions(state.direction())
            .into_iter()
            .filter(|&dir| Self::is_safe_position(head.offset(dir), state))
            .collect();

        match rng.pick(&safe_directions) {
            Some(dir) => Some(*dir),
            None => state.direction().or(Some(Direction::Right)),
        }
    }

    fn get_valid_directions(current: Option<Direction>) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| current.is_none_or(|current| !d.is_opposite(&current)))
            .collect()
    }

    fn find_nearest_food(from: Point, state: &SnakeGameState) -> Point {
        let standard = state.food();
        match state.special_food() {
            Some(special)
                if from.manhattan_distance(special.position) < from.manhattan_distance(standard) =>
            {
                special.position
            }
            _ => standard,
        }
    }

    /// The tail still occupies its cell when the head arrives, so it is not safe either.
    fn is_safe_position(pos: Point, state: &SnakeGameState) -> bool {
        state.settings().grid.in_bounds(pos)
            && !overlaps_obstacle(pos, state.obstacles())
            && !state.snake().contains(pos)
    }
}
