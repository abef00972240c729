use super::game_state::SessionPhase;
use super::types::Direction;

#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    InvalidGrid {
        canvas_width: u32,
        canvas_height: u32,
        cell_size: u32,
    },
    NoFreeCell,
    ReverseDirection {
        current: Direction,
        requested: Direction,
    },
    InputIgnored {
        phase: SessionPhase,
    },
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::InvalidGrid {
                canvas_width,
                canvas_height,
                cell_size,
            } => write!(
                f,
                "Canvas {}x{} is not a whole number of {}px cells",
                canvas_width, canvas_height, cell_size
            ),
            GameError::NoFreeCell => write!(f, "No free cell left to place food"),
            GameError::ReverseDirection { current, requested } => write!(
                f,
                "Cannot turn {:?} while moving {:?}",
                requested, current
            ),
            GameError::InputIgnored { phase } => write!(f, "Input ignored in phase {:?}", phase),
        }
    }
}

impl std::error::Error for GameError {}
