//! Turn and seat bookkeeping.
//!
//! [`TurnState`] derives whose turn it is from the moves relayed so far, and
//! [`SeatAssignment`] records whether each color is played by a human or by
//! the AI. Neither talks to the backend directly; seat changes return a
//! [`SeatChange`] describing what the caller has to do.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::moves::{Color, Move};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Controller {
    #[default]
    Human,
    Ai,
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Controller::Human => write!(f, "human"),
            Controller::Ai => write!(f, "ai"),
        }
    }
}

impl FromStr for Controller {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(Controller::Human),
            "ai" => Ok(Controller::Ai),
            _ => Err(ParseError::UnknownController(s.to_string())),
        }
    }
}

/// Which controller sits at each color. Both seats start out human.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SeatAssignment {
    black: Controller,
    white: Controller,
}

/// What a seat change requires of the caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SeatChange {
    /// The color to move went from AI to human while its move may be in flight.
    MarkPending(Color),
    /// The color to move went from human to AI and needs a suggestion.
    RequestAnalysis(Color),
    /// Nothing beyond the status update.
    StatusOnly,
}

impl SeatAssignment {
    pub fn new(black: Controller, white: Controller) -> Self {
        Self { black, white }
    }

    pub fn get(&self, color: Color) -> Controller {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    pub fn is_ai(&self, color: Color) -> bool {
        self.get(color) == Controller::Ai
    }

    /// Assign `controller` to `color`, given the color currently to move.
    pub fn set(&mut self, color: Color, controller: Controller, to_move: Color) -> SeatChange {
        let seat = match color {
            Color::Black => &mut self.black,
            Color::White => &mut self.white,
        };
        let previous = std::mem::replace(seat, controller);

        if color != to_move {
            return SeatChange::StatusOnly;
        }
        match (previous, controller) {
            (Controller::Ai, Controller::Human) => SeatChange::MarkPending(color),
            (Controller::Human, Controller::Ai) => SeatChange::RequestAnalysis(color),
            _ => SeatChange::StatusOnly,
        }
    }

    /// Body of the `/player_status` request, e.g. `players B=human W=ai`.
    pub fn status_message(&self) -> String {
        format!("players B={} W={}", self.black, self.white)
    }
}

/// Relayed move history, from which the turn is derived.
#[derive(Clone, Debug, Default)]
pub struct TurnState {
    history: Vec<Move>,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The color to move next. Black opens the game.
    pub fn current_turn(&self) -> Color {
        self.history
            .last()
            .map_or(Color::Black, |mv| mv.color.opponent())
    }

    /// Record a relayed stone or pass. Undo moves are ignored; use [`TurnState::undo`].
    pub fn record(&mut self, mv: Move) {
        if mv.advances_turn() {
            self.history.push(mv);
        }
    }

    /// Forget the most recent move, handing the turn back to its color.
    pub fn undo(&mut self) -> Option<Move> {
        self.history.pop()
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    pub fn moves(&self) -> &[Move] {
        &self.history
    }

    /// Number of moves relayed so far.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}
