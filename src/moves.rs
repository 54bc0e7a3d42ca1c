//! Stone colors, relayed moves, and the backend's plain-text log lines.
//!
//! Every move the bridge relays is described by a single line of text:
//!
//! - `BLACK played D5`
//! - `WHITE passed`
//! - `BLACK undone D5` / `BLACK undone pass`
//!
//! [`Move::log_line`] produces these and [`parse_log_line`] reads them back,
//! which is what the backend (and the in-process demo advisor) does with them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coord::{Vertex, from_go_notation};
use crate::error::ParseError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "B", alias = "black", alias = "BLACK")]
    Black,
    #[serde(rename = "W", alias = "white", alias = "WHITE")]
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Single letter used by seat status and push messages.
    pub fn letter(self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
        }
    }

    /// Upper-case name used by move log lines.
    pub fn log_name(self) -> &'static str {
        match self {
            Color::Black => "BLACK",
            Color::White => "WHITE",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

impl FromStr for Color {
    type Err = ParseError;

    /// Accepts `black`/`white` in any case, or the single letters `B`/`W`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "b" | "black" => Ok(Color::Black),
            "w" | "white" => Ok(Color::White),
            _ => Err(ParseError::UnknownColor(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveKind {
    Stone,
    Pass,
    Undo,
}

/// A single move as seen by the bridge.
///
/// `position` is `(col, row)` in board-library coordinates. It is always set
/// for stones, never for passes, and set for an undo only when the undone move
/// was a stone.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Move {
    pub color: Color,
    pub kind: MoveKind,
    pub position: Option<(usize, usize)>,
}

impl Move {
    pub fn stone(color: Color, col: usize, row: usize) -> Self {
        Self {
            color,
            kind: MoveKind::Stone,
            position: Some((col, row)),
        }
    }

    pub fn pass(color: Color) -> Self {
        Self {
            color,
            kind: MoveKind::Pass,
            position: None,
        }
    }

    /// The undo of `undone`, keeping its color and position.
    pub fn undo_of(undone: &Move) -> Self {
        Self {
            color: undone.color,
            kind: MoveKind::Undo,
            position: undone.position,
        }
    }

    pub fn vertex(&self) -> Vertex {
        match self.position {
            Some((col, row)) => Vertex::Point { col, row },
            None => Vertex::Pass,
        }
    }

    /// Whether this move hands the turn to the opponent.
    pub fn advances_turn(&self) -> bool {
        matches!(self.kind, MoveKind::Stone | MoveKind::Pass)
    }

    /// The line posted to the backend for this move.
    pub fn log_line(&self, board_size: usize) -> String {
        let color = self.color.log_name();
        match self.kind {
            MoveKind::Stone => format!("{color} played {}", self.vertex().to_notation(board_size)),
            MoveKind::Pass => format!("{color} passed"),
            MoveKind::Undo => format!("{color} undone {}", self.vertex().to_notation(board_size)),
        }
    }
}

/// Parse a move log line as produced by [`Move::log_line`].
pub fn parse_log_line(text: &str, board_size: usize) -> Result<Move, ParseError> {
    const EXPECTED: &str = "'<COLOR> played|undone <vertex>' or '<COLOR> passed'";

    let parts: Vec<&str> = text.split_whitespace().collect();
    let (color, verb, rest) = match parts.as_slice() {
        [color, verb] => (color, *verb, None),
        [color, verb, vertex] => (color, *verb, Some(*vertex)),
        _ => return Err(ParseError::malformed(EXPECTED, text)),
    };
    let color: Color = color.parse()?;

    match (verb, rest) {
        ("passed", None) => Ok(Move::pass(color)),
        ("played", Some(vertex)) => match from_go_notation(vertex, board_size)? {
            Vertex::Point { col, row } => Ok(Move::stone(color, col, row)),
            Vertex::Pass => Ok(Move::pass(color)),
        },
        ("undone", Some(vertex)) => {
            let undone = match from_go_notation(vertex, board_size)? {
                Vertex::Point { col, row } => Move::stone(color, col, row),
                Vertex::Pass => Move::pass(color),
            };
            Ok(Move::undo_of(&undone))
        }
        _ => Err(ParseError::malformed(EXPECTED, text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::CoordError;

    #[test]
    fn test_opponent() {
        assert_eq!(Color::Black.opponent(), Color::White);
        assert_eq!(Color::White.opponent(), Color::Black);
    }

    #[test]
    fn test_color_from_str() {
        assert_eq!("black".parse::<Color>(), Ok(Color::Black));
        assert_eq!("WHITE".parse::<Color>(), Ok(Color::White));
        assert_eq!("B".parse::<Color>(), Ok(Color::Black));
        assert_eq!("w".parse::<Color>(), Ok(Color::White));
        assert_eq!(
            "red".parse::<Color>(),
            Err(ParseError::UnknownColor("red".into()))
        );
    }

    #[test]
    fn test_log_lines() {
        let stone = Move::stone(Color::Black, 3, 4);
        assert_eq!(stone.log_line(9), "BLACK played D5");
        assert_eq!(Move::pass(Color::White).log_line(9), "WHITE passed");
        assert_eq!(Move::undo_of(&stone).log_line(9), "BLACK undone D5");
        assert_eq!(
            Move::undo_of(&Move::pass(Color::White)).log_line(9),
            "WHITE undone pass"
        );
    }

    #[test]
    fn test_advances_turn() {
        assert!(Move::stone(Color::Black, 0, 0).advances_turn());
        assert!(Move::pass(Color::Black).advances_turn());
        assert!(!Move::undo_of(&Move::pass(Color::Black)).advances_turn());
    }

    #[test]
    fn test_parse_log_line() {
        assert_eq!(
            parse_log_line("BLACK played D5", 9),
            Ok(Move::stone(Color::Black, 3, 4))
        );
        assert_eq!(parse_log_line("WHITE passed", 9), Ok(Move::pass(Color::White)));
        assert_eq!(
            parse_log_line("WHITE undone A1", 9),
            Ok(Move::undo_of(&Move::stone(Color::White, 0, 8)))
        );
    }

    #[test]
    fn test_parse_log_line_rejects_garbage() {
        assert!(matches!(
            parse_log_line("ANALYSIS_REQUEST", 9),
            Err(ParseError::Malformed { .. })
        ));
        assert!(matches!(
            parse_log_line("BLACK jumped D5", 9),
            Err(ParseError::Malformed { .. })
        ));
        assert_eq!(
            parse_log_line("GREEN passed", 9),
            Err(ParseError::UnknownColor("GREEN".into()))
        );
        assert_eq!(
            parse_log_line("BLACK played Z99", 9),
            Err(ParseError::Coord(CoordError::BadColumn('Z')))
        );
    }
}
