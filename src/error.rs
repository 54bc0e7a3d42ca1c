use std::fmt;

use crate::coord::CoordError;

/// Malformed text coming from the backend or the console.
///
/// Anything that fails to parse is logged and dropped by the caller; it never
/// changes board, seat or turn state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Coord(CoordError),
    UnknownColor(String),
    UnknownController(String),
    /// Text did not match the expected message shape.
    Malformed { expected: &'static str, text: String },
    Json(String),
}

impl ParseError {
    pub(crate) fn malformed(expected: &'static str, text: &str) -> Self {
        ParseError::Malformed {
            expected,
            text: text.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Coord(err) => write!(f, "bad coordinate: {err}"),
            ParseError::UnknownColor(c) => write!(f, "unknown color '{c}'"),
            ParseError::UnknownController(c) => {
                write!(f, "unknown controller '{c}', expected 'human' or 'ai'")
            }
            ParseError::Malformed { expected, text } => {
                write!(f, "expected {expected}, got '{text}'")
            }
            ParseError::Json(err) => write!(f, "invalid JSON message: {err}"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Coord(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CoordError> for ParseError {
    fn from(err: CoordError) -> Self {
        ParseError::Coord(err)
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::Json(err.to_string())
    }
}
