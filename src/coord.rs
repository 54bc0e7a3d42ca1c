//! Conversion between board-library coordinates and Go notation.
//!
//! The board library addresses points by `(col, row)` with the origin in the
//! top-left corner. Go notation uses a column letter (skipping 'I') and a row
//! number counted from the bottom edge, so `(3, 4)` on a 9x9 board is `"D5"`.
//!
//! Both directions live here so that outgoing moves and incoming AI moves
//! always agree.

use std::fmt;

use crate::constants::{COLUMN_LETTERS, MAX_BOARD_SIZE, MIN_BOARD_SIZE, PASS_TOKEN};

/// A move target: either a board point or a pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Vertex {
    /// Zero-based column and row, row 0 being the top edge.
    Point { col: usize, row: usize },
    Pass,
}

impl Vertex {
    /// Format this vertex as Go notation, or `"pass"`.
    pub fn to_notation(self, board_size: usize) -> String {
        match self {
            Vertex::Point { col, row } => to_go_notation(col, row, board_size),
            Vertex::Pass => PASS_TOKEN.to_string(),
        }
    }
}

/// Why a piece of Go notation was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordError {
    Empty,
    /// First character is not one of [`COLUMN_LETTERS`] (or is past the board edge).
    BadColumn(char),
    /// Row part is missing, not a number, or outside `1..=board_size`.
    BadRow(String),
    UnsupportedBoardSize(usize),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::Empty => write!(f, "empty coordinate"),
            CoordError::BadColumn(c) => write!(f, "invalid column letter '{c}'"),
            CoordError::BadRow(r) => write!(f, "invalid row number '{r}'"),
            CoordError::UnsupportedBoardSize(size) => write!(
                f,
                "unsupported board size {size}, expected {MIN_BOARD_SIZE}..={MAX_BOARD_SIZE}"
            ),
        }
    }
}

impl std::error::Error for CoordError {}

/// Check that a board size can be expressed in Go notation.
pub fn check_board_size(board_size: usize) -> Result<usize, CoordError> {
    if (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&board_size) {
        Ok(board_size)
    } else {
        Err(CoordError::UnsupportedBoardSize(board_size))
    }
}

/// Convert a board-library point to Go notation (e.g. `(3, 4)` on 9x9 is `"D5"`).
///
/// The caller guarantees `col, row < board_size <= MAX_BOARD_SIZE`.
pub fn to_go_notation(col: usize, row: usize, board_size: usize) -> String {
    let letter = COLUMN_LETTERS[col] as char;
    format!("{letter}{}", board_size - row)
}

/// Parse Go notation (case-insensitive) or `"pass"` into a [`Vertex`].
pub fn from_go_notation(text: &str, board_size: usize) -> Result<Vertex, CoordError> {
    let text = text.trim();
    if text.eq_ignore_ascii_case(PASS_TOKEN) {
        return Ok(Vertex::Pass);
    }

    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return Err(CoordError::Empty);
    };
    let upper = first.to_ascii_uppercase();
    let col = COLUMN_LETTERS
        .iter()
        .position(|&c| c as char == upper)
        .filter(|&col| col < board_size)
        .ok_or(CoordError::BadColumn(first))?;

    let rest = chars.as_str();
    let number: usize = rest
        .parse()
        .map_err(|_| CoordError::BadRow(rest.to_string()))?;
    if number == 0 || number > board_size {
        return Err(CoordError::BadRow(rest.to_string()));
    }

    Ok(Vertex::Point {
        col,
        row: board_size - number,
    })
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;

    #[test]
    fn test_to_go_notation_inverts_rows() {
        assert_eq!(to_go_notation(3, 4, 9), "D5");
        assert_eq!(to_go_notation(0, 8, 9), "A1");
        assert_eq!(to_go_notation(0, 0, 9), "A9");
        assert_eq!(to_go_notation(8, 0, 9), "J9");
        assert_eq!(to_go_notation(18, 18, 19), "T1");
    }

    #[test]
    fn test_column_after_h_is_j() {
        assert_eq!(to_go_notation(7, 0, 9), "H9");
        assert_eq!(to_go_notation(8, 0, 9), "J9");
    }

    #[test]
    fn test_from_go_notation_basic() {
        assert_eq!(
            from_go_notation("D5", 9),
            Ok(Vertex::Point { col: 3, row: 4 })
        );
        assert_eq!(
            from_go_notation("d5", 9),
            Ok(Vertex::Point { col: 3, row: 4 })
        );
        assert_eq!(
            from_go_notation(" J1 ", 9),
            Ok(Vertex::Point { col: 8, row: 8 })
        );
    }

    #[test]
    fn test_from_go_notation_pass() {
        assert_eq!(from_go_notation("pass", 9), Ok(Vertex::Pass));
        assert_eq!(from_go_notation("PASS", 19), Ok(Vertex::Pass));
        assert_eq!(from_go_notation("Pass", 13), Ok(Vertex::Pass));
    }

    #[test]
    fn test_from_go_notation_rejects_malformed() {
        assert_eq!(from_go_notation("", 9), Err(CoordError::Empty));
        assert_eq!(from_go_notation("I5", 9), Err(CoordError::BadColumn('I')));
        assert_eq!(from_go_notation("5D", 9), Err(CoordError::BadColumn('5')));
        assert_eq!(from_go_notation("K5", 9), Err(CoordError::BadColumn('K')));
        assert_eq!(from_go_notation("D", 9), Err(CoordError::BadRow(String::new())));
        assert_eq!(from_go_notation("D0", 9), Err(CoordError::BadRow("0".into())));
        assert_eq!(from_go_notation("D10", 9), Err(CoordError::BadRow("10".into())));
        assert_eq!(from_go_notation("D-1", 9), Err(CoordError::BadRow("-1".into())));
        assert_eq!(from_go_notation("resign", 9), Err(CoordError::BadColumn('r')));
    }

    #[test]
    fn test_vertex_to_notation() {
        assert_eq!(Vertex::Pass.to_notation(9), "pass");
        assert_eq!(Vertex::Point { col: 2, row: 2 }.to_notation(13), "C11");
    }

    #[test]
    fn test_check_board_size() {
        assert_eq!(check_board_size(9), Ok(9));
        assert_eq!(check_board_size(25), Ok(25));
        assert_eq!(check_board_size(1), Err(CoordError::UnsupportedBoardSize(1)));
        assert_eq!(check_board_size(26), Err(CoordError::UnsupportedBoardSize(26)));
    }

    quickcheck! {
        fn roundtrip(col: usize, row: usize, size: usize) -> bool {
            let size = 5 + size % 21;
            let (col, row) = (col % size, row % size);
            let notation = to_go_notation(col, row, size);
            from_go_notation(&notation, size) == Ok(Vertex::Point { col, row })
        }

        fn never_produces_letter_i(col: usize, row: usize, size: usize) -> bool {
            let size = 5 + size % 21;
            let notation = to_go_notation(col % size, row % size, size);
            !notation.contains('I')
        }
    }
}
