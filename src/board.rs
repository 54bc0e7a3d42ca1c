//! The board-library boundary and an in-memory board that implements it.
//!
//! The bridge only needs a narrow slice of a board library: introspection of
//! the latest move, play/pass/undo calls, and a reset for board-size changes.
//! [`BoardLibrary`] captures exactly that. [`Board`] is a small reference
//! implementation with capture and suicide handling, used by the console, the
//! demo advisor and tests.

use std::fmt;

use crate::moves::Color;

/// A point in board-library coordinates: `(col, row)` with row 0 at the top.
pub type Point = (usize, usize);

/// What the board library reports after a render.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BoardState {
    /// The point the latest move was played at, if it was a stone.
    pub played_point: Option<Point>,
    /// Whether the latest move was a pass.
    pub pass: bool,
    /// Color of the latest move; `None` before the first move.
    pub color: Option<Color>,
    /// Number of moves on the board, counting passes.
    pub move_number: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    OutOfBounds { col: usize, row: usize },
    Occupied { col: usize, row: usize },
    Suicide { col: usize, row: usize },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::OutOfBounds { col, row } => {
                write!(f, "illegal move: ({col}, {row}) is off the board")
            }
            BoardError::Occupied { col, row } => {
                write!(f, "illegal move: ({col}, {row}) is not empty")
            }
            BoardError::Suicide { col, row } => write!(f, "illegal move: ({col}, {row}) is suicide"),
        }
    }
}

impl std::error::Error for BoardError {}

/// The calls the bridge makes into a board library.
pub trait BoardLibrary {
    fn size(&self) -> usize;

    fn current_state(&self) -> BoardState;

    /// Place a stone for the color to move. Takes `(row, col)`, the order the
    /// board library uses.
    fn play_at(&mut self, row: usize, col: usize) -> Result<(), BoardError>;

    fn pass(&mut self);

    /// Take back the latest move. Returns `false` if there was nothing to undo.
    fn undo(&mut self) -> bool;

    /// Start over with an empty board of `size`.
    fn reset(&mut self, size: usize);
}

#[derive(Clone)]
struct Snapshot {
    cells: Vec<Option<Color>>,
    state: BoardState,
}

#[derive(Clone)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Color>>,
    state: BoardState,
    history: Vec<Snapshot>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
            state: BoardState::default(),
            history: Vec::new(),
        }
    }

    fn idx(&self, col: usize, row: usize) -> usize {
        row * self.size + col
    }

    pub fn get(&self, col: usize, row: usize) -> Option<Color> {
        if col >= self.size || row >= self.size {
            return None;
        }
        self.cells[self.idx(col, row)]
    }

    /// The color whose move it is on this board.
    pub fn to_move(&self) -> Color {
        self.state.color.map_or(Color::Black, Color::opponent)
    }

    /// All empty points, in row-major order.
    pub fn empty_points(&self) -> Vec<Point> {
        (0..self.size)
            .flat_map(|row| (0..self.size).map(move |col| (col, row)))
            .filter(|&(col, row)| self.get(col, row).is_none())
            .collect()
    }

    /// Place a stone of `color` at `(col, row)`, resolving captures.
    ///
    /// Returns the number of captured stones.
    pub fn place(&mut self, col: usize, row: usize, color: Color) -> Result<usize, BoardError> {
        if col >= self.size || row >= self.size {
            return Err(BoardError::OutOfBounds { col, row });
        }
        if self.get(col, row).is_some() {
            return Err(BoardError::Occupied { col, row });
        }
        let before = self.cells.clone();
        let idx = self.idx(col, row);
        self.cells[idx] = Some(color);

        let opp = color.opponent();
        let mut to_remove: Vec<Point> = Vec::new();
        for (nc, nr) in self.neighbors(col, row) {
            if self.get(nc, nr) == Some(opp) && self.group_liberties(nc, nr) == 0 {
                self.collect_group(nc, nr, &mut to_remove);
            }
        }
        to_remove.sort_unstable();
        to_remove.dedup();
        for &(rc, rr) in &to_remove {
            let i = self.idx(rc, rr);
            self.cells[i] = None;
        }

        if to_remove.is_empty() && self.group_liberties(col, row) == 0 {
            self.cells = before;
            return Err(BoardError::Suicide { col, row });
        }
        Ok(to_remove.len())
    }

    fn push_history(&mut self) {
        self.history.push(Snapshot {
            cells: self.cells.clone(),
            state: self.state,
        });
    }

    fn neighbors(&self, col: usize, row: usize) -> impl Iterator<Item = Point> + use<> {
        let s = self.size;
        let mut v = Vec::with_capacity(4);
        if col > 0 {
            v.push((col - 1, row));
        }
        if col + 1 < s {
            v.push((col + 1, row));
        }
        if row > 0 {
            v.push((col, row - 1));
        }
        if row + 1 < s {
            v.push((col, row + 1));
        }
        v.into_iter()
    }

    fn collect_group(&self, col: usize, row: usize, out: &mut Vec<Point>) {
        let Some(color) = self.get(col, row) else {
            return;
        };
        let mut stack = vec![(col, row)];
        let mut visited = vec![false; self.size * self.size];
        while let Some((cc, cr)) = stack.pop() {
            let i = self.idx(cc, cr);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            out.push((cc, cr));
            for (nc, nr) in self.neighbors(cc, cr) {
                if !visited[self.idx(nc, nr)] && self.get(nc, nr) == Some(color) {
                    stack.push((nc, nr));
                }
            }
        }
    }

    fn group_liberties(&self, col: usize, row: usize) -> usize {
        let Some(color) = self.get(col, row) else {
            return 0;
        };
        let mut stack = vec![(col, row)];
        let mut visited = vec![false; self.size * self.size];
        let mut liberties = 0;
        while let Some((cc, cr)) = stack.pop() {
            let i = self.idx(cc, cr);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            for (nc, nr) in self.neighbors(cc, cr) {
                let ni = self.idx(nc, nr);
                match self.get(nc, nr) {
                    None if !visited[ni] => {
                        visited[ni] = true;
                        liberties += 1;
                    }
                    Some(c) if c == color && !visited[ni] => stack.push((nc, nr)),
                    _ => {}
                }
            }
        }
        liberties
    }
}

impl BoardLibrary for Board {
    fn size(&self) -> usize {
        self.size
    }

    fn current_state(&self) -> BoardState {
        self.state
    }

    fn play_at(&mut self, row: usize, col: usize) -> Result<(), BoardError> {
        let color = self.to_move();
        let snapshot = Snapshot {
            cells: self.cells.clone(),
            state: self.state,
        };
        self.place(col, row, color)?;
        self.history.push(snapshot);
        self.state = BoardState {
            played_point: Some((col, row)),
            pass: false,
            color: Some(color),
            move_number: self.state.move_number + 1,
        };
        Ok(())
    }

    fn pass(&mut self) {
        let color = self.to_move();
        self.push_history();
        self.state = BoardState {
            played_point: None,
            pass: true,
            color: Some(color),
            move_number: self.state.move_number + 1,
        };
    }

    fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(snapshot) => {
                self.cells = snapshot.cells;
                self.state = snapshot.state;
                true
            }
            None => false,
        }
    }

    fn reset(&mut self, size: usize) {
        *self = Board::new(size);
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            write!(f, "{:>2} ", self.size - row)?;
            for col in 0..self.size {
                let ch = match self.get(col, row) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "   ")?;
        for &letter in crate::constants::COLUMN_LETTERS.iter().take(self.size) {
            write!(f, "{} ", letter as char)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_alternates_colors() {
        let mut board = Board::new(9);
        board.play_at(4, 3).unwrap();
        assert_eq!(board.get(3, 4), Some(Color::Black));
        assert_eq!(
            board.current_state(),
            BoardState {
                played_point: Some((3, 4)),
                pass: false,
                color: Some(Color::Black),
                move_number: 1,
            }
        );
        board.play_at(0, 0).unwrap();
        assert_eq!(board.get(0, 0), Some(Color::White));
        assert_eq!(board.to_move(), Color::Black);
    }

    #[test]
    fn test_occupied_point_is_rejected() {
        let mut board = Board::new(9);
        board.play_at(2, 2).unwrap();
        assert_eq!(
            board.play_at(2, 2),
            Err(BoardError::Occupied { col: 2, row: 2 })
        );
        assert_eq!(board.current_state().move_number, 1);
    }

    #[test]
    fn test_capture_in_corner() {
        let mut board = Board::new(9);
        board.place(0, 0, Color::White).unwrap();
        board.place(1, 0, Color::Black).unwrap();
        let captured = board.place(0, 1, Color::Black).unwrap();
        assert_eq!(captured, 1);
        assert_eq!(board.get(0, 0), None);
    }

    #[test]
    fn test_suicide_is_rejected() {
        let mut board = Board::new(9);
        board.place(1, 0, Color::Black).unwrap();
        board.place(0, 1, Color::Black).unwrap();
        assert_eq!(
            board.place(0, 0, Color::White),
            Err(BoardError::Suicide { col: 0, row: 0 })
        );
        assert_eq!(board.get(0, 0), None);
    }

    #[test]
    fn test_pass_and_undo() {
        let mut board = Board::new(9);
        board.play_at(4, 3).unwrap();
        board.pass();
        let state = board.current_state();
        assert!(state.pass);
        assert_eq!(state.color, Some(Color::White));
        assert_eq!(state.move_number, 2);

        assert!(board.undo());
        assert_eq!(board.current_state().played_point, Some((3, 4)));
        assert!(board.undo());
        assert_eq!(board.get(3, 4), None);
        assert_eq!(board.current_state(), BoardState::default());
        assert!(!board.undo());
    }

    #[test]
    fn test_reset_changes_size() {
        let mut board = Board::new(9);
        board.play_at(0, 0).unwrap();
        board.reset(13);
        assert_eq!(board.size(), 13);
        assert_eq!(board.empty_points().len(), 169);
    }

    #[test]
    fn test_display_labels() {
        let mut board = Board::new(5);
        board.play_at(4, 0).unwrap();
        let text = board.to_string();
        assert!(text.starts_with(" 5 . . . . ."));
        assert!(text.contains(" 1 X . . . ."));
        assert!(text.trim_end().ends_with("A B C D E"));
    }

    #[test]
    fn test_display_wider_than_alphabet() {
        let text = Board::new(30).to_string();
        assert_eq!(text.lines().count(), 31);
        assert!(text.trim_end().ends_with("Y Z"));
    }
}
