//! An in-process stand-in for the analysis backend.
//!
//! The [`Advisor`] keeps its own copy of the game by replaying the log lines it
//! is sent, the way the real backend does. Every analysis request is answered
//! with a random legal point for the color to move, or a pass once the move
//! limit is reached or no legal point is left. Replies are queued as raw push
//! messages for the host to deliver, either as the legacy free text or as
//! structured JSON carrying the request's sequence number.

use std::collections::VecDeque;

use serde_json::json;
use tracing::{debug, warn};

use crate::backend::{Backend, BackendRequest};
use crate::board::{Board, BoardLibrary, Point};
use crate::coord::to_go_notation;
use crate::events::RawMessage;
use crate::moves::{Color, Move, MoveKind, parse_log_line};

pub struct Advisor {
    board: Board,
    moves: Vec<Move>,
    rng: fastrand::Rng,
    max_moves: usize,
    structured: bool,
    outbox: VecDeque<RawMessage>,
}

impl Advisor {
    pub fn new(board_size: usize, seed: u64, max_moves: usize) -> Self {
        Self {
            board: Board::new(board_size),
            moves: Vec::new(),
            rng: fastrand::Rng::with_seed(seed),
            max_moves,
            structured: false,
            outbox: VecDeque::new(),
        }
    }

    /// Answer with structured JSON messages instead of free text.
    pub fn structured(mut self, structured: bool) -> Self {
        self.structured = structured;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Moves the advisor has seen, after undos.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Drain the queued push messages.
    pub fn take_messages(&mut self) -> Vec<RawMessage> {
        self.outbox.drain(..).collect()
    }

    fn to_move(&self) -> Color {
        self.moves
            .last()
            .map_or(Color::Black, |mv| mv.color.opponent())
    }

    fn apply(&mut self, mv: Move) {
        match (mv.kind, mv.position) {
            (MoveKind::Stone, Some((col, row))) => {
                if let Err(err) = self.board.place(col, row, mv.color) {
                    warn!(%err, "Advisor could not mirror move");
                    return;
                }
            }
            (MoveKind::Pass, _) => {}
            _ => return,
        }
        self.moves.push(mv);
        self.queue_winrate();
    }

    fn rewind(&mut self) {
        if self.moves.pop().is_none() {
            debug!("Advisor has nothing to undo");
            return;
        }
        let moves = std::mem::take(&mut self.moves);
        self.board.reset(self.board.size());
        for mv in moves {
            self.apply(mv);
        }
    }

    fn restart(&mut self, size: usize) {
        self.board.reset(size);
        self.moves.clear();
        self.outbox.clear();
    }

    fn game_over(&self) -> bool {
        matches!(
            self.moves.as_slice(),
            [.., a, b] if a.kind == MoveKind::Pass && b.kind == MoveKind::Pass
        )
    }

    /// A random point where `color` may legally play.
    fn pick_point(&mut self, color: Color) -> Option<Point> {
        let mut candidates = self.board.empty_points();
        self.rng.shuffle(&mut candidates);
        candidates.into_iter().find(|&(col, row)| {
            let mut scratch = self.board.clone();
            scratch.place(col, row, color).is_ok()
        })
    }

    /// Black's share of the stones on the board, in percent.
    fn black_winrate(&self) -> f64 {
        let size = self.board.size();
        let (mut black, mut white) = (0usize, 0usize);
        for row in 0..size {
            for col in 0..size {
                match self.board.get(col, row) {
                    Some(Color::Black) => black += 1,
                    Some(Color::White) => white += 1,
                    None => {}
                }
            }
        }
        if black + white == 0 {
            50.0
        } else {
            100.0 * black as f64 / (black + white) as f64
        }
    }

    fn queue_winrate(&mut self) {
        let winrate = self.black_winrate();
        let message = if self.structured {
            RawMessage::Json(json!({"event": "winrate_update", "winrate": winrate}).to_string())
        } else {
            RawMessage::channel("winrate_update", format!("{winrate:.1}"))
        };
        self.outbox.push_back(message);
    }

    fn answer(&mut self, seq: u64) {
        let color = self.to_move();
        let mv = if self.game_over() {
            None
        } else if self.moves.len() >= self.max_moves {
            Some("pass".to_string())
        } else {
            Some(match self.pick_point(color) {
                Some((col, row)) => to_go_notation(col, row, self.board.size()),
                None => "pass".to_string(),
            })
        };
        let winrate = self.black_winrate();
        debug!(seq, %color, ?mv, "Advisor answering");

        let message = if self.structured {
            RawMessage::Json(
                json!({
                    "event": "ai_best_move",
                    "color": color.letter().to_string(),
                    "move": mv,
                    "black_winrate": winrate,
                    "request_seq": seq,
                })
                .to_string(),
            )
        } else {
            let text = match mv {
                Some(mv) => format!(
                    "AI ({}) will play: {mv} ({winrate:.1}% Black win)",
                    color.letter()
                ),
                None => format!("AI ({}) will not play", color.letter()),
            };
            RawMessage::channel("ai_best_move", text)
        };
        self.outbox.push_back(message);
    }
}

impl Backend for Advisor {
    fn send(&mut self, request: BackendRequest) {
        match request {
            BackendRequest::Log(line) => match parse_log_line(&line, self.board.size()) {
                Ok(mv) => self.apply(mv),
                Err(err) => warn!(%line, %err, "Advisor ignoring log line"),
            },
            BackendRequest::AnalysisRequest { seq } => self.answer(seq),
            BackendRequest::Undo(_) => self.rewind(),
            BackendRequest::PlayerStatus(status) => debug!(%status, "Advisor saw seat change"),
            BackendRequest::ClearBoard => {
                let size = self.board.size();
                self.restart(size);
            }
            BackendRequest::BoardSize(size) => self.restart(size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::PushEvent;

    fn best_moves(advisor: &mut Advisor) -> Vec<PushEvent> {
        advisor
            .take_messages()
            .iter()
            .map(|raw| raw.parse().unwrap())
            .filter(|event| matches!(event, PushEvent::AiBestMove(_)))
            .collect()
    }

    #[test]
    fn test_mirrors_log_and_undo() {
        let mut advisor = Advisor::new(9, 1, 100);
        advisor.send(BackendRequest::Log("BLACK played D5".into()));
        advisor.send(BackendRequest::Log("WHITE passed".into()));
        assert_eq!(advisor.moves().len(), 2);
        assert_eq!(advisor.board().get(3, 4), Some(Color::Black));

        advisor.send(BackendRequest::Undo("WHITE undone pass".into()));
        advisor.send(BackendRequest::Undo("BLACK undone D5".into()));
        assert!(advisor.moves().is_empty());
        assert_eq!(advisor.board().get(3, 4), None);
    }

    #[test]
    fn test_answers_for_color_to_move() {
        let mut advisor = Advisor::new(9, 7, 100);
        advisor.send(BackendRequest::Log("BLACK played E5".into()));
        advisor.take_messages();
        advisor.send(BackendRequest::AnalysisRequest { seq: 1 });

        let events = best_moves(&mut advisor);
        let [PushEvent::AiBestMove(Some(suggestion))] = events.as_slice() else {
            panic!("expected one suggestion, got {events:?}");
        };
        assert_eq!(suggestion.color_hint, Color::White);
        assert_ne!(suggestion.move_text, "E5");
        assert_eq!(suggestion.black_winrate, Some(100.0));
    }

    #[test]
    fn test_passes_at_move_limit_then_stops() {
        let mut advisor = Advisor::new(9, 3, 1);
        advisor.send(BackendRequest::Log("BLACK played A1".into()));
        advisor.take_messages();

        advisor.send(BackendRequest::AnalysisRequest { seq: 1 });
        let events = best_moves(&mut advisor);
        assert!(
            matches!(&events[..], [PushEvent::AiBestMove(Some(s))] if s.move_text == "pass")
        );

        advisor.send(BackendRequest::Log("WHITE passed".into()));
        advisor.send(BackendRequest::Log("BLACK passed".into()));
        advisor.send(BackendRequest::AnalysisRequest { seq: 2 });
        assert_eq!(best_moves(&mut advisor), vec![PushEvent::AiBestMove(None)]);
    }

    #[test]
    fn test_structured_reply_carries_sequence() {
        let mut advisor = Advisor::new(9, 5, 100).structured(true);
        advisor.send(BackendRequest::AnalysisRequest { seq: 42 });
        let events = best_moves(&mut advisor);
        let [PushEvent::AiBestMove(Some(suggestion))] = events.as_slice() else {
            panic!("expected one suggestion, got {events:?}");
        };
        assert_eq!(suggestion.request_seq, Some(42));
        assert_eq!(suggestion.color_hint, Color::Black);
    }

    #[test]
    fn test_board_size_restarts() {
        let mut advisor = Advisor::new(9, 0, 100);
        advisor.send(BackendRequest::Log("BLACK played C3".into()));
        advisor.send(BackendRequest::BoardSize(13));
        assert!(advisor.moves().is_empty());
        assert_eq!(advisor.board().size(), 13);
        assert!(advisor.take_messages().is_empty());
    }
}
