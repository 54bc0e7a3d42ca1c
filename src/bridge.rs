//! The move/turn coordination bridge.
//!
//! A [`Bridge`] is one game session. It owns the board library, the backend
//! connection and all client-side state (turn, seats, cached suggestion), and
//! is driven entirely through [`Bridge::dispatch`]. Work that the browser would
//! defer with a timer is queued on the session's [`Scheduler`] and runs when
//! the host advances the clock.
//!
//! One turn flows like this:
//!
//! 1. a stone is placed (human input or AI move) and the board renders;
//! 2. the render is relayed to the backend as a log line and the turn advances;
//! 3. after the settle delay the AI trigger checks whether the AI is to move,
//!    asking the backend for analysis if so;
//! 4. the backend pushes a suggestion, which is translated and played,
//!    starting again at step 1.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::ai::{AiTrigger, Playable};
use crate::backend::{Backend, BackendRequest};
use crate::board::{BoardError, BoardLibrary};
use crate::config::BridgeConfig;
use crate::constants::UNDO_WITHOUT_MOVE;
use crate::coord::{CoordError, Vertex, check_board_size, from_go_notation};
use crate::events::PushEvent;
use crate::hint::AnalysisView;
use crate::moves::{Color, Move};
use crate::seats::{Controller, SeatAssignment, SeatChange, TurnState};

/// Everything that can happen to a session.
#[derive(Clone, Debug, PartialEq)]
pub enum BridgeEvent {
    /// The board library rendered after a mutation.
    Rendered,
    /// The settle delay after a relayed move elapsed.
    RenderSettled,
    /// The undo-settle delay elapsed; relaying resumes.
    UndoSettled,
    /// A human clicked a point or the pass button.
    HumanMove(Vertex),
    UndoRequested,
    SeatSelected { color: Color, controller: Controller },
    Push(PushEvent),
    ClearBoard,
    ChangeBoardSize(usize),
}

/// Errors returned to the host for its own input. Everything coming from the
/// backend is logged and dropped instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    Board(BoardError),
    Coord(CoordError),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Board(err) => write!(f, "{err}"),
            BridgeError::Coord(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BridgeError::Board(err) => Some(err),
            BridgeError::Coord(err) => Some(err),
        }
    }
}

impl From<BoardError> for BridgeError {
    fn from(err: BoardError) -> Self {
        BridgeError::Board(err)
    }
}

impl From<CoordError> for BridgeError {
    fn from(err: CoordError) -> Self {
        BridgeError::Coord(err)
    }
}

/// Deferred events on a session-local clock.
///
/// Events are kept in due order; events due at the same time keep the order
/// they were scheduled in.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    queue: VecDeque<(Duration, BridgeEvent)>,
}

impl Scheduler {
    pub fn schedule(&mut self, delay: Duration, event: BridgeEvent) {
        let due = self.now + delay;
        let idx = self.queue.partition_point(|(d, _)| *d <= due);
        self.queue.insert(idx, (due, event));
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// When the earliest queued event is due.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.front().map(|(due, _)| *due)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    fn pop_due(&mut self) -> Option<BridgeEvent> {
        match self.queue.front() {
            Some((due, _)) if *due <= self.now => self.queue.pop_front().map(|(_, event)| event),
            _ => None,
        }
    }
}

pub struct Bridge<L, K> {
    board: L,
    backend: K,
    config: BridgeConfig,
    seats: SeatAssignment,
    turn: TurnState,
    ai: AiTrigger,
    view: AnalysisView,
    undo_in_progress: bool,
    scheduler: Scheduler,
}

impl<L: BoardLibrary, K: Backend> Bridge<L, K> {
    pub fn new(mut board: L, backend: K, config: BridgeConfig) -> Self {
        if board.size() != config.board_size() {
            board.reset(config.board_size());
        }
        Self {
            board,
            backend,
            config,
            seats: SeatAssignment::default(),
            turn: TurnState::new(),
            ai: AiTrigger::new(),
            view: AnalysisView::new(),
            undo_in_progress: false,
            scheduler: Scheduler::default(),
        }
    }

    pub fn board(&self) -> &L {
        &self.board
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut K {
        &mut self.backend
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn seats(&self) -> &SeatAssignment {
        &self.seats
    }

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    /// The color to move next.
    pub fn current_turn(&self) -> Color {
        self.turn.current_turn()
    }

    pub fn ai(&self) -> &AiTrigger {
        &self.ai
    }

    pub fn view(&self) -> &AnalysisView {
        &self.view
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn is_undo_in_progress(&self) -> bool {
        self.undo_in_progress
    }

    /// Handle one event.
    pub fn dispatch(&mut self, event: BridgeEvent) -> Result<(), BridgeError> {
        match event {
            BridgeEvent::Rendered => self.on_render(),
            BridgeEvent::RenderSettled => self.check_ai_turn(),
            BridgeEvent::UndoSettled => {
                debug!("Undo settled");
                self.undo_in_progress = false;
            }
            BridgeEvent::HumanMove(vertex) => return self.play_human(vertex),
            BridgeEvent::UndoRequested => self.undo(),
            BridgeEvent::SeatSelected { color, controller } => self.set_seat(color, controller),
            BridgeEvent::Push(event) => self.on_push(event),
            BridgeEvent::ClearBoard => self.clear_board(),
            BridgeEvent::ChangeBoardSize(size) => return self.change_board_size(size),
        }
        Ok(())
    }

    /// Move the session clock forward by `elapsed` and run whatever became due.
    pub fn advance(&mut self, elapsed: Duration) -> Result<(), BridgeError> {
        self.scheduler.now += elapsed;
        self.run_due()
    }

    /// Run every scheduled event, jumping the clock ahead as needed.
    pub fn run_pending(&mut self) -> Result<(), BridgeError> {
        while let Some(due) = self.scheduler.next_due() {
            self.scheduler.now = self.scheduler.now.max(due);
            self.run_due()?;
        }
        Ok(())
    }

    fn run_due(&mut self) -> Result<(), BridgeError> {
        while let Some(event) = self.scheduler.pop_due() {
            self.dispatch(event)?;
        }
        Ok(())
    }

    /// Relay the move that was just rendered, at most once per move.
    fn on_render(&mut self) {
        if self.undo_in_progress {
            debug!("Skipping relay during undo");
            return;
        }
        let state = self.board.current_state();
        if state.move_number <= self.turn.len() {
            debug!(move_number = state.move_number, "Render without a new move");
            return;
        }
        let Some(color) = state.color else {
            return;
        };
        let mv = match (state.pass, state.played_point) {
            (true, _) => Move::pass(color),
            (false, Some((col, row))) => Move::stone(color, col, row),
            (false, None) => return,
        };

        let line = mv.log_line(self.board.size());
        info!(move_number = state.move_number, "{line}");
        self.backend.send(BackendRequest::Log(line));
        self.turn.record(mv);
        self.ai.invalidate();
        self.scheduler
            .schedule(self.config.settle_delay, BridgeEvent::RenderSettled);
    }

    fn check_ai_turn(&mut self) {
        let to_move = self.turn.current_turn();
        if self.seats.is_ai(to_move) && self.ai.needs_request(self.turn.len()) {
            info!(%to_move, "AI to move, requesting analysis");
            self.request_analysis();
        }
        self.play_suggestion_if_needed();
    }

    fn request_analysis(&mut self) {
        let seq = self.ai.begin_request(self.turn.len());
        self.backend.send(BackendRequest::AnalysisRequest { seq });
    }

    fn play_suggestion_if_needed(&mut self) {
        if self.undo_in_progress {
            return;
        }
        let to_move = self.turn.current_turn();
        let Some(Playable {
            suggestion,
            via_pending,
        }) = self.ai.take_playable(to_move, &self.seats)
        else {
            return;
        };

        let vertex = match from_go_notation(&suggestion.move_text, self.board.size()) {
            Ok(vertex) => vertex,
            Err(err) => {
                warn!(mv = %suggestion.move_text, %err, "Discarding malformed suggestion");
                return;
            }
        };
        info!(
            %to_move,
            mv = %suggestion.move_text,
            pending = via_pending,
            "Playing AI move"
        );
        match vertex {
            Vertex::Pass => self.board.pass(),
            Vertex::Point { col, row } => {
                if let Err(err) = self.board.play_at(row, col) {
                    warn!(mv = %suggestion.move_text, %err, "Board refused AI move");
                    return;
                }
            }
        }
        self.on_render();
    }

    fn play_human(&mut self, vertex: Vertex) -> Result<(), BridgeError> {
        match vertex {
            Vertex::Pass => self.board.pass(),
            Vertex::Point { col, row } => self.board.play_at(row, col)?,
        }
        self.on_render();
        Ok(())
    }

    fn undo(&mut self) {
        let Some(last) = self.turn.last_move().copied() else {
            info!("Undo requested with no moves");
            self.backend
                .send(BackendRequest::Undo(UNDO_WITHOUT_MOVE.to_string()));
            return;
        };
        let line = Move::undo_of(&last).log_line(self.board.size());

        self.undo_in_progress = true;
        if !self.board.undo() {
            warn!("Board library had no move to undo");
        }
        self.on_render();

        info!("{line}");
        self.backend.send(BackendRequest::Undo(line));
        self.turn.undo();
        self.ai.invalidate();
        self.scheduler
            .schedule(self.config.undo_settle_delay, BridgeEvent::UndoSettled);
    }

    fn set_seat(&mut self, color: Color, controller: Controller) {
        let to_move = self.turn.current_turn();
        // Any actual controller change, for either color, invalidates the
        // marker. Re-selecting the current controller leaves it alone.
        if self.seats.get(color) != controller && self.ai.pending().is_some() {
            self.ai.clear_pending();
        }
        let change = self.seats.set(color, controller, to_move);
        info!(%color, %controller, "Seat selected");

        match change {
            SeatChange::MarkPending(color) => self.ai.mark_pending(color),
            SeatChange::RequestAnalysis(color) => {
                if self.ai.needs_request(self.turn.len()) {
                    info!(%color, "Requesting analysis for new AI seat");
                    self.request_analysis();
                }
            }
            SeatChange::StatusOnly => {}
        }
        self.backend
            .send(BackendRequest::PlayerStatus(self.seats.status_message()));

        if let SeatChange::RequestAnalysis(_) = change {
            self.play_suggestion_if_needed();
        }
    }

    fn on_push(&mut self, event: PushEvent) {
        match event {
            PushEvent::WinrateUpdate { winrate } => {
                debug!(winrate, "Win rate update");
                self.view.set_winrate(winrate);
            }
            PushEvent::AiBestMove(Some(suggestion)) => {
                info!(
                    mv = %suggestion.move_text,
                    color = %suggestion.color_hint,
                    "Best move received"
                );
                if self.undo_in_progress {
                    debug!("Ignoring suggestion during undo");
                    return;
                }
                let to_move = self.turn.current_turn();
                if suggestion.color_hint != to_move {
                    warn!(
                        mv = %suggestion.move_text,
                        hint = %suggestion.color_hint,
                        %to_move,
                        "Discarding suggestion for the color not to move"
                    );
                    return;
                }
                if self.ai.receive(suggestion.clone()) {
                    self.view.show_suggestion(&suggestion);
                    self.play_suggestion_if_needed();
                }
            }
            PushEvent::AiBestMove(None) => {
                info!("Backend has no move to suggest");
                self.ai.receive_none();
                self.view.clear_suggestion();
            }
            PushEvent::AiTopMoves(text) => info!(top_moves = %text, "AI analysis"),
            PushEvent::GptMoveAnalysis(text) => {
                debug!(analysis = %text, "Move explanation");
                self.view.set_explanation(&text);
            }
        }
    }

    fn clear_board(&mut self) {
        info!("Clearing board");
        self.backend.send(BackendRequest::ClearBoard);
        self.reset_session();
    }

    fn change_board_size(&mut self, size: usize) -> Result<(), BridgeError> {
        let size = check_board_size(size)?;
        info!(size, "Changing board size");
        self.backend.send(BackendRequest::BoardSize(size));
        self.config.board_size = size;
        self.reset_session();
        Ok(())
    }

    /// Empty board, no history, no cached analysis. Seats are kept, and an AI
    /// seat for Black gets its turn after the usual settle delay.
    fn reset_session(&mut self) {
        self.board.reset(self.config.board_size());
        self.turn.clear();
        self.ai.invalidate();
        self.view.reset();
        self.undo_in_progress = false;
        self.scheduler.clear();
        self.scheduler
            .schedule(self.config.settle_delay, BridgeEvent::RenderSettled);
    }

    /// One-line summary of the session state.
    pub fn status_line(&self) -> String {
        format!(
            "to_move={} moves={} {} ai={:?} pending={}",
            self.turn.current_turn(),
            self.turn.len(),
            self.seats.status_message(),
            self.ai.phase(),
            self.ai
                .pending()
                .map_or_else(|| "none".to_string(), |c| c.to_string()),
        )
    }
}
