//! The AI turn trigger.
//!
//! Tracks the analysis request in flight, the cached best-move suggestion and
//! the pending-move marker, and decides when a suggestion may be played.
//!
//! ```text
//! Idle --(AI to move, nothing cached)--> AwaitingSuggestion
//! AwaitingSuggestion --(suggestion arrives)--> ReadyToPlay
//! ReadyToPlay --(suggestion taken)--> Idle
//! ```
//!
//! Taking a suggestion always clears it, so it can only ever be played once.

use tracing::{debug, warn};

use crate::events::BestMoveSuggestion;
use crate::moves::Color;
use crate::seats::SeatAssignment;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AiPhase {
    #[default]
    Idle,
    AwaitingSuggestion,
    ReadyToPlay,
}

/// A suggestion that may be played now.
#[derive(Clone, Debug, PartialEq)]
pub struct Playable {
    pub suggestion: BestMoveSuggestion,
    /// Played on behalf of a seat that has since switched to human.
    pub via_pending: bool,
}

#[derive(Debug, Default)]
pub struct AiTrigger {
    phase: AiPhase,
    suggestion: Option<BestMoveSuggestion>,
    pending: Option<Color>,
    /// Sequence number of the latest analysis request.
    last_seq: u64,
    /// Position (number of relayed moves) the outstanding request was made for.
    requested_at: Option<usize>,
}

impl AiTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AiPhase {
        self.phase
    }

    pub fn suggestion(&self) -> Option<&BestMoveSuggestion> {
        self.suggestion.as_ref()
    }

    pub fn pending(&self) -> Option<Color> {
        self.pending
    }

    pub fn last_request_seq(&self) -> u64 {
        self.last_seq
    }

    pub fn mark_pending(&mut self, color: Color) {
        debug!(%color, "Marking pending AI move");
        self.pending = Some(color);
    }

    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    /// Whether an analysis request is needed at `position`: nothing is cached
    /// and no request for this position is outstanding.
    pub fn needs_request(&self, position: usize) -> bool {
        self.suggestion.is_none()
            && !(self.phase == AiPhase::AwaitingSuggestion && self.requested_at == Some(position))
    }

    /// Start a new analysis request for `position` and return its sequence number.
    pub fn begin_request(&mut self, position: usize) -> u64 {
        self.last_seq += 1;
        self.requested_at = Some(position);
        self.phase = AiPhase::AwaitingSuggestion;
        debug!(seq = self.last_seq, position, "Awaiting suggestion");
        self.last_seq
    }

    /// Cache a suggestion from the backend.
    ///
    /// Returns `false` if it answers an older request than the latest one.
    /// Suggestions without a sequence number are taken to answer the latest.
    pub fn receive(&mut self, suggestion: BestMoveSuggestion) -> bool {
        if let Some(seq) = suggestion.request_seq {
            if seq != self.last_seq {
                warn!(
                    seq,
                    latest = self.last_seq,
                    "Discarding suggestion for an outdated analysis request"
                );
                return false;
            }
        }
        debug!(mv = %suggestion.move_text, color = %suggestion.color_hint, "Suggestion cached");
        self.suggestion = Some(suggestion);
        self.requested_at = None;
        self.phase = AiPhase::ReadyToPlay;
        true
    }

    /// The backend has no move to offer.
    pub fn receive_none(&mut self) {
        self.suggestion = None;
        self.requested_at = None;
        self.phase = AiPhase::Idle;
    }

    /// Take the cached suggestion if `to_move` may play it now: its seat is
    /// AI, or a pending move is marked for it.
    ///
    /// A suggestion for the other color is stale and dropped.
    pub fn take_playable(&mut self, to_move: Color, seats: &SeatAssignment) -> Option<Playable> {
        let via_pending = self.pending == Some(to_move);
        if !seats.is_ai(to_move) && !via_pending {
            return None;
        }
        let suggestion = self.suggestion.take()?;
        self.phase = AiPhase::Idle;
        if suggestion.color_hint != to_move {
            warn!(
                mv = %suggestion.move_text,
                hint = %suggestion.color_hint,
                %to_move,
                "Discarding suggestion for the wrong color"
            );
            return None;
        }
        if via_pending {
            self.pending = None;
        }
        Some(Playable {
            suggestion,
            via_pending,
        })
    }

    /// The position changed; whatever was cached or requested no longer applies.
    ///
    /// The sequence counter keeps counting so that answers to requests made
    /// before this point stay recognizable as outdated.
    pub fn invalidate(&mut self) {
        self.suggestion = None;
        self.requested_at = None;
        self.pending = None;
        self.phase = AiPhase::Idle;
    }
}
