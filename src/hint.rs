//! What the player sees of the backend's analysis: the win-rate bar and the
//! AI hint panel.

use std::fmt;

use crate::constants::NEUTRAL_WINRATE;
use crate::events::BestMoveSuggestion;
use crate::moves::Color;

const WAITING: &str = "Waiting for AI analysis...";

#[derive(Clone, Debug, PartialEq)]
struct Hint {
    move_text: String,
    color: Color,
    black_winrate: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisView {
    black_winrate: f64,
    hint: Option<Hint>,
    explanation: Option<String>,
}

impl Default for AnalysisView {
    fn default() -> Self {
        Self {
            black_winrate: NEUTRAL_WINRATE,
            hint: None,
            explanation: None,
        }
    }
}

impl AnalysisView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn black_winrate(&self) -> f64 {
        self.black_winrate
    }

    pub fn white_winrate(&self) -> f64 {
        100.0 - self.black_winrate
    }

    pub fn set_winrate(&mut self, black_winrate: f64) {
        self.black_winrate = black_winrate.clamp(0.0, 100.0);
    }

    /// Show the latest suggestion. A new suggestion replaces the explanation
    /// of the previous one.
    pub fn show_suggestion(&mut self, suggestion: &BestMoveSuggestion) {
        self.hint = Some(Hint {
            move_text: suggestion.move_text.clone(),
            color: suggestion.color_hint,
            black_winrate: suggestion.black_winrate,
        });
        self.explanation = None;
    }

    pub fn clear_suggestion(&mut self) {
        self.hint = None;
        self.explanation = None;
    }

    pub fn set_explanation(&mut self, text: &str) {
        self.explanation = Some(text.to_string());
    }

    pub fn suggested_move(&self) -> Option<&str> {
        self.hint.as_ref().map(|h| h.move_text.as_str())
    }

    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Text of the hint panel.
    pub fn hint_text(&self) -> String {
        match &self.hint {
            Some(hint) => {
                let mut text = format!("Suggested Move: {} ({})", hint.move_text, hint.color);
                if let Some(pct) = hint.black_winrate {
                    text.push_str(&format!(", {pct:.1}% Black win"));
                }
                text.push('\n');
                text.push_str(self.explanation.as_deref().unwrap_or(WAITING));
                text
            }
            None => format!("Suggested Move: -\n{WAITING}"),
        }
    }
}

impl fmt::Display for AnalysisView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Black {:.1}% | White {:.1}%",
            self.black_winrate(),
            self.white_winrate()
        )
    }
}

/// Rough description of the game stage, e.g. `opening on a 9x9 board`.
pub fn board_context(move_number: usize, board_size: usize) -> String {
    let phase = if move_number > board_size * 3 {
        "endgame"
    } else if move_number > board_size * 2 {
        "middle game"
    } else {
        "opening"
    };
    format!("{phase} on a {board_size}x{board_size} board")
}
