//! Messages pushed by the backend.
//!
//! The backend currently pushes free text on named channels, for example
//! `ai_best_move` carrying `"AI (B) will play: D4 (60.5% Black win)"`.
//! [`PushEvent::from_channel`] turns those into typed events. Backends that can
//! send structured messages use the JSON schema read by
//! [`PushEvent::from_json`], which can also carry the analysis request
//! sequence number a suggestion answers.

use serde::Deserialize;

use crate::error::ParseError;
use crate::moves::Color;

/// A move suggestion received from the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct BestMoveSuggestion {
    /// Go notation or `"pass"`, not yet validated against the board.
    pub move_text: String,
    /// The color the suggestion is for.
    pub color_hint: Color,
    /// Black's win percentage if the move is played.
    pub black_winrate: Option<f64>,
    /// The analysis request this answers, when the backend says so.
    pub request_seq: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PushEvent {
    /// Black's win probability in percent.
    WinrateUpdate { winrate: f64 },
    /// `None` when the backend reports it has no move to suggest.
    AiBestMove(Option<BestMoveSuggestion>),
    AiTopMoves(String),
    GptMoveAnalysis(String),
}

/// A push message as received, before parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawMessage {
    /// Free text on a named channel.
    Channel { name: String, payload: String },
    /// A structured JSON message.
    Json(String),
}

impl RawMessage {
    pub fn channel(name: &str, payload: impl Into<String>) -> Self {
        RawMessage::Channel {
            name: name.to_string(),
            payload: payload.into(),
        }
    }

    pub fn parse(&self) -> Result<PushEvent, ParseError> {
        match self {
            RawMessage::Channel { name, payload } => PushEvent::from_channel(name, payload),
            RawMessage::Json(text) => PushEvent::from_json(text),
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum WireEvent {
    WinrateUpdate {
        winrate: f64,
    },
    AiBestMove {
        color: Color,
        #[serde(rename = "move")]
        mv: Option<String>,
        black_winrate: Option<f64>,
        request_seq: Option<u64>,
    },
    AiTopMoves {
        text: String,
    },
    GptMoveAnalysis {
        text: String,
    },
}

#[derive(Deserialize)]
struct WinratePayload {
    winrate: f64,
}

impl PushEvent {
    /// Parse a free-text message received on the channel named `channel`.
    pub fn from_channel(channel: &str, payload: &str) -> Result<PushEvent, ParseError> {
        match channel {
            "winrate_update" => {
                let payload = payload.trim();
                let winrate = match payload.parse::<f64>() {
                    Ok(winrate) => winrate,
                    Err(_) => serde_json::from_str::<WinratePayload>(payload)?.winrate,
                };
                Ok(PushEvent::WinrateUpdate {
                    winrate: check_winrate(winrate, payload)?,
                })
            }
            "ai_best_move" => parse_best_move_text(payload).map(PushEvent::AiBestMove),
            "ai_top_moves" => Ok(PushEvent::AiTopMoves(payload.to_string())),
            "gpt_move_analysis" => Ok(PushEvent::GptMoveAnalysis(payload.to_string())),
            _ => Err(ParseError::malformed("a known push channel", channel)),
        }
    }

    /// Parse a structured message, e.g.
    /// `{"event":"ai_best_move","color":"W","move":"pass","request_seq":3}`.
    pub fn from_json(text: &str) -> Result<PushEvent, ParseError> {
        let event = match serde_json::from_str::<WireEvent>(text)? {
            WireEvent::WinrateUpdate { winrate } => PushEvent::WinrateUpdate {
                winrate: check_winrate(winrate, text)?,
            },
            WireEvent::AiBestMove {
                color,
                mv,
                black_winrate,
                request_seq,
            } => PushEvent::AiBestMove(mv.map(|move_text| BestMoveSuggestion {
                move_text,
                color_hint: color,
                black_winrate,
                request_seq,
            })),
            WireEvent::AiTopMoves { text } => PushEvent::AiTopMoves(text),
            WireEvent::GptMoveAnalysis { text } => PushEvent::GptMoveAnalysis(text),
        };
        Ok(event)
    }
}

fn check_winrate(winrate: f64, text: &str) -> Result<f64, ParseError> {
    if (0.0..=100.0).contains(&winrate) {
        Ok(winrate)
    } else {
        Err(ParseError::malformed("a win rate between 0 and 100", text))
    }
}

/// Parse `"AI (<B|W>) will play: <move> (<pct>% <Black|White> win)"`.
///
/// `"AI (<B|W>) will not play"` yields `Ok(None)`. The trailing win-rate part
/// is optional; when it is given from White's side it is converted to Black's.
pub fn parse_best_move_text(text: &str) -> Result<Option<BestMoveSuggestion>, ParseError> {
    const EXPECTED: &str = "'AI (<B|W>) will play: <move> (<pct>% <Black|White> win)'";
    let malformed = || ParseError::malformed(EXPECTED, text);

    let rest = text.trim().strip_prefix("AI (").ok_or_else(malformed)?;
    let (color, rest) = rest.split_once(')').ok_or_else(malformed)?;
    let color_hint: Color = color.parse()?;
    let rest = rest.trim_start();

    if rest == "will not play" {
        return Ok(None);
    }
    let rest = rest.strip_prefix("will play:").ok_or_else(malformed)?;
    let mut words = rest.split_whitespace();
    let move_text = words.next().ok_or_else(malformed)?.to_string();

    let tail = words.collect::<Vec<_>>().join(" ");
    let black_winrate = if tail.is_empty() {
        None
    } else {
        Some(parse_winrate_tail(&tail).ok_or_else(malformed)?)
    };

    Ok(Some(BestMoveSuggestion {
        move_text,
        color_hint,
        black_winrate,
        request_seq: None,
    }))
}

/// Parse `"(60.5% Black win)"` into Black's win percentage.
fn parse_winrate_tail(tail: &str) -> Option<f64> {
    let inner = tail.strip_prefix('(')?.strip_suffix(')')?;
    let (pct, side) = inner.split_once("% ")?;
    let pct: f64 = pct.parse().ok()?;
    if !(0.0..=100.0).contains(&pct) {
        return None;
    }
    match side {
        "Black win" => Some(pct),
        "White win" => Some(100.0 - pct),
        _ => None,
    }
}
