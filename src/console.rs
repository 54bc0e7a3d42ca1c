//! Line-oriented console for driving a session by hand.
//!
//! The framing follows GTP: an optional numeric id, a command and its
//! arguments, answered with `=id message` on success or `?id message` on
//! failure. Backend pushes are simulated with `push`.
//!
//! ## Commands
//!
//! - `play <vertex>` / `pass` - Human move for the color to move
//! - `undo` - Take back the latest move
//! - `seat <black|white> <human|ai>` - Change who controls a color
//! - `push <event> <payload>` - Deliver a free-text push, e.g.
//!   `push ai_best_move AI (W) will play: C3 (48.0% Black win)`
//! - `push <json>` - Deliver a structured push
//! - `settle` - Run all deferred work now
//! - `clear_board`, `boardsize <n>` - Start over
//! - `showboard`, `status`, `hint` - Inspect the session
//! - `list_commands`, `known_command <cmd>`, `name`, `version`, `quit`
//!
//! Unless the console is created with `auto_settle` off, deferred work runs
//! after every command, waiting out the configured delays.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use tracing::debug;

use crate::backend::Backend;
use crate::board::{Board, BoardLibrary};
use crate::bridge::{Bridge, BridgeEvent};
use crate::config::BridgeConfig;
use crate::coord::{Vertex, from_go_notation};
use crate::events::RawMessage;
use crate::hint::board_context;
use crate::moves::Color;
use crate::seats::Controller;

/// The list of known console commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "hint",
    "known_command",
    "list_commands",
    "name",
    "pass",
    "play",
    "push",
    "quit",
    "seat",
    "settle",
    "showboard",
    "status",
    "undo",
    "version",
];

pub struct Console<K> {
    bridge: Bridge<Board, K>,
    auto_settle: bool,
}

impl<K: Backend> Console<K> {
    pub fn new(backend: K, config: BridgeConfig) -> Self {
        let board = Board::new(config.board_size());
        Self {
            bridge: Bridge::new(board, backend, config),
            auto_settle: true,
        }
    }

    /// Leave deferred work queued until `settle` is given.
    pub fn manual_settle(mut self) -> Self {
        self.auto_settle = false;
        self
    }

    pub fn bridge(&self) -> &Bridge<Board, K> {
        &self.bridge
    }

    /// Run the command loop, reading from stdin and writing to stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let Some((command, rest)) = split_command(command_line) else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, rest);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(stdout, "{prefix}{id_str} {message}\n")?;
            stdout.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a command and return (success, response).
    ///
    /// `rest` is the unsplit remainder of the line, since push payloads
    /// contain spaces.
    pub fn execute(&mut self, command: &str, rest: &str) -> (bool, String) {
        let args: Vec<&str> = rest.split_whitespace().collect();
        let result = match command {
            "name" => Ok(env!("CARGO_PKG_NAME").to_string()),

            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),

            "known_command" => match args.first() {
                Some(cmd) => {
                    let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                    Ok(known.to_string())
                }
                None => Err("missing argument".to_string()),
            },

            "quit" => Ok(String::new()),

            "play" => match args.first() {
                Some(vertex) => self.play(vertex),
                None => Err("missing argument".to_string()),
            },

            "pass" => self.dispatch(BridgeEvent::HumanMove(Vertex::Pass)),

            "undo" => self.dispatch(BridgeEvent::UndoRequested),

            "seat" => self.seat(&args),

            "push" => self.push(rest.trim()),

            "settle" => self.settle().map(|()| String::new()),

            "clear_board" => self.dispatch(BridgeEvent::ClearBoard),

            "boardsize" => match args.first().map(|s| s.parse::<usize>()) {
                Some(Ok(size)) => self.dispatch(BridgeEvent::ChangeBoardSize(size)),
                Some(Err(_)) => Err("invalid size".to_string()),
                None => Err("missing argument".to_string()),
            },

            "showboard" => Ok(format!("\n{}", self.bridge.board())),

            "status" => Ok(self.status()),

            "hint" => Ok(self.bridge.view().hint_text()),

            _ => Err(format!("unknown command: {command}")),
        };

        match result {
            Ok(message) => (true, message),
            Err(message) => (false, message),
        }
    }

    fn play(&mut self, vertex: &str) -> Result<String, String> {
        let vertex =
            from_go_notation(vertex, self.bridge.board().size()).map_err(|e| e.to_string())?;
        self.dispatch(BridgeEvent::HumanMove(vertex))
    }

    fn seat(&mut self, args: &[&str]) -> Result<String, String> {
        let [color, controller] = args else {
            return Err("usage: seat <black|white> <human|ai>".to_string());
        };
        let color: Color = color.parse().map_err(|e| format!("{e}"))?;
        let controller: Controller = controller.parse().map_err(|e| format!("{e}"))?;
        self.dispatch(BridgeEvent::SeatSelected { color, controller })
    }

    fn push(&mut self, payload: &str) -> Result<String, String> {
        let raw = if payload.starts_with('{') {
            RawMessage::Json(payload.to_string())
        } else {
            let (name, text) = payload
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: push <event> <payload> | push <json>".to_string())?;
            RawMessage::channel(name, text.trim())
        };
        let event = raw.parse().map_err(|e| e.to_string())?;
        self.dispatch(BridgeEvent::Push(event))
    }

    fn dispatch(&mut self, event: BridgeEvent) -> Result<String, String> {
        self.bridge.dispatch(event).map_err(|e| e.to_string())?;
        if self.auto_settle {
            self.settle()?;
        }
        Ok(String::new())
    }

    /// Wait out and run everything queued on the session clock.
    fn settle(&mut self) -> Result<(), String> {
        while let Some(due) = self.bridge.scheduler().next_due() {
            let wait = due.saturating_sub(self.bridge.scheduler().now());
            if wait > Duration::ZERO {
                debug!(?wait, "Waiting for deferred work");
                std::thread::sleep(wait);
            }
            self.bridge.advance(wait).map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    fn status(&self) -> String {
        let bridge = &self.bridge;
        let size = bridge.board().size();
        let mut lines = vec![
            bridge.status_line(),
            bridge.view().to_string(),
            board_context(bridge.turn().len(), size),
        ];
        if let Some(last) = bridge.turn().last_move() {
            lines.push(format!("last: {}", last.log_line(size)));
        }
        lines.join("\n")
    }
}

/// Split off the command word, returning it and the rest of the line.
fn split_command(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(line.split_once(char::is_whitespace).unwrap_or((line, "")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendRequest, RecordingBackend};

    fn console() -> Console<RecordingBackend> {
        Console::new(RecordingBackend::new(), BridgeConfig::default().without_delays())
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = Console::<RecordingBackend>::parse_id("123 status");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "status");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = Console::<RecordingBackend>::parse_id("status");
        assert_eq!(id, None);
        assert_eq!(cmd, "status");
    }

    #[test]
    fn test_split_command() {
        assert_eq!(
            split_command("push ai_best_move AI (B) will not play"),
            Some(("push", "ai_best_move AI (B) will not play"))
        );
        assert_eq!(split_command("undo"), Some(("undo", "")));
        assert_eq!(split_command("   "), None);
    }

    #[test]
    fn test_known_command() {
        let mut console = console();
        assert_eq!(console.execute("known_command", "seat"), (true, "true".into()));
        assert_eq!(console.execute("known_command", "genmove"), (true, "false".into()));
        assert!(!console.execute("known_command", "").0);
    }

    #[test]
    fn test_play_and_undo() {
        let mut console = console();
        assert!(console.execute("play", "D5").0);
        assert!(console.execute("undo", "").0);
        assert_eq!(
            console.bridge().backend().requests,
            vec![
                BackendRequest::Log("BLACK played D5".into()),
                BackendRequest::Undo("BLACK undone D5".into()),
            ]
        );
        assert_eq!(console.bridge().current_turn(), Color::Black);
    }

    #[test]
    fn test_bad_input_is_rejected() {
        let mut console = console();
        assert!(!console.execute("play", "Z99").0);
        assert!(!console.execute("play", "").0);
        assert!(!console.execute("seat", "black").0);
        assert!(!console.execute("seat", "green ai").0);
        assert!(!console.execute("boardsize", "40").0);
        assert!(!console.execute("push", "chat hello").0);
        assert!(!console.execute("frobnicate", "").0);
    }

    #[test]
    fn test_push_plays_for_ai_seat() {
        let mut console = console();
        assert!(console.execute("seat", "white ai").0);
        assert!(console.execute("play", "C3").0);
        assert_eq!(console.bridge().backend().analysis_requests(), 1);

        let (ok, _) = console.execute("push", "ai_best_move AI (W) will play: G7 (48.0% Black win)");
        assert!(ok);
        assert_eq!(
            console.bridge().backend().log_bodies(),
            vec!["BLACK played C3", "ANALYSIS_REQUEST", "WHITE played G7"]
        );
        assert_eq!(console.bridge().current_turn(), Color::Black);
    }

    #[test]
    fn test_push_json_winrate() {
        let mut console = console();
        assert!(console.execute("push", r#"{"event":"winrate_update","winrate":61.0}"#).0);
        let (_, status) = console.execute("status", "");
        assert!(status.contains("Black 61.0% | White 39.0%"), "{status}");
    }

    #[test]
    fn test_manual_settle() {
        let mut console = console().manual_settle();
        console.execute("seat", "white ai");
        console.execute("play", "E5");
        assert_eq!(console.bridge().backend().analysis_requests(), 0);
        assert!(console.execute("settle", "").0);
        assert_eq!(console.bridge().backend().analysis_requests(), 1);
    }
}
