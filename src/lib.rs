//! goban-bridge: move and turn coordination between a Go board and an
//! analysis backend.
//!
//! A session sits between a board library that renders and validates moves
//! and a backend that logs the game and suggests moves for AI-controlled
//! seats. It relays every move exactly once, tracks whose turn it is and who
//! plays each color, asks for analysis when the AI is to move, and plays the
//! suggestion that comes back.
//!
//! ## Modules
//!
//! - [`coord`] - Conversion between board coordinates and Go notation
//! - [`moves`] - Colors, moves and the backend's log lines
//! - [`seats`] - Turn state and human/AI seat assignment
//! - [`board`] - The board-library boundary and an in-memory board
//! - [`backend`] - Requests to the backend and the transports that send them
//! - [`events`] - Messages pushed by the backend
//! - [`ai`] - The AI turn trigger
//! - [`hint`] - Win-rate bar and hint panel
//! - [`bridge`] - The session itself
//! - [`console`] - Line-oriented console for driving a session
//! - [`advisor`] - In-process stand-in backend used by the demo
//!
//! ## Example
//!
//! ```
//! use goban_bridge::backend::RecordingBackend;
//! use goban_bridge::board::Board;
//! use goban_bridge::bridge::{Bridge, BridgeEvent};
//! use goban_bridge::config::BridgeConfig;
//! use goban_bridge::coord::from_go_notation;
//!
//! let config = BridgeConfig::default().without_delays();
//! let mut bridge = Bridge::new(Board::new(9), RecordingBackend::new(), config);
//!
//! let vertex = from_go_notation("D5", 9).unwrap();
//! bridge.dispatch(BridgeEvent::HumanMove(vertex)).unwrap();
//! assert_eq!(bridge.backend().log_bodies(), vec!["BLACK played D5"]);
//! ```

pub mod advisor;
pub mod ai;
pub mod backend;
pub mod board;
pub mod bridge;
pub mod config;
pub mod console;
pub mod constants;
pub mod coord;
pub mod error;
pub mod events;
pub mod hint;
pub mod moves;
pub mod seats;
