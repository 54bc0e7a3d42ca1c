//! Constants for board geometry, the backend protocol, and timing.
//!
//! Board sizes are chosen at runtime (the backend can switch between 9x9,
//! 13x13 and 19x19 mid-session), so only the limits live here.

use std::time::Duration;

// =============================================================================
// Board Geometry
// =============================================================================

/// Column letters used by Go notation. The letter 'I' is skipped to avoid
/// confusion with 'J'.
pub const COLUMN_LETTERS: &[u8; 25] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

/// Smallest board size the bridge accepts.
pub const MIN_BOARD_SIZE: usize = 2;

/// Largest board size expressible with [`COLUMN_LETTERS`].
pub const MAX_BOARD_SIZE: usize = COLUMN_LETTERS.len();

/// Board size used when a session starts.
pub const DEFAULT_BOARD_SIZE: usize = 9;

// =============================================================================
// Backend Protocol
// =============================================================================

/// Body posted to `/log` to ask the backend for a fresh analysis.
pub const ANALYSIS_REQUEST: &str = "ANALYSIS_REQUEST";

/// Body posted to `/undo` when there is no move to describe.
pub const UNDO_WITHOUT_MOVE: &str = "UNDO requested";

/// Token used for a pass in Go notation.
pub const PASS_TOKEN: &str = "pass";

/// Win rate shown before the backend reports anything.
pub const NEUTRAL_WINRATE: f64 = 50.0;

// =============================================================================
// Timing
// =============================================================================

/// Delay between a relayed move and the AI turn check. Gives the board
/// library time to finish its own state update.
pub const RENDER_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Delay between the backend acknowledging an undo and relaying resuming.
pub const UNDO_SETTLE_DELAY: Duration = Duration::from_millis(100);
