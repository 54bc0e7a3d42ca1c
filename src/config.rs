//! Session configuration.

use std::time::Duration;

use crate::constants::{DEFAULT_BOARD_SIZE, RENDER_SETTLE_DELAY, UNDO_SETTLE_DELAY};
use crate::coord::{CoordError, check_board_size};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Only set through [`BridgeConfig::with_board_size`], which checks it.
    pub(crate) board_size: usize,
    /// Delay between relaying a move and checking whether the AI is to move.
    pub settle_delay: Duration,
    /// Delay between notifying the backend of an undo and relaying again.
    pub undo_settle_delay: Duration,
    /// Base URL of the backend, e.g. `http://127.0.0.1:5000`. `None` runs offline.
    pub backend_url: Option<String>,
    /// Timeout for a single backend request.
    pub request_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            settle_delay: RENDER_SETTLE_DELAY,
            undo_settle_delay: UNDO_SETTLE_DELAY,
            backend_url: None,
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl BridgeConfig {
    pub fn board_size(&self) -> usize {
        self.board_size
    }

    pub fn with_board_size(mut self, board_size: usize) -> Result<Self, CoordError> {
        self.board_size = check_board_size(board_size)?;
        Ok(self)
    }

    pub fn with_backend_url(mut self, url: Option<String>) -> Self {
        self.backend_url = url;
        self
    }

    /// Settle immediately. Handy for tests and scripted sessions.
    pub fn without_delays(mut self) -> Self {
        self.settle_delay = Duration::ZERO;
        self.undo_settle_delay = Duration::ZERO;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.board_size, 9);
        assert_eq!(config.settle_delay, Duration::from_millis(1000));
        assert_eq!(config.undo_settle_delay, Duration::from_millis(100));
        assert!(config.backend_url.is_none());
    }

    #[test]
    fn test_board_size_is_checked() {
        assert_eq!(BridgeConfig::default().with_board_size(19).unwrap().board_size(), 19);
        assert!(BridgeConfig::default().with_board_size(30).is_err());
        assert!(BridgeConfig::default().with_board_size(1).is_err());
    }
}
