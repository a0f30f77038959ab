//! Default geometry and tuning values.
//!
//! These are the defaults that [`crate::config::Config`] starts from before
//! environment variables and command-line flags are applied.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN) used by the pattern editor and the game viewer.
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Go column letters. `I` is skipped to avoid confusion with `J`; boards up
/// to 25x25 can be written down.
pub const COLUMN_LETTERS: &str = "ABCDEFGHJKLMNOPQRSTUVWXYZ";

/// Separator between stones in a serialized pattern (`D4b-Q16w`).
pub const PATTERN_DELIMITER: char = '-';

// =============================================================================
// Replay Cache
// =============================================================================

/// Number of replayed positions kept for one browsing session.
pub const REPLAY_CACHE_CAPACITY: usize = 1000;

// =============================================================================
// Search Channel
// =============================================================================

/// Quiet period after the last board change before a search is sent.
pub const SEARCH_DEBOUNCE_MS: u64 = 500;

/// Number of games requested per result page.
pub const SEARCH_PAGE_SIZE: usize = 40;

/// Capacity of the search actor's game lookup queue.
pub const SEARCH_QUEUE_DEPTH: usize = 64;
