//! Runtime settings.
//!
//! Defaults come from [`crate::constants`]; `GOBAN_*` environment variables
//! override them, and command-line flags override both (see `main.rs`).

use std::env;
use std::time::Duration;

use crate::constants::{
    COLUMN_LETTERS, DEFAULT_BOARD_SIZE, REPLAY_CACHE_CAPACITY, SEARCH_DEBOUNCE_MS,
    SEARCH_PAGE_SIZE,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub board_size: usize,
    pub cache_capacity: usize,
    pub debounce: Duration,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            cache_capacity: REPLAY_CACHE_CAPACITY,
            debounce: Duration::from_millis(SEARCH_DEBOUNCE_MS),
            page_size: SEARCH_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Defaults with environment overrides. Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::default().with_lookup(|name| env::var(name).ok())
    }

    fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).and_then(|v| v.trim().parse::<u64>().ok());
        if let Some(size) = get("GOBAN_BOARD_SIZE") {
            self.board_size = size as usize;
        }
        if let Some(capacity) = get("GOBAN_CACHE_CAPACITY") {
            self.cache_capacity = capacity as usize;
        }
        if let Some(ms) = get("GOBAN_DEBOUNCE_MS") {
            self.debounce = Duration::from_millis(ms);
        }
        if let Some(page_size) = get("GOBAN_PAGE_SIZE") {
            self.page_size = page_size as usize;
        }
        self
    }

    /// Check that the values can actually be used.
    pub fn validate(&self) -> anyhow::Result<()> {
        let max = COLUMN_LETTERS.len();
        anyhow::ensure!(
            (2..=max).contains(&self.board_size),
            "board size must be between 2 and {max}, got {}",
            self.board_size
        );
        anyhow::ensure!(self.cache_capacity > 0, "cache capacity must be positive");
        anyhow::ensure!(self.page_size > 0, "page size must be positive");
        Ok(())
    }
}
