//! Goban-Pattern: a Go board pattern editor and game replay engine.
//!
//! The editor lets a user paint stones onto a board with one of several
//! brushes, with a staging board for in-progress drags and a linear
//! undo/redo history. Finished patterns are sent to a search service;
//! games that come back are browsed move by move through a shared replay
//! cache.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions, cache and search parameters
//! - [`board`] - Board positions, stone signs and vertices
//! - [`rules`] - Move legality and captures
//! - [`diff`] - Committed vs. staged board for rendering
//! - [`history`] - Linear undo/redo stack
//! - [`editor`] - The pattern editor state machine
//! - [`hover`] - Ghost-stone preview on read-only boards
//! - [`lru`] - Least-recently-used cache
//! - [`replay`] - Board at move `k` of a game, memoized
//! - [`viewer`] - Browsing a selected game
//! - [`notation`] - Pattern and move-list text format (`D4b-Q16w`)
//! - [`search`] - Debounced search worker and message types
//! - [`keys`] - Keyboard shortcuts
//! - [`protocol`] - Line-based command protocol
//! - [`config`] - Runtime settings
//!
//! ## Example
//!
//! ```
//! use goban_pattern::board::{Sign, Vertex};
//! use goban_pattern::editor::EditorState;
//! use goban_pattern::notation::serialize_board;
//!
//! let mut editor = EditorState::new(19);
//! editor.commit_move(Vertex::new(3, 15));
//! editor.commit_move(Vertex::new(15, 3));
//! assert_eq!(editor.board().get(Vertex::new(15, 3)), Sign::White);
//! assert_eq!(serialize_board(editor.board()), "Q16w-D4b");
//!
//! editor.undo();
//! assert_eq!(serialize_board(editor.board()), "D4b");
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod diff;
pub mod editor;
pub mod history;
pub mod hover;
pub mod keys;
pub mod lru;
pub mod notation;
pub mod protocol;
pub mod replay;
pub mod rules;
pub mod search;
pub mod viewer;
