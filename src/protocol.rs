//! Line-based command protocol for driving an editor session.
//!
//! The format follows GTP conventions: each line is an optional numeric id,
//! a command, and arguments. Successful responses start with `=`, failures
//! with `?`, and every response ends with a blank line. Vertices use Go
//! coordinates (`D4`).
//!
//! ## Commands
//!
//! - `name`, `version`, `list_commands`, `known_command <cmd>`, `quit`
//! - `down <v>`, `enter <v>`, `leave <v>`, `up` - raw pointer events
//! - `click <v>` - hover, press and release at `v`
//! - `brush alternate|black|white|remove`, `toggle_color`
//! - `undo`, `redo`, `clear_board`
//! - `load [pattern]`, `pattern` - read or write the pattern (`D4b-Q16w`)
//! - `showboard`, `history`
//! - `search_request` - the search message for the current pattern, as JSON
//! - `replay <moves> <k>` - board after move `k` of a move list
//!
//! ## Example
//!
//! ```
//! use goban_pattern::protocol::Session;
//!
//! let mut session = Session::new(19);
//! let mut out = Vec::new();
//! session.run("click D4\npattern\n".as_bytes(), &mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().contains("= D4b"));
//! ```

use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::debug;

use crate::board::Vertex;
use crate::editor::{BrushMode, EditorEvent, EditorState};
use crate::notation::{deserialize_board, parse_moves, parse_vertex, serialize_board};
use crate::replay;
use crate::search::SearchRequest;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "brush",
    "clear_board",
    "click",
    "down",
    "enter",
    "history",
    "known_command",
    "leave",
    "list_commands",
    "load",
    "name",
    "pattern",
    "quit",
    "redo",
    "replay",
    "search_request",
    "showboard",
    "toggle_color",
    "undo",
    "up",
    "version",
];

/// One editor driven by text commands.
pub struct Session {
    editor: EditorState,
}

impl Session {
    pub fn new(size: usize) -> Self {
        Self {
            editor: EditorState::new(size),
        }
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    /// Read commands from `input` until it ends or `quit`, writing one
    /// response per command to `output`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let args = &parts[1..];
            let (success, message) = self.execute(&command, args);

            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

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
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    fn vertex_arg(&self, args: &[&str]) -> Result<Vertex, String> {
        let arg = args.first().ok_or_else(|| "missing argument".to_string())?;
        parse_vertex(arg, self.editor.size()).map_err(|e| e.to_string())
    }

    fn pointer(&mut self, args: &[&str], event: fn(Vertex) -> EditorEvent) -> (bool, String) {
        match self.vertex_arg(args) {
            Ok(v) => {
                self.editor.apply(event(v));
                (true, String::new())
            }
            Err(e) => (false, e),
        }
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        debug!(command, ?args, "execute");
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let known = KNOWN_COMMANDS.contains(&args[0].to_lowercase().as_str());
                (true, if known { "true" } else { "false" }.to_string())
            }

            "quit" => (true, String::new()),

            "down" => self.pointer(args, EditorEvent::PointerDown),
            "enter" => self.pointer(args, EditorEvent::PointerEnter),
            "leave" => self.pointer(args, EditorEvent::PointerLeave),
            "click" => match self.vertex_arg(args) {
                Ok(v) => {
                    self.editor.pointer_enter(v);
                    self.editor.commit_move(v);
                    (true, String::new())
                }
                Err(e) => (false, e),
            },

            "up" => {
                self.editor.apply(EditorEvent::PointerUp);
                (true, String::new())
            }

            "brush" => {
                let Some(arg) = args.first() else {
                    return (true, self.editor.brush_mode().name().to_string());
                };
                match BrushMode::parse(arg) {
                    Some(mode) => {
                        self.editor.set_brush_mode(mode);
                        (true, String::new())
                    }
                    None => (false, format!("unknown brush mode: {arg}")),
                }
            }

            "toggle_color" => {
                self.editor.toggle_alternate_color();
                (true, format!("{:?}", self.editor.alternate_brush_color()).to_lowercase())
            }

            "undo" => {
                if !self.editor.can_undo() {
                    return (false, "nothing to undo".to_string());
                }
                self.editor.undo();
                (true, String::new())
            }

            "redo" => {
                if !self.editor.can_redo() {
                    return (false, "nothing to redo".to_string());
                }
                self.editor.redo();
                (true, String::new())
            }

            "clear_board" => {
                self.editor.clear_board();
                (true, String::new())
            }

            "load" => {
                let pattern = args.first().copied().unwrap_or("");
                let board = deserialize_board(pattern, self.editor.size());
                self.editor.set_board(board);
                (true, String::new())
            }

            "pattern" => (true, serialize_board(self.editor.board())),

            "showboard" => {
                let frame = self.editor.display(None);
                (true, format!("\n{}", frame.display))
            }

            "history" => {
                let h = self.editor.history();
                (true, format!("{} {}", h.index(), h.len()))
            }

            "search_request" => {
                let request = SearchRequest::new(self.editor.board(), self.editor.brush_color());
                match serde_json::to_string(&request) {
                    Ok(json) => (true, json),
                    Err(e) => (false, e.to_string()),
                }
            }

            "replay" => {
                if args.len() < 2 {
                    return (false, "missing arguments".to_string());
                }
                let size = self.editor.size();
                let moves = match parse_moves(args[0], size) {
                    Ok(m) => m,
                    Err(e) => return (false, e.to_string()),
                };
                let k = match args[1].parse::<isize>() {
                    Ok(k) => k,
                    Err(_) => return (false, "invalid move number".to_string()),
                };
                let board = if size == replay::global().board_size() {
                    replay::board_at(&moves, k)
                } else {
                    replay::replay(&crate::rules::GoRules, size, &moves, k)
                };
                (true, format!("\n{board}"))
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}
