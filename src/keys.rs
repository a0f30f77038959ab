//! Keyboard shortcuts.
//!
//! The same arrows mean different things depending on what has focus: while
//! editing, left/right are undo/redo; while a game is selected they step
//! through its moves. Up/down move through the result list in both.

/// A key press as delivered by the front end.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Char { c: char, ctrl: bool },
}

/// Which board currently receives keys.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Focus {
    Editor,
    Viewer,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Undo,
    Redo,
    PrevMove,
    NextMove,
    PrevGame,
    NextGame,
}

pub fn map_key(focus: Focus, key: Key) -> Option<Command> {
    let undo = matches!(key, Key::Left | Key::Char { c: 'z' | 'Z', ctrl: true });
    let redo = matches!(key, Key::Right | Key::Char { c: 'y' | 'Y', ctrl: true });
    match (focus, key) {
        (_, Key::Up) => Some(Command::PrevGame),
        (_, Key::Down) => Some(Command::NextGame),
        (Focus::Editor, _) if undo => Some(Command::Undo),
        (Focus::Editor, _) if redo => Some(Command::Redo),
        (Focus::Viewer, Key::Left) => Some(Command::PrevMove),
        (Focus::Viewer, Key::Right) => Some(Command::NextMove),
        _ => None,
    }
}

/// Index of the game to select after `command`, given the current selection
/// and the number of results. `None` means the selection does not change.
pub fn step_selection(command: Command, current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match (command, current) {
        (Command::NextGame, None) => Some(0),
        (Command::NextGame, Some(i)) if i + 1 < len => Some(i + 1),
        (Command::PrevGame, Some(i)) if i > 0 => Some(i - 1),
        _ => None,
    }
}
