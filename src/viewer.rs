//! Browsing a game returned by the search.
//!
//! A [`Viewer`] holds the selected game and the move being shown. The board
//! comes from a [`ReplayCache`]; a [`HoverPreview`] sits on top of it and is
//! reset every time the shown move changes.

use crate::board::{BoardPosition, Color, Placement, Vertex};
use crate::diff::Diff;
use crate::editor::BrushMode;
use crate::hover::HoverPreview;
use crate::replay::{self, ReplayCache};
use crate::search::Game;

/// Overlay drawn on top of stones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Marker {
    /// Last move played.
    Circle,
    /// Numbered suggestion, e.g. the most common next moves.
    Label(String),
}

/// Row-major marker overlay, same size as the board.
pub type MarkerMap = Vec<Vec<Option<Marker>>>;

pub fn empty_markers(size: usize) -> MarkerMap {
    vec![vec![None; size]; size]
}

/// Markers labelling `points` as `1`, `2`, ... in order.
pub fn numbered_markers(size: usize, points: &[Vertex]) -> MarkerMap {
    let mut markers = empty_markers(size);
    for (i, p) in points.iter().enumerate() {
        if p.x < size && p.y < size {
            markers[p.y][p.x] = Some(Marker::Label((i + 1).to_string()));
        }
    }
    markers
}

/// Everything the board renderer needs for one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub sign_map: BoardPosition,
    pub marker_map: MarkerMap,
    pub dimmed: Vec<Vertex>,
}

/// Clamp a move number for a game with `len` moves. An empty game has only
/// the empty board (`-1`); otherwise the range is `0..len`.
pub fn clamp_move_number(n: isize, len: usize) -> isize {
    if len == 0 {
        return -1;
    }
    n.clamp(0, len as isize - 1)
}

/// A game and the move currently shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSelection {
    pub game: Game,
    pub move_number: isize,
}

impl GameSelection {
    /// Select `game` at the move where the pattern was matched.
    pub fn at_match(game: Game) -> Self {
        let move_number = clamp_move_number(game.last_move_matched as isize, game.moves.len());
        Self { game, move_number }
    }

    pub fn moves(&self) -> &[Placement] {
        &self.game.moves
    }
}

pub struct Viewer<'a> {
    cache: &'a ReplayCache,
    selection: Option<GameSelection>,
    hover: HoverPreview,
}

impl<'a> Viewer<'a> {
    pub fn new(cache: &'a ReplayCache) -> Self {
        Self {
            cache,
            selection: None,
            hover: HoverPreview::new(BoardPosition::empty(cache.board_size())),
        }
    }

    /// Viewer on the process-wide replay cache.
    pub fn with_global_cache() -> Viewer<'static> {
        Viewer::new(replay::global())
    }

    pub fn selection(&self) -> Option<&GameSelection> {
        self.selection.as_ref()
    }

    pub fn move_number(&self) -> isize {
        self.selection.as_ref().map_or(-1, |s| s.move_number)
    }

    pub fn select(&mut self, selection: Option<GameSelection>) {
        self.selection = selection;
        self.refresh();
    }

    pub fn set_move_number(&mut self, n: isize) {
        if let Some(sel) = self.selection.as_mut() {
            sel.move_number = clamp_move_number(n, sel.game.moves.len());
        }
        self.refresh();
    }

    pub fn next_move(&mut self) {
        self.set_move_number(self.move_number() + 1);
    }

    pub fn prev_move(&mut self) {
        self.set_move_number(self.move_number() - 1);
    }

    pub fn first_move(&mut self) {
        self.set_move_number(0);
    }

    pub fn last_move(&mut self) {
        self.set_move_number(isize::MAX);
    }

    /// Board at the shown move.
    pub fn board(&self) -> BoardPosition {
        match &self.selection {
            Some(sel) => self.cache.board_at(sel.moves(), sel.move_number),
            None => BoardPosition::empty(self.cache.board_size()),
        }
    }

    /// Circle on the stone played at the shown move.
    pub fn markers(&self) -> MarkerMap {
        let size = self.cache.board_size();
        let mut markers = empty_markers(size);
        if let Some(sel) = &self.selection {
            // Records can hold off-board moves; replay skips them.
            if let Some(last) = replay::last_move(sel.moves(), sel.move_number)
                .filter(|m| m.point.x < size && m.point.y < size)
            {
                markers[last.point.y][last.point.x] = Some(Marker::Circle);
            }
        }
        markers
    }

    pub fn hover(&self) -> &HoverPreview {
        &self.hover
    }

    pub fn set_hover_mode(&mut self, mode: BrushMode) {
        self.hover.set_brush_mode(mode);
    }

    pub fn pointer_enter(&mut self, v: Vertex) {
        // Ghost stone in the color of the player to move.
        if let Some(next) = self
            .selection
            .as_ref()
            .and_then(|sel| replay::last_move(sel.moves(), sel.move_number))
        {
            self.hover.set_alternate_color(next.color.opposite());
        }
        self.hover.pointer_enter(v);
    }

    pub fn pointer_leave(&mut self, v: Vertex) {
        self.hover.pointer_leave(v);
    }

    pub fn frame(&self) -> Frame {
        let Diff { display, dimmed } = self.hover.display();
        Frame {
            sign_map: display,
            marker_map: self.markers(),
            dimmed,
        }
    }

    fn refresh(&mut self) {
        let board = self.board();
        self.hover.reset(board);
        self.hover.set_alternate_color(Color::Black);
    }
}
