//! Ghost-stone preview for the game viewer.
//!
//! Hovering a vertex while browsing a game shows where the next stone would
//! go. Nothing here is ever committed and no captures are resolved; the
//! preview is thrown away whenever the viewed position changes.

use crate::board::{BoardPosition, Color, Sign, Vertex};
use crate::diff::{Diff, diff};
use crate::editor::BrushMode;

#[derive(Debug, Clone)]
pub struct HoverPreview {
    current: BoardPosition,
    staging: BoardPosition,
    brush_mode: BrushMode,
    alternate_brush_color: Color,
}

impl HoverPreview {
    pub fn new(board: BoardPosition) -> Self {
        Self {
            staging: board.clone(),
            current: board,
            brush_mode: BrushMode::Alternate,
            alternate_brush_color: Color::Black,
        }
    }

    pub fn board(&self) -> &BoardPosition {
        &self.current
    }

    pub fn staging_board(&self) -> &BoardPosition {
        &self.staging
    }

    pub fn brush_mode(&self) -> BrushMode {
        self.brush_mode
    }

    pub fn set_brush_mode(&mut self, mode: BrushMode) {
        self.brush_mode = mode;
    }

    pub fn set_alternate_color(&mut self, color: Color) {
        self.alternate_brush_color = color;
    }

    /// Replace the viewed position and drop any preview.
    pub fn reset(&mut self, board: BoardPosition) {
        self.staging = board.clone();
        self.current = board;
    }

    fn hover_sign(&self) -> Sign {
        match self.brush_mode {
            BrushMode::Alternate => self.alternate_brush_color.into(),
            BrushMode::Black => Sign::Black,
            BrushMode::White => Sign::White,
            BrushMode::Remove => Sign::Empty,
        }
    }

    pub fn pointer_enter(&mut self, v: Vertex) {
        if self.brush_mode == BrushMode::Remove {
            self.staging = self.current.with(v, Sign::Empty);
        } else if !self.current.get(v).is_empty() {
            self.staging = self.current.clone();
        } else {
            self.staging = self.current.with(v, self.hover_sign());
        }
    }

    pub fn pointer_leave(&mut self, _v: Vertex) {
        self.staging = self.current.clone();
    }

    /// The ghost stone currently shown, if any.
    pub fn ghost(&self) -> Option<(Vertex, Color)> {
        self.current.vertices().find_map(|v| {
            let staged = self.staging.get(v);
            match (self.current.get(v), staged.color()) {
                (Sign::Empty, Some(color)) => Some((v, color)),
                _ => None,
            }
        })
    }

    pub fn display(&self) -> Diff {
        diff(&self.current, &self.staging)
    }
}
