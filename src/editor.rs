//! Pattern editor: brushes, drag painting, staging, and undo/redo.
//!
//! The editor keeps two boards. The *committed* board is the last confirmed
//! pattern and is what history records. The *staging* board is the
//! committed board plus whatever the pointer is currently doing (a hover
//! preview or a drag in progress). Outside of an interaction the two are
//! equal.
//!
//! Every input is an [`EditorEvent`]; [`EditorState::apply`] runs it to
//! completion synchronously. Stone placement goes through a
//! [`RulesEngine`], so captures show up live while dragging.
//!
//! ```
//! use goban_pattern::board::{Sign, Vertex};
//! use goban_pattern::editor::EditorState;
//!
//! let mut editor = EditorState::new(19);
//! editor.pointer_down(Vertex::new(3, 3));
//! editor.pointer_up();
//! assert_eq!(editor.board().get(Vertex::new(3, 3)), Sign::Black);
//! ```

use tracing::{debug, trace};

use crate::board::{BoardPosition, Color, Sign, Vertex};
use crate::diff::{Diff, diff_with_preview};
use crate::history::{EditorHistory, HistoryEntry};
use crate::rules::{GoRules, RulesEngine};

/// What a pointer gesture paints.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BrushMode {
    /// Alternate colors like real play; clicking a stone cycles its color.
    #[default]
    Alternate,
    Black,
    White,
    Remove,
}

impl BrushMode {
    pub fn name(self) -> &'static str {
        match self {
            BrushMode::Alternate => "alternate",
            BrushMode::Black => "black",
            BrushMode::White => "white",
            BrushMode::Remove => "remove",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "alternate" | "alt" | "a" => Some(BrushMode::Alternate),
            "black" | "b" => Some(BrushMode::Black),
            "white" | "w" => Some(BrushMode::White),
            "remove" | "erase" | "r" => Some(BrushMode::Remove),
            _ => None,
        }
    }
}

/// Inputs to the editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorEvent {
    PointerDown(Vertex),
    PointerEnter(Vertex),
    PointerLeave(Vertex),
    PointerUp,
    SetBrushMode(BrushMode),
    ToggleAlternateColor,
    Undo,
    Redo,
    ClearBoard,
    /// Replace the pattern wholesale, e.g. when loading it from a link.
    SetBoard(BoardPosition),
    /// Click without a drag: pointer down immediately followed by pointer up.
    CommitMove(Vertex),
}

/// State of one editing session.
#[derive(Debug, Clone)]
pub struct EditorState<R: RulesEngine = GoRules> {
    rules: R,
    committed: BoardPosition,
    staging: BoardPosition,
    last_staged_sign: Sign,
    alternate_brush_color: Color,
    brush_mode: BrushMode,
    history: EditorHistory,
    is_pointer_down: bool,
}

impl EditorState<GoRules> {
    /// Empty `size` x `size` board with the default Go rules.
    pub fn new(size: usize) -> Self {
        Self::with_rules(size, GoRules)
    }
}

impl<R: RulesEngine> EditorState<R> {
    pub fn with_rules(size: usize, rules: R) -> Self {
        let empty = BoardPosition::empty(size);
        Self {
            rules,
            committed: empty.clone(),
            staging: empty.clone(),
            last_staged_sign: Sign::Empty,
            alternate_brush_color: Color::Black,
            brush_mode: BrushMode::Alternate,
            history: EditorHistory::new(empty),
            is_pointer_down: false,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The committed board.
    pub fn board(&self) -> &BoardPosition {
        &self.committed
    }

    pub fn staging_board(&self) -> &BoardPosition {
        &self.staging
    }

    pub fn size(&self) -> usize {
        self.committed.size()
    }

    pub fn brush_mode(&self) -> BrushMode {
        self.brush_mode
    }

    pub fn alternate_brush_color(&self) -> Color {
        self.alternate_brush_color
    }

    pub fn last_staged_sign(&self) -> Sign {
        self.last_staged_sign
    }

    pub fn is_pointer_down(&self) -> bool {
        self.is_pointer_down
    }

    pub fn history(&self) -> &EditorHistory {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Color of the next stone as far as the search is concerned.
    pub fn brush_color(&self) -> Color {
        match self.brush_mode {
            BrushMode::Alternate | BrushMode::Remove => self.alternate_brush_color,
            BrushMode::Black => Color::Black,
            BrushMode::White => Color::White,
        }
    }

    /// What the renderer should draw, with an optional suggested next move
    /// shown in the current brush color.
    pub fn display(&self, preview: Option<Vertex>) -> Diff {
        let preview = preview.map(|v| (v, self.brush_color()));
        diff_with_preview(&self.committed, &self.staging, preview)
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Run one event. Returns `true` when the committed board changed.
    pub fn apply(&mut self, event: EditorEvent) -> bool {
        let before = self.committed.clone();
        match event {
            EditorEvent::PointerDown(v) => {
                // Re-clicking a stone in alternate mode cycles its color, so
                // the change has to be staged before the drag starts.
                if self.brush_mode == BrushMode::Alternate {
                    self.stage_change(v);
                }
                self.is_pointer_down = true;
            }
            EditorEvent::PointerEnter(v) => self.stage_change(v),
            EditorEvent::PointerLeave(_) => {
                if !self.is_pointer_down {
                    self.staging = self.committed.clone();
                }
            }
            EditorEvent::PointerUp => self.commit_staging(),
            EditorEvent::SetBrushMode(mode) => self.brush_mode = mode,
            EditorEvent::ToggleAlternateColor => {
                self.alternate_brush_color = self.alternate_brush_color.opposite();
            }
            EditorEvent::Undo => self.undo_step(),
            EditorEvent::Redo => self.redo_step(),
            EditorEvent::ClearBoard => self.clear(),
            EditorEvent::SetBoard(board) => self.load(board),
            EditorEvent::CommitMove(v) => {
                self.apply(EditorEvent::PointerDown(v));
                self.apply(EditorEvent::PointerUp);
            }
        }
        self.committed != before
    }

    /// Value-style transition: consume the state and return the next one.
    pub fn transition(mut self, event: EditorEvent) -> Self {
        self.apply(event);
        self
    }

    pub fn pointer_down(&mut self, v: Vertex) {
        self.apply(EditorEvent::PointerDown(v));
    }

    pub fn pointer_enter(&mut self, v: Vertex) {
        self.apply(EditorEvent::PointerEnter(v));
    }

    pub fn pointer_leave(&mut self, v: Vertex) {
        self.apply(EditorEvent::PointerLeave(v));
    }

    pub fn pointer_up(&mut self) -> bool {
        self.apply(EditorEvent::PointerUp)
    }

    pub fn set_brush_mode(&mut self, mode: BrushMode) {
        self.apply(EditorEvent::SetBrushMode(mode));
    }

    pub fn toggle_alternate_color(&mut self) {
        self.apply(EditorEvent::ToggleAlternateColor);
    }

    pub fn undo(&mut self) -> bool {
        self.apply(EditorEvent::Undo)
    }

    pub fn redo(&mut self) -> bool {
        self.apply(EditorEvent::Redo)
    }

    pub fn clear_board(&mut self) -> bool {
        self.apply(EditorEvent::ClearBoard)
    }

    pub fn set_board(&mut self, board: BoardPosition) {
        self.apply(EditorEvent::SetBoard(board));
    }

    pub fn commit_move(&mut self, v: Vertex) -> bool {
        self.apply(EditorEvent::CommitMove(v))
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn next_sign(&self, stone: Sign) -> Sign {
        match self.brush_mode {
            BrushMode::Remove => Sign::Empty,
            BrushMode::Black => Sign::Black,
            BrushMode::White => Sign::White,
            BrushMode::Alternate if self.is_pointer_down => self.last_staged_sign,
            BrushMode::Alternate => match stone {
                Sign::Empty => self.alternate_brush_color.into(),
                Sign::Black => Sign::White,
                Sign::White => Sign::Black,
            },
        }
    }

    fn stage_change(&mut self, v: Vertex) {
        let stone = self.committed.get(v);
        let next = self.next_sign(stone);

        match next.color() {
            None => self.staging.set(v, Sign::Empty),
            Some(color) => {
                let cycling = self.brush_mode == BrushMode::Alternate
                    && !self.is_pointer_down
                    && !stone.is_empty();
                let base = if cycling {
                    self.staging.with(v, Sign::Empty)
                } else {
                    self.staging.clone()
                };
                match self.rules.apply(&base, color, v) {
                    Ok(board) => self.staging = board,
                    Err(err) => trace!(?v, ?color, %err, "stage skipped"),
                }
            }
        }
        self.last_staged_sign = next;
    }

    fn commit_staging(&mut self) {
        self.is_pointer_down = false;
        if self.staging == self.committed {
            return;
        }
        self.committed = self.staging.clone();
        let move_sign = self.last_staged_sign;
        self.history
            .commit(HistoryEntry::new(self.committed.clone(), move_sign));
        if let Some(color) = move_sign.color() {
            self.alternate_brush_color = color.opposite();
        }
        debug!(
            index = self.history.index(),
            ?move_sign,
            "committed edit"
        );
    }

    fn undo_step(&mut self) {
        let Some((left, now)) = self.history.step_back() else {
            return;
        };
        let left_sign = left.move_sign;
        let board = now.board.clone();
        if let Some(color) = left_sign.color() {
            self.alternate_brush_color = color;
        }
        self.committed = board.clone();
        self.staging = board;
        debug!(index = self.history.index(), "undo");
    }

    fn redo_step(&mut self) {
        let Some(entry) = self.history.step_forward() else {
            return;
        };
        let move_sign = entry.move_sign;
        let board = entry.board.clone();
        if let Some(color) = move_sign.color() {
            self.alternate_brush_color = color.opposite();
        }
        self.committed = board.clone();
        self.staging = board;
        debug!(index = self.history.index(), "redo");
    }

    fn clear(&mut self) {
        let empty = BoardPosition::empty(self.size());
        self.history.commit(HistoryEntry::new(
            empty.clone(),
            self.alternate_brush_color.into(),
        ));
        self.committed = empty.clone();
        self.staging = empty;
        self.alternate_brush_color = Color::Black;
        debug!(index = self.history.index(), "cleared board");
    }

    fn load(&mut self, board: BoardPosition) {
        self.history.reset(board.clone());
        self.committed = board.clone();
        self.staging = board;
        self.alternate_brush_color = Color::Black;
        debug!(stones = self.committed.stones().len(), "loaded board");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: usize, y: usize) -> Vertex {
        Vertex::new(x, y)
    }

    fn click(editor: &mut EditorState, at: Vertex) -> bool {
        editor.pointer_down(at);
        editor.pointer_up()
    }

    #[test]
    fn test_initial_state() {
        let editor = EditorState::new(19);
        assert!(editor.board().is_empty());
        assert_eq!(editor.history().len(), 1);
        assert_eq!(editor.brush_mode(), BrushMode::Alternate);
        assert_eq!(editor.alternate_brush_color(), Color::Black);
        assert!(!editor.can_undo());
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_click_cycle_and_undo() {
        let mut editor = EditorState::new(19);

        assert!(click(&mut editor, v(3, 3)));
        assert_eq!(editor.board().get(v(3, 3)), Sign::Black);
        assert_eq!(editor.alternate_brush_color(), Color::White);
        assert_eq!(editor.history().len(), 2);

        assert!(click(&mut editor, v(3, 3)));
        assert_eq!(editor.board().get(v(3, 3)), Sign::White);
        assert_eq!(editor.alternate_brush_color(), Color::Black);
        assert_eq!(editor.history().len(), 3);

        assert!(editor.undo());
        assert_eq!(editor.board().get(v(3, 3)), Sign::Black);
        assert_eq!(editor.history().index(), 1);
        assert_eq!(editor.alternate_brush_color(), Color::White);
    }

    #[test]
    fn test_cycle_white_back_to_black() {
        let mut editor = EditorState::new(9);
        editor.set_brush_mode(BrushMode::White);
        editor.pointer_enter(v(4, 4));
        click(&mut editor, v(4, 4));
        assert_eq!(editor.board().get(v(4, 4)), Sign::White);

        editor.set_brush_mode(BrushMode::Alternate);
        click(&mut editor, v(4, 4));
        assert_eq!(editor.board().get(v(4, 4)), Sign::Black);
    }

    #[test]
    fn test_alternate_turns() {
        let mut editor = EditorState::new(19);
        click(&mut editor, v(3, 3));
        click(&mut editor, v(15, 15));
        click(&mut editor, v(3, 15));
        assert_eq!(editor.board().get(v(3, 3)), Sign::Black);
        assert_eq!(editor.board().get(v(15, 15)), Sign::White);
        assert_eq!(editor.board().get(v(3, 15)), Sign::Black);
        assert_eq!(editor.alternate_brush_color(), Color::White);
    }

    #[test]
    fn test_fixed_color_drag_paints_every_vertex() {
        let mut editor = EditorState::new(19);
        editor.set_brush_mode(BrushMode::Black);
        editor.pointer_enter(v(0, 0));
        editor.pointer_down(v(0, 0));
        editor.pointer_enter(v(1, 0));
        editor.pointer_enter(v(2, 0));
        assert!(editor.board().is_empty(), "nothing committed mid-drag");
        assert!(editor.pointer_up());

        for x in 0..3 {
            assert_eq!(editor.board().get(v(x, 0)), Sign::Black);
        }
        assert_eq!(editor.history().len(), 2);
        assert_eq!(editor.alternate_brush_color(), Color::White);
    }

    #[test]
    fn test_alternate_drag_keeps_first_color() {
        let mut editor = EditorState::new(19);
        click(&mut editor, v(10, 10));
        // Next alternate color is White; a drag keeps painting White.
        editor.pointer_down(v(0, 0));
        editor.pointer_enter(v(1, 0));
        editor.pointer_enter(v(2, 0));
        editor.pointer_up();
        for x in 0..3 {
            assert_eq!(editor.board().get(v(x, 0)), Sign::White);
        }
    }

    #[test]
    fn test_suicide_stage_is_ignored() {
        let mut editor = EditorState::new(19);
        let corner = BoardPosition::empty(19)
            .with(v(1, 0), Sign::Black)
            .with(v(0, 1), Sign::Black);
        editor.set_board(corner.clone());
        editor.set_brush_mode(BrushMode::White);

        editor.pointer_enter(v(0, 0));
        assert_eq!(editor.staging_board(), &corner);
        editor.pointer_down(v(0, 0));
        assert!(!editor.pointer_up());
        assert_eq!(editor.board(), &corner);
        assert_eq!(editor.history().len(), 1);

        // Dragging across the point keeps the rest of the stroke.
        editor.pointer_enter(v(2, 2));
        editor.pointer_down(v(2, 2));
        editor.pointer_enter(v(0, 0));
        assert_eq!(editor.staging_board().get(v(0, 0)), Sign::Empty);
        assert!(editor.pointer_up());
        assert_eq!(editor.board().get(v(0, 0)), Sign::Empty);
        assert_eq!(editor.board().get(v(2, 2)), Sign::White);
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_drag_over_occupied_vertex_is_skipped() {
        let mut editor = EditorState::new(19);
        click(&mut editor, v(1, 0));

        editor.set_brush_mode(BrushMode::White);
        editor.pointer_enter(v(0, 0));
        editor.pointer_down(v(0, 0));
        editor.pointer_enter(v(1, 0));
        editor.pointer_enter(v(2, 0));
        editor.pointer_up();

        assert_eq!(editor.board().get(v(0, 0)), Sign::White);
        assert_eq!(editor.board().get(v(1, 0)), Sign::Black);
        assert_eq!(editor.board().get(v(2, 0)), Sign::White);
    }

    #[test]
    fn test_remove_drag() {
        let mut editor = EditorState::new(19);
        click(&mut editor, v(0, 0));
        click(&mut editor, v(1, 0));
        editor.set_brush_mode(BrushMode::Remove);
        editor.pointer_enter(v(0, 0));
        editor.pointer_down(v(0, 0));
        editor.pointer_enter(v(1, 0));
        editor.pointer_up();
        assert!(editor.board().is_empty());
        assert_eq!(editor.history().current().move_sign, Sign::Empty);
    }

    #[test]
    fn test_noop_gesture_creates_no_history() {
        let mut editor = EditorState::new(19);
        editor.set_brush_mode(BrushMode::Black);
        editor.pointer_enter(v(5, 5));
        click(&mut editor, v(5, 5));
        assert_eq!(editor.history().len(), 2);

        // Same stone again.
        editor.pointer_enter(v(5, 5));
        assert!(!click(&mut editor, v(5, 5)));
        assert_eq!(editor.history().len(), 2);

        // Removing where nothing is.
        editor.set_brush_mode(BrushMode::Remove);
        editor.pointer_enter(v(7, 7));
        assert!(!click(&mut editor, v(7, 7)));
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_hover_preview_is_abandoned_on_leave() {
        let mut editor = EditorState::new(19);
        editor.pointer_enter(v(3, 3));
        assert_eq!(editor.staging_board().get(v(3, 3)), Sign::Black);
        assert_eq!(editor.display(None).dimmed, vec![v(3, 3)]);

        editor.pointer_leave(v(3, 3));
        assert_eq!(editor.staging_board(), editor.board());
        assert!(editor.display(None).dimmed.is_empty());
    }

    #[test]
    fn test_leave_during_drag_keeps_staging() {
        let mut editor = EditorState::new(19);
        editor.set_brush_mode(BrushMode::Black);
        editor.pointer_enter(v(3, 3));
        editor.pointer_down(v(3, 3));
        editor.pointer_leave(v(3, 3));
        assert_eq!(editor.staging_board().get(v(3, 3)), Sign::Black);
    }

    #[test]
    fn test_capture_visible_while_staging() {
        let mut editor = EditorState::new(19);
        editor.set_brush_mode(BrushMode::White);
        editor.pointer_enter(v(1, 1));
        click(&mut editor, v(1, 1));
        editor.set_brush_mode(BrushMode::Black);
        for at in [v(0, 1), v(1, 0), v(2, 1)] {
            editor.pointer_enter(at);
            click(&mut editor, at);
        }

        editor.pointer_enter(v(1, 2));
        assert_eq!(editor.staging_board().get(v(1, 1)), Sign::Empty);
        assert_eq!(editor.board().get(v(1, 1)), Sign::White);
        editor.pointer_down(v(1, 2));
        editor.pointer_up();
        assert_eq!(editor.board().get(v(1, 1)), Sign::Empty);
        assert_eq!(editor.board().get(v(1, 2)), Sign::Black);
    }

    #[test]
    fn test_set_brush_mode_touches_nothing_else() {
        let mut editor = EditorState::new(19);
        click(&mut editor, v(3, 3));
        let board = editor.board().clone();
        let len = editor.history().len();
        assert!(!editor.apply(EditorEvent::SetBrushMode(BrushMode::Remove)));
        assert_eq!(editor.board(), &board);
        assert_eq!(editor.history().len(), len);
    }

    #[test]
    fn test_toggle_alternate_color() {
        let mut editor = EditorState::new(19);
        editor.toggle_alternate_color();
        assert_eq!(editor.alternate_brush_color(), Color::White);
        click(&mut editor, v(3, 3));
        assert_eq!(editor.board().get(v(3, 3)), Sign::White);
        assert_eq!(editor.alternate_brush_color(), Color::Black);
    }

    #[test]
    fn test_brush_color() {
        let mut editor = EditorState::new(19);
        assert_eq!(editor.brush_color(), Color::Black);
        editor.set_brush_mode(BrushMode::White);
        assert_eq!(editor.brush_color(), Color::White);
        editor.set_brush_mode(BrushMode::Remove);
        assert_eq!(editor.brush_color(), Color::Black);
    }

    #[test]
    fn test_redo_restores_color() {
        let mut editor = EditorState::new(19);
        click(&mut editor, v(3, 3));
        editor.undo();
        assert_eq!(editor.alternate_brush_color(), Color::Black);
        editor.redo();
        assert_eq!(editor.alternate_brush_color(), Color::White);
        assert_eq!(editor.board().get(v(3, 3)), Sign::Black);
        assert!(!editor.redo());
    }

    #[test]
    fn test_undo_at_start_is_noop() {
        let mut editor = EditorState::new(19);
        assert!(!editor.undo());
        assert_eq!(editor.history().index(), 0);
    }

    #[test]
    fn test_clear_board() {
        let mut editor = EditorState::new(19);
        click(&mut editor, v(3, 3));
        assert_eq!(editor.alternate_brush_color(), Color::White);

        assert!(editor.clear_board());
        assert!(editor.board().is_empty());
        assert_eq!(editor.alternate_brush_color(), Color::Black);
        assert_eq!(editor.history().len(), 3);
        assert_eq!(editor.history().current().move_sign, Sign::White);

        editor.undo();
        assert_eq!(editor.board().get(v(3, 3)), Sign::Black);
        assert_eq!(editor.alternate_brush_color(), Color::White);
    }

    #[test]
    fn test_set_board_resets_history() {
        let mut editor = EditorState::new(19);
        click(&mut editor, v(3, 3));
        click(&mut editor, v(4, 4));
        let loaded = BoardPosition::empty(19).with(v(10, 10), Sign::White);
        editor.set_board(loaded.clone());
        assert_eq!(editor.board(), &loaded);
        assert_eq!(editor.staging_board(), &loaded);
        assert_eq!(editor.history().len(), 1);
        assert!(!editor.can_undo());
        assert_eq!(editor.alternate_brush_color(), Color::Black);
    }

    #[test]
    fn test_commit_move() {
        let mut editor = EditorState::new(19);
        assert!(editor.commit_move(v(16, 3)));
        assert_eq!(editor.board().get(v(16, 3)), Sign::Black);
        assert!(!editor.is_pointer_down());
    }

    #[test]
    fn test_transition_by_value() {
        let editor = EditorState::new(9)
            .transition(EditorEvent::PointerDown(v(2, 2)))
            .transition(EditorEvent::PointerUp);
        assert_eq!(editor.board().get(v(2, 2)), Sign::Black);
    }

    #[test]
    fn test_display_with_preview() {
        let mut editor = EditorState::new(9);
        click(&mut editor, v(0, 0));
        let frame = editor.display(Some(v(4, 4)));
        assert_eq!(frame.display.get(v(4, 4)), Sign::White);
        assert_eq!(frame.dimmed, vec![v(4, 4)]);
    }
}
