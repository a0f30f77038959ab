//! Committed-vs-staged comparison for the renderer.
//!
//! The renderer only draws one board plus a set of highlighted vertices; it
//! never needs to know about staging.

use crate::board::{BoardPosition, Color, Sign, Vertex};

/// Board to draw plus the vertices that differ from the committed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    pub display: BoardPosition,
    pub dimmed: Vec<Vertex>,
}

/// Merge `staged` over `committed`.
///
/// A vertex is dimmed when the two boards disagree. The displayed sign is the
/// staged stone if there is one, otherwise the committed stone.
pub fn diff(committed: &BoardPosition, staged: &BoardPosition) -> Diff {
    diff_with_preview(committed, staged, None)
}

/// [`diff`] plus an optional suggested stone, which is always shown dimmed.
pub fn diff_with_preview(
    committed: &BoardPosition,
    staged: &BoardPosition,
    preview: Option<(Vertex, Color)>,
) -> Diff {
    debug_assert_eq!(committed.size(), staged.size());
    let mut display = BoardPosition::empty(committed.size());
    let mut dimmed = Vec::new();

    for v in committed.vertices() {
        let board_stone = committed.get(v);
        let staging_stone = staged.get(v);
        if staging_stone != board_stone {
            dimmed.push(v);
        }

        let shown = match preview {
            Some((pv, color)) if pv == v => {
                if staging_stone == board_stone {
                    dimmed.push(v);
                }
                Sign::from(color)
            }
            _ if !staging_stone.is_empty() => staging_stone,
            _ => board_stone,
        };
        display.set(v, shown);
    }

    Diff { display, dimmed }
}
