//! Stone placement and capture rules.
//!
//! The editor and the replay cache never resolve captures themselves; they go
//! through the [`RulesEngine`] trait. [`GoRules`] is the default engine: it
//! uses flood-fill liberty counting and forbids suicide. Ko is not checked,
//! since neither a free-form pattern nor a recorded game needs it.

use thiserror::Error;

use crate::board::{BoardPosition, Color, Sign, Vertex};

/// Why a placement was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalMove {
    #[error("illegal move: point not empty")]
    Occupied,
    #[error("illegal move: suicide")]
    Suicide,
    #[error("illegal move: vertex outside the board")]
    OutOfBounds,
}

/// Contract for placing a stone.
///
/// Implementations must be pure: the same inputs always give the same
/// output, and `board` itself is never modified.
pub trait RulesEngine {
    fn apply(
        &self,
        board: &BoardPosition,
        color: Color,
        vertex: Vertex,
    ) -> Result<BoardPosition, IllegalMove>;
}

/// Outcome of a legal placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placed {
    pub board: BoardPosition,
    pub captured: Vec<Vertex>,
}

/// Standard Go capture rules without ko.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoRules;

impl GoRules {
    /// Like [`RulesEngine::apply`], but also reports which stones were taken.
    pub fn apply_with_captures(
        &self,
        board: &BoardPosition,
        color: Color,
        vertex: Vertex,
    ) -> Result<Placed, IllegalMove> {
        if !board.contains(vertex) {
            return Err(IllegalMove::OutOfBounds);
        }
        if !board.get(vertex).is_empty() {
            return Err(IllegalMove::Occupied);
        }

        let mut next = board.clone();
        next.set(vertex, color.into());

        let enemy = Sign::from(color.opposite());
        let mut captured: Vec<Vertex> = Vec::new();
        let adjacent: Vec<Vertex> = next.neighbors(vertex).collect();
        for n in adjacent {
            if next.get(n) == enemy && !captured.contains(&n) && group_liberties(&next, n) == 0 {
                collect_group(&next, n, &mut captured);
            }
        }
        for &v in &captured {
            next.set(v, Sign::Empty);
        }

        if captured.is_empty() && group_liberties(&next, vertex) == 0 {
            return Err(IllegalMove::Suicide);
        }
        Ok(Placed { board: next, captured })
    }
}

impl RulesEngine for GoRules {
    fn apply(
        &self,
        board: &BoardPosition,
        color: Color,
        vertex: Vertex,
    ) -> Result<BoardPosition, IllegalMove> {
        self.apply_with_captures(board, color, vertex)
            .map(|placed| placed.board)
    }
}

/// Append every stone connected to `start` (same color) to `out`.
fn collect_group(board: &BoardPosition, start: Vertex, out: &mut Vec<Vertex>) -> usize {
    let color = board.get(start);
    let size = board.size();
    let mut stack = vec![start];
    let mut visited = vec![false; size * size];
    let mut count = 0;

    while let Some(v) = stack.pop() {
        let i = v.y * size + v.x;
        if visited[i] {
            continue;
        }
        visited[i] = true;
        if board.get(v) == color {
            out.push(v);
            count += 1;
            for n in board.neighbors(v) {
                if !visited[n.y * size + n.x] && board.get(n) == color {
                    stack.push(n);
                }
            }
        }
    }
    count
}

/// Count distinct empty points adjacent to the group at `start`.
fn group_liberties(board: &BoardPosition, start: Vertex) -> usize {
    let color = board.get(start);
    if color.is_empty() {
        return 0;
    }
    let size = board.size();
    let mut stack = vec![start];
    let mut visited = vec![false; size * size];
    let mut liberty_seen = vec![false; size * size];
    let mut libs = 0;

    while let Some(v) = stack.pop() {
        let i = v.y * size + v.x;
        if visited[i] {
            continue;
        }
        visited[i] = true;
        for n in board.neighbors(v) {
            let ni = n.y * size + n.x;
            match board.get(n) {
                Sign::Empty => {
                    if !liberty_seen[ni] {
                        liberty_seen[ni] = true;
                        libs += 1;
                    }
                }
                s if s == color && !visited[ni] => stack.push(n),
                _ => {}
            }
        }
    }
    libs
}
