//! Board positions as plain values.
//!
//! A [`BoardPosition`] is a square, row-major matrix of [`Sign`]s. It carries
//! no game logic; capture handling lives in [`crate::rules`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Occupancy of a single vertex.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Sign {
    #[default]
    Empty,
    Black,
    White,
}

impl Sign {
    /// The stone color at this vertex, if any.
    pub fn color(self) -> Option<Color> {
        match self {
            Sign::Empty => None,
            Sign::Black => Some(Color::Black),
            Sign::White => Some(Color::White),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Sign::Empty
    }
}

/// Stone color of a move. Never empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl From<Color> for Sign {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Sign::Black,
            Color::White => Sign::White,
        }
    }
}

/// A board coordinate, 0-indexed from the top-left corner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Vertex {
    pub x: usize,
    pub y: usize,
}

impl Vertex {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for Vertex {
    fn from((x, y): (usize, usize)) -> Self {
        Vertex { x, y }
    }
}

/// A stone of a given color at a vertex. Used both for game moves and for
/// the placements sent to the search service.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub color: Color,
    pub point: Vertex,
}

impl Placement {
    pub const fn new(color: Color, point: Vertex) -> Self {
        Self { color, point }
    }
}

/// A square matrix of signs.
///
/// The size is fixed when the position is created; every operation that
/// produces a new position keeps it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BoardPosition {
    size: usize,
    cells: Vec<Sign>,
}

impl BoardPosition {
    /// An all-empty board of `size` x `size`.
    pub fn empty(size: usize) -> Self {
        Self {
            size,
            cells: vec![Sign::Empty; size * size],
        }
    }

    /// Build a board from rows of signs. Returns `None` unless the rows form
    /// a square.
    pub fn from_rows(rows: Vec<Vec<Sign>>) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return None;
        }
        Some(Self {
            size,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn idx(&self, v: Vertex) -> usize {
        v.y * self.size + v.x
    }

    pub fn contains(&self, v: Vertex) -> bool {
        v.x < self.size && v.y < self.size
    }

    /// Sign at `v`. Out-of-bounds vertices read as empty.
    pub fn get(&self, v: Vertex) -> Sign {
        if !self.contains(v) {
            return Sign::Empty;
        }
        self.cells[self.idx(v)]
    }

    /// Set the sign at `v`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, v: Vertex, sign: Sign) {
        if self.contains(v) {
            let i = self.idx(v);
            self.cells[i] = sign;
        }
    }

    /// Copy of this board with `v` set to `sign`.
    pub fn with(&self, v: Vertex, sign: Sign) -> Self {
        let mut next = self.clone();
        next.set(v, sign);
        next
    }

    /// All vertices in row-major order.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        let s = self.size;
        (0..s).flat_map(move |y| (0..s).map(move |x| Vertex { x, y }))
    }

    /// Orthogonal neighbors of `v` that lie on the board.
    pub fn neighbors(&self, v: Vertex) -> impl Iterator<Item = Vertex> + '_ {
        let s = self.size;
        let Vertex { x, y } = v;
        let mut out = Vec::with_capacity(4);
        if x > 0 {
            out.push(Vertex::new(x - 1, y));
        }
        if x + 1 < s {
            out.push(Vertex::new(x + 1, y));
        }
        if y > 0 {
            out.push(Vertex::new(x, y - 1));
        }
        if y + 1 < s {
            out.push(Vertex::new(x, y + 1));
        }
        out.into_iter()
    }

    /// True when no vertex holds a stone.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|s| s.is_empty())
    }

    /// Non-empty vertices as placements, row-major.
    pub fn stones(&self) -> Vec<Placement> {
        self.vertices()
            .filter_map(|v| self.get(v).color().map(|c| Placement::new(c, v)))
            .collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Sign]> {
        self.cells.chunks(self.size.max(1))
    }
}

impl fmt::Debug for BoardPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BoardPosition({}x{})", self.size, self.size)?;
        write!(f, "{self}")
    }
}

impl fmt::Display for BoardPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for sign in row {
                let ch = match sign {
                    Sign::Black => 'X',
                    Sign::White => 'O',
                    Sign::Empty => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
