//! Text forms of vertices, patterns, and move lists.
//!
//! Go coordinates use letters for columns (skipping `I`) and numbers for
//! rows, counted from the bottom: on a 19x19 board `A19` is the top-left
//! vertex `(0, 0)` and `T1` is the bottom-right `(18, 18)`.
//!
//! A pattern is the list of its stones, each written `{column}{row}{b|w}`,
//! joined by `-`: `D4b-Q16w`. A game record uses the same tokens in play
//! order.

use thiserror::Error;

use crate::board::{BoardPosition, Color, Placement, Sign, Vertex};
use crate::constants::{COLUMN_LETTERS, PATTERN_DELIMITER};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("bad vertex `{0}`")]
    BadVertex(String),
    #[error("vertex `{0}` is off a {1}x{1} board")]
    OffBoard(String, usize),
    #[error("bad stone color in `{0}`, expected `b` or `w`")]
    BadColor(String),
}

/// Parse a coordinate like `D4` on a `size` board.
pub fn parse_vertex(s: &str, size: usize) -> Result<Vertex, NotationError> {
    let s = s.trim();
    let mut chars = s.chars();
    let col_char = chars
        .next()
        .ok_or_else(|| NotationError::BadVertex(s.to_string()))?
        .to_ascii_uppercase();
    let x = COLUMN_LETTERS
        .find(col_char)
        .ok_or_else(|| NotationError::BadVertex(s.to_string()))?;
    let row: usize = chars
        .as_str()
        .parse()
        .map_err(|_| NotationError::BadVertex(s.to_string()))?;
    if x >= size || row == 0 || row > size {
        return Err(NotationError::OffBoard(s.to_string(), size));
    }
    Ok(Vertex::new(x, size - row))
}

/// Format a vertex as `D4` on a `size` board.
pub fn format_vertex(v: Vertex, size: usize) -> String {
    let col = COLUMN_LETTERS.as_bytes().get(v.x).copied().unwrap_or(b'?') as char;
    format!("{col}{}", size - v.y)
}

/// Parse one `D4b` token.
pub fn parse_placement(token: &str, size: usize) -> Result<Placement, NotationError> {
    let token = token.trim();
    let (coord, color) = match token.char_indices().last() {
        Some((i, c)) if i > 0 => (&token[..i], c),
        _ => return Err(NotationError::BadVertex(token.to_string())),
    };
    let color = match color.to_ascii_lowercase() {
        'b' => Color::Black,
        'w' => Color::White,
        _ => return Err(NotationError::BadColor(token.to_string())),
    };
    Ok(Placement::new(color, parse_vertex(coord, size)?))
}

pub fn format_placement(p: Placement, size: usize) -> String {
    let color = match p.color {
        Color::Black => 'b',
        Color::White => 'w',
    };
    format!("{}{color}", format_vertex(p.point, size))
}

/// Serialize the stones of `board`, row-major.
pub fn serialize_board(board: &BoardPosition) -> String {
    board
        .stones()
        .into_iter()
        .map(|p| format_placement(p, board.size()))
        .collect::<Vec<_>>()
        .join(&PATTERN_DELIMITER.to_string())
}

/// Rebuild a board from [`serialize_board`] output.
///
/// Links get edited by hand, so malformed or off-board tokens are skipped
/// instead of failing the whole pattern. The empty string is the empty
/// board.
pub fn deserialize_board(s: &str, size: usize) -> BoardPosition {
    let mut board = BoardPosition::empty(size);
    for token in s.split(PATTERN_DELIMITER).filter(|t| !t.trim().is_empty()) {
        if let Ok(p) = parse_placement(token, size) {
            board.set(p.point, Sign::from(p.color));
        }
    }
    board
}

/// Parse a move list. Unlike patterns, every token must be valid, since
/// skipping one would shift every later move.
pub fn parse_moves(s: &str, size: usize) -> Result<Vec<Placement>, NotationError> {
    s.split(PATTERN_DELIMITER)
        .filter(|t| !t.trim().is_empty())
        .map(|t| parse_placement(t, size))
        .collect()
}

pub fn format_moves(moves: &[Placement], size: usize) -> String {
    moves
        .iter()
        .map(|&p| format_placement(p, size))
        .collect::<Vec<_>>()
        .join(&PATTERN_DELIMITER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vertex_corners() {
        assert_eq!(parse_vertex("A19", 19), Ok(Vertex::new(0, 0)));
        assert_eq!(parse_vertex("T1", 19), Ok(Vertex::new(18, 18)));
        assert_eq!(parse_vertex("a1", 19), Ok(Vertex::new(0, 18)));
    }

    #[test]
    fn test_parse_vertex_skips_i() {
        assert_eq!(parse_vertex("H10", 19), Ok(Vertex::new(7, 9)));
        assert_eq!(parse_vertex("J10", 19), Ok(Vertex::new(8, 9)));
        assert!(parse_vertex("I10", 19).is_err());
    }

    #[test]
    fn test_parse_vertex_off_board() {
        assert!(matches!(parse_vertex("K5", 9), Err(NotationError::OffBoard(_, 9))));
        assert!(matches!(parse_vertex("A0", 19), Err(NotationError::OffBoard(_, 19))));
        assert!(matches!(parse_vertex("A20", 19), Err(NotationError::OffBoard(_, 19))));
        assert!(matches!(parse_vertex("", 19), Err(NotationError::BadVertex(_))));
        assert!(matches!(parse_vertex("AB", 19), Err(NotationError::BadVertex(_))));
    }

    #[test]
    fn test_vertex_format_inverse() {
        for size in [9, 13, 19] {
            let board = BoardPosition::empty(size);
            for v in board.vertices() {
                let s = format_vertex(v, size);
                assert_eq!(parse_vertex(&s, size), Ok(v), "{s}");
            }
        }
    }

    #[test]
    fn test_serialize_board() {
        let mut board = BoardPosition::empty(19);
        board.set(Vertex::new(3, 15), Sign::Black);
        board.set(Vertex::new(15, 3), Sign::White);
        assert_eq!(serialize_board(&board), "Q16w-D4b");
        assert_eq!(deserialize_board("Q16w-D4b", 19), board);
    }

    #[test]
    fn test_deserialize_empty_and_garbage() {
        assert!(deserialize_board("", 19).is_empty());
        let board = deserialize_board("D4b--Z99w-Q16x-K10w-", 19);
        assert_eq!(board.stones().len(), 2);
        assert_eq!(board.get(Vertex::new(3, 15)), Sign::Black);
        assert_eq!(board.get(Vertex::new(9, 9)), Sign::White);
    }

    #[test]
    fn test_parse_moves_keeps_order() {
        let moves = parse_moves("Q16b-D4w-Q4b", 19).unwrap();
        assert_eq!(moves.len(), 3);
        assert_eq!(moves[0], Placement::new(Color::Black, Vertex::new(15, 3)));
        assert_eq!(moves[1], Placement::new(Color::White, Vertex::new(3, 15)));
        assert_eq!(format_moves(&moves, 19), "Q16b-D4w-Q4b");
    }

    #[test]
    fn test_parse_moves_rejects_bad_token() {
        assert_eq!(
            parse_moves("Q16b-D4x", 19),
            Err(NotationError::BadColor("D4x".to_string()))
        );
        assert!(parse_moves("", 19).unwrap().is_empty());
    }
}
