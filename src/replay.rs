//! Rebuilding board positions from recorded games.
//!
//! The viewer asks for "the board after move `k`" over and over while the
//! user scrubs through a game or hovers over result rows. Replaying from
//! scratch each time is O(k) rule applications, so results are memoized in
//! an LRU keyed by the full move prefix. Two games that happen to share an
//! opening get the same key, which is fine: the board only depends on the
//! moves.
//!
//! Indices are 0-based; `-1` means "before the first move". Out-of-range
//! indices are clamped, never rejected.

use std::sync::Mutex;

use once_cell::sync::Lazy;
use tracing::{trace, warn};

use crate::board::{BoardPosition, Placement};
use crate::constants::{DEFAULT_BOARD_SIZE, REPLAY_CACHE_CAPACITY};
use crate::lru::LruCache;
use crate::rules::{GoRules, RulesEngine};

/// Clamp `k` into `-1..moves_len`.
pub fn clamp_index(k: isize, moves_len: usize) -> isize {
    if moves_len == 0 || k < 0 {
        return -1;
    }
    k.min(moves_len as isize - 1)
}

/// The move played at `k` (after clamping), if any.
pub fn last_move(moves: &[Placement], k: isize) -> Option<Placement> {
    let k = clamp_index(k, moves.len());
    usize::try_from(k).ok().map(|i| moves[i])
}

/// Uncached replay of `moves[0..=k]` on an empty `size` board.
pub fn replay<R: RulesEngine>(
    rules: &R,
    size: usize,
    moves: &[Placement],
    k: isize,
) -> BoardPosition {
    let board = BoardPosition::empty(size);
    let k = clamp_index(k, moves.len());
    if k < 0 {
        return board;
    }
    play_from(rules, board, &moves[..=k as usize], 0)
}

/// Apply `moves` in order starting from `board`. `offset` is only used to
/// report the move number of records that break the rules.
fn play_from<R: RulesEngine>(
    rules: &R,
    mut board: BoardPosition,
    moves: &[Placement],
    offset: usize,
) -> BoardPosition {
    for (i, mv) in moves.iter().enumerate() {
        match rules.apply(&board, mv.color, mv.point) {
            Ok(next) => board = next,
            Err(err) => warn!(move_number = offset + i, ?mv, %err, "skipping illegal move in game record"),
        }
    }
    board
}

type ReplayKey = (usize, Box<[Placement]>);

fn key(moves: &[Placement], k: usize) -> ReplayKey {
    (k, moves[..=k].into())
}

/// Memoized replay with LRU eviction.
///
/// The map sits behind a mutex so a single instance can be shared between
/// threads; lookups are short and never hold the lock while replaying.
pub struct ReplayCache<R: RulesEngine = GoRules> {
    rules: R,
    size: usize,
    entries: Mutex<LruCache<ReplayKey, BoardPosition>>,
}

impl ReplayCache<GoRules> {
    pub fn new(size: usize, capacity: usize) -> Self {
        Self::with_rules(GoRules, size, capacity)
    }
}

impl<R: RulesEngine> ReplayCache<R> {
    pub fn with_rules(rules: R, size: usize, capacity: usize) -> Self {
        Self {
            rules,
            size,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn board_size(&self) -> usize {
        self.size
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<ReplayKey, BoardPosition>> {
        // A panic elsewhere cannot leave the map half-updated; keep going.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Board after playing `moves[0..=k]`.
    pub fn board_at(&self, moves: &[Placement], k: isize) -> BoardPosition {
        let k = clamp_index(k, moves.len());
        if k < 0 {
            return BoardPosition::empty(self.size);
        }
        let k = k as usize;
        let target = key(moves, k);

        // Scrubbing forward one move at a time is the common case, so a
        // cached predecessor only needs a single rule application.
        let previous = {
            let mut cache = self.lock();
            if let Some(board) = cache.get(&target) {
                trace!(k, "replay cache hit");
                return board.clone();
            }
            if k > 0 {
                cache.get(&key(moves, k - 1)).cloned()
            } else {
                None
            }
        };

        let board = match previous {
            Some(board) => {
                trace!(k, "replay cache extend");
                play_from(&self.rules, board, &moves[k..=k], k)
            }
            None => {
                trace!(k, "replay cache miss");
                play_from(&self.rules, BoardPosition::empty(self.size), &moves[..=k], 0)
            }
        };

        if let Some(((evicted_k, _), _)) = self.lock().put(target, board.clone()) {
            trace!(evicted_k, "replay cache eviction");
        }
        board
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Drop every memoized board.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

static GLOBAL: Lazy<ReplayCache> =
    Lazy::new(|| ReplayCache::new(DEFAULT_BOARD_SIZE, REPLAY_CACHE_CAPACITY));

/// Process-wide cache for the default board size.
pub fn global() -> &'static ReplayCache {
    &GLOBAL
}

/// [`ReplayCache::board_at`] on the process-wide cache.
pub fn board_at(moves: &[Placement], k: isize) -> BoardPosition {
    global().board_at(moves, k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Color, Sign, Vertex};

    fn mv(color: Color, x: usize, y: usize) -> Placement {
        Placement::new(color, Vertex::new(x, y))
    }

    fn capture_game() -> Vec<Placement> {
        vec![
            mv(Color::Black, 0, 1),
            mv(Color::White, 1, 1),
            mv(Color::Black, 1, 0),
            mv(Color::White, 10, 10),
            mv(Color::Black, 2, 1),
            mv(Color::White, 10, 11),
            mv(Color::Black, 1, 2),
        ]
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(-5, 5), -1);
        assert_eq!(clamp_index(-1, 5), -1);
        assert_eq!(clamp_index(2, 5), 2);
        assert_eq!(clamp_index(10_000, 5), 4);
        assert_eq!(clamp_index(3, 0), -1);
    }

    #[test]
    fn test_before_first_move_is_empty() {
        let cache = ReplayCache::new(19, 16);
        assert!(cache.board_at(&capture_game(), -1).is_empty());
        assert!(cache.board_at(&capture_game(), -42).is_empty());
        assert!(cache.is_empty(), "k = -1 is never cached");
    }

    #[test]
    fn test_capture_during_replay() {
        let cache = ReplayCache::new(19, 16);
        let moves = capture_game();
        let before = cache.board_at(&moves, 5);
        assert_eq!(before.get(Vertex::new(1, 1)), Sign::White);
        let after = cache.board_at(&moves, 6);
        assert_eq!(after.get(Vertex::new(1, 1)), Sign::Empty);
        assert_eq!(after.get(Vertex::new(1, 2)), Sign::Black);
    }

    #[test]
    fn test_warm_equals_cold() {
        let cache = ReplayCache::new(19, 64);
        let moves = capture_game();
        for k in -1..moves.len() as isize {
            let cold = replay(&GoRules, 19, &moves, k);
            assert_eq!(cache.board_at(&moves, k), cold, "cold k={k}");
            assert_eq!(cache.board_at(&moves, k), cold, "warm k={k}");
        }
        assert_eq!(cache.len(), moves.len());
    }

    #[test]
    fn test_scrub_backwards_then_forwards() {
        let cache = ReplayCache::new(19, 64);
        let moves = capture_game();
        for k in (0..moves.len() as isize).rev() {
            assert_eq!(cache.board_at(&moves, k), replay(&GoRules, 19, &moves, k));
        }
        cache.clear();
        for k in 0..moves.len() as isize {
            assert_eq!(cache.board_at(&moves, k), replay(&GoRules, 19, &moves, k));
        }
    }

    #[test]
    fn test_shared_prefix_does_not_collide() {
        let cache = ReplayCache::new(19, 64);
        let a = vec![mv(Color::Black, 3, 3), mv(Color::White, 15, 15)];
        let b = vec![mv(Color::Black, 3, 3), mv(Color::White, 15, 3)];
        assert_eq!(cache.board_at(&a, 0), cache.board_at(&b, 0));
        let board_a = cache.board_at(&a, 1);
        let board_b = cache.board_at(&b, 1);
        assert_ne!(board_a, board_b);
        assert_eq!(board_b.get(Vertex::new(15, 3)), Sign::White);
    }

    #[test]
    fn test_clamps_past_the_end() {
        let cache = ReplayCache::new(19, 16);
        let moves = &capture_game()[..5];
        assert_eq!(cache.board_at(moves, 10_000), cache.board_at(moves, 4));
    }

    #[test]
    fn test_illegal_record_move_is_skipped_in_place() {
        let moves = vec![
            mv(Color::Black, 3, 3),
            mv(Color::White, 3, 3),
            mv(Color::White, 4, 4),
        ];
        let board = replay(&GoRules, 19, &moves, 2);
        assert_eq!(board.get(Vertex::new(3, 3)), Sign::Black);
        assert_eq!(board.get(Vertex::new(4, 4)), Sign::White);
    }

    #[test]
    fn test_bounded_capacity() {
        let cache = ReplayCache::new(19, 3);
        let moves = capture_game();
        for k in 0..moves.len() as isize {
            cache.board_at(&moves, k);
        }
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.capacity(), 3);
    }

    #[test]
    fn test_last_move() {
        let moves = capture_game();
        assert_eq!(last_move(&moves, -1), None);
        assert_eq!(last_move(&moves, 1), Some(mv(Color::White, 1, 1)));
        assert_eq!(last_move(&moves, 99), Some(mv(Color::Black, 1, 2)));
        assert_eq!(last_move(&[], 3), None);
    }
}
