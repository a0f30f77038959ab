//! Message channel to the pattern search service.
//!
//! The search itself is external; this module owns the plumbing around it:
//!
//! - the request/response messages ([`SearchRequest`], [`SearchResponse`],
//!   [`GameLookup`]),
//! - the [`SearchBackend`] trait the service is reached through,
//! - [`SearchClient`], an actor task that debounces bursts of board edits,
//!   keeps only the newest request, and drops responses that were
//!   superseded while in flight,
//! - [`StaticBackend`], an in-memory backend over a fixed list of games.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::board::{BoardPosition, Color, Placement, Vertex};
use crate::constants::{SEARCH_PAGE_SIZE, SEARCH_QUEUE_DEPTH};

// =============================================================================
// Messages
// =============================================================================

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    BestMatch,
    LeastMoves,
}

/// Restrict results to games with a given player, optionally in a given
/// color.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerFilter {
    pub player_id: u32,
    pub color: Option<Color>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(rename = "positionBuf")]
    pub position: Vec<Placement>,
    pub next_color: Color,
    pub page: usize,
    pub page_size: usize,
    #[serde(rename = "playerFilters")]
    pub filters: Vec<PlayerFilter>,
    pub sort_by: SortBy,
}

impl SearchRequest {
    /// First page of results for the stones on `board`.
    pub fn new(board: &BoardPosition, next_color: Color) -> Self {
        Self {
            position: board.stones(),
            next_color,
            page: 0,
            page_size: SEARCH_PAGE_SIZE,
            filters: Vec::new(),
            sort_by: SortBy::default(),
        }
    }

    pub fn with_page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    pub fn with_filters(mut self, filters: Vec<PlayerFilter>) -> Self {
        self.filters = filters;
        self
    }
}

/// A historical game returned by the search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub path: String,
    pub score: i32,
    /// Index of the move at which the whole pattern is on the board.
    pub last_move_matched: usize,
    pub rotation: u8,
    pub is_mirrored: bool,
    pub is_inverted: bool,
    pub player_black: Option<u32>,
    pub player_white: Option<u32>,
    pub moves: Vec<Placement>,
}

/// A continuation seen in the matched games.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextMove {
    pub point: Vertex,
    pub game_count: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub num_results: usize,
    pub results: Vec<Game>,
    pub next_moves: Vec<NextMove>,
    pub total_pages: usize,
    pub current_page: usize,
    pub player_counts: HashMap<u32, usize>,
}

/// Fetch one game by path, seen through the given symmetry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameLookup {
    pub path: String,
    pub rotation: u8,
    pub is_mirrored: bool,
}

/// The search service.
///
/// Calls may be slow and are always made off the async runtime's worker
/// threads.
pub trait SearchBackend: Send + Sync {
    fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;
    fn lookup(&self, lookup: &GameLookup) -> Result<Option<Game>>;
}

// =============================================================================
// Client actor
// =============================================================================

/// Output of the search actor.
#[derive(Debug)]
pub enum SearchEvent {
    Results { seq: u64, response: SearchResponse },
    Failed { seq: u64, error: anyhow::Error },
    Game { lookup: GameLookup, game: Option<Game> },
}

/// The newest search submitted, with its sequence number.
type Latest = Option<(u64, SearchRequest)>;

/// Handle to the search actor. Dropping it stops the actor.
///
/// Searches go through a single-slot `watch` channel, so a burst of submits
/// can never queue up behind each other: each one overwrites the last.
/// Lookups are independent and go through a bounded queue.
pub struct SearchClient {
    search_tx: watch::Sender<Latest>,
    lookup_tx: mpsc::Sender<GameLookup>,
    next_seq: u64,
}

impl SearchClient {
    /// Start the actor on the current tokio runtime.
    pub fn spawn<B>(
        backend: Arc<B>,
        debounce: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchEvent>)
    where
        B: SearchBackend + 'static,
    {
        let (search_tx, search_rx) = watch::channel(None);
        let (lookup_tx, lookup_rx) = mpsc::channel(SEARCH_QUEUE_DEPTH);
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_actor(backend, debounce, search_rx, lookup_rx, out_tx));
        let client = Self {
            search_tx,
            lookup_tx,
            next_seq: 0,
        };
        (client, out_rx)
    }

    /// Submit a search, replacing any request that has not started yet.
    /// Returns its sequence number; only the response to the most recent
    /// sequence number is ever delivered.
    ///
    /// First pages are debounced. Later pages (`page > 0`) start as soon as
    /// no other search is running.
    pub fn submit(&mut self, request: SearchRequest) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.search_tx.send_replace(Some((seq, request)));
        seq
    }

    /// Look up one game. Not debounced.
    pub fn lookup(&self, lookup: GameLookup) {
        if let Err(err) = self.lookup_tx.try_send(lookup) {
            warn!(%err, "game lookup not queued");
        }
    }
}

struct InFlight {
    seq: u64,
    handle: JoinHandle<Result<SearchResponse>>,
}

struct Pending {
    seq: u64,
    request: SearchRequest,
    due: Instant,
}

async fn finish(in_flight: &mut Option<InFlight>) -> (u64, Result<SearchResponse>) {
    match in_flight {
        Some(job) => {
            let result = (&mut job.handle).await;
            let result = result
                .context("search task panicked")
                .and_then(|r| r);
            (job.seq, result)
        }
        None => std::future::pending().await,
    }
}

fn spawn_lookup<B>(backend: &Arc<B>, lookup: GameLookup, out: &mpsc::UnboundedSender<SearchEvent>)
where
    B: SearchBackend + 'static,
{
    let backend = Arc::clone(backend);
    let out = out.clone();
    tokio::spawn(async move {
        let key = lookup.clone();
        let found = tokio::task::spawn_blocking(move || backend.lookup(&key)).await;
        match found {
            Ok(Ok(game)) => {
                let _ = out.send(SearchEvent::Game { lookup, game });
            }
            Ok(Err(err)) => warn!(path = %lookup.path, %err, "game lookup failed"),
            Err(err) => warn!(path = %lookup.path, %err, "game lookup task failed"),
        }
    });
}

async fn run_actor<B>(
    backend: Arc<B>,
    debounce: Duration,
    mut search_rx: watch::Receiver<Latest>,
    mut lookup_rx: mpsc::Receiver<GameLookup>,
    out: mpsc::UnboundedSender<SearchEvent>,
) where
    B: SearchBackend + 'static,
{
    let mut pending: Option<Pending> = None;
    let mut in_flight: Option<InFlight> = None;

    loop {
        let due = pending.as_ref().map_or_else(Instant::now, |p| p.due);
        tokio::select! {
            changed = search_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = search_rx.borrow_and_update().clone();
                if let Some((seq, request)) = latest {
                    let delay = if request.page > 0 { Duration::ZERO } else { debounce };
                    if let Some(old) = pending.replace(Pending {
                        seq,
                        request,
                        due: Instant::now() + delay,
                    }) {
                        debug!(seq = old.seq, "search superseded before sending");
                    }
                }
            }
            lookup = lookup_rx.recv() => match lookup {
                None => break,
                Some(lookup) => spawn_lookup(&backend, lookup, &out),
            },
            _ = tokio::time::sleep_until(due), if pending.is_some() && in_flight.is_none() => {
                if let Some(Pending { seq, request, .. }) = pending.take() {
                    debug!(seq, stones = request.position.len(), page = request.page, "sending search");
                    let backend = Arc::clone(&backend);
                    let handle = tokio::task::spawn_blocking(move || backend.search(&request));
                    in_flight = Some(InFlight { seq, handle });
                }
            }
            (seq, result) = finish(&mut in_flight) => {
                in_flight = None;
                if pending.is_some() {
                    debug!(seq, "dropping stale search response");
                    continue;
                }
                let event = match result {
                    Ok(response) => SearchEvent::Results { seq, response },
                    Err(error) => SearchEvent::Failed { seq, error },
                };
                if out.send(event).is_err() {
                    break;
                }
            }
        }
    }
    debug!("search actor stopped");
}

// =============================================================================
// Symmetry
// =============================================================================

/// Map a vertex through a mirror (left-right, applied first) and `rotation`
/// quarter turns clockwise. Vertices off a `size` board are returned as is.
pub fn transform_vertex(v: Vertex, size: usize, rotation: u8, mirrored: bool) -> Vertex {
    if v.x >= size || v.y >= size {
        return v;
    }
    let last = size - 1;
    let mut out = if mirrored {
        Vertex::new(last - v.x, v.y)
    } else {
        v
    };
    for _ in 0..rotation % 4 {
        out = Vertex::new(last - out.y, out.x);
    }
    out
}

// =============================================================================
// In-memory backend
// =============================================================================

/// Backend over a fixed set of games.
///
/// Matching is deliberately naive: a game matches when every stone of the
/// pattern is played, in its color, somewhere in the game. It stands in for
/// the real service in the command-line tool and in tests.
#[derive(Debug, Clone)]
pub struct StaticBackend {
    size: usize,
    games: Vec<Game>,
}

impl StaticBackend {
    pub fn new(size: usize, games: Vec<Game>) -> Self {
        Self { size, games }
    }

    fn matches_filters(game: &Game, filters: &[PlayerFilter]) -> bool {
        filters.iter().all(|f| match f.color {
            Some(Color::Black) => game.player_black == Some(f.player_id),
            Some(Color::White) => game.player_white == Some(f.player_id),
            None => {
                game.player_black == Some(f.player_id) || game.player_white == Some(f.player_id)
            }
        })
    }

    /// Index of the move that completes `position` in `game`, if it does.
    fn match_game(position: &[Placement], game: &Game) -> Option<usize> {
        position
            .iter()
            .map(|p| game.moves.iter().position(|m| m == p))
            .try_fold(0, |acc, idx| idx.map(|i| acc.max(i)))
    }
}

impl SearchBackend for StaticBackend {
    fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        if request.position.is_empty() {
            return Ok(SearchResponse::default());
        }
        let mut matched: Vec<Game> = self
            .games
            .iter()
            .filter(|g| Self::matches_filters(g, &request.filters))
            .filter_map(|g| {
                Self::match_game(&request.position, g).map(|last| Game {
                    last_move_matched: last,
                    ..g.clone()
                })
            })
            .collect();

        match request.sort_by {
            SortBy::BestMatch => matched.sort_by(|a, b| b.score.cmp(&a.score).then(a.path.cmp(&b.path))),
            SortBy::LeastMoves => matched.sort_by_key(|g| (g.moves.len(), g.path.clone())),
        }

        let mut next_counts: HashMap<Vertex, usize> = HashMap::new();
        let mut player_counts: HashMap<u32, usize> = HashMap::new();
        for game in &matched {
            if let Some(next) = game.moves.get(game.last_move_matched + 1) {
                *next_counts.entry(next.point).or_default() += 1;
            }
            for id in [game.player_black, game.player_white].into_iter().flatten() {
                *player_counts.entry(id).or_default() += 1;
            }
        }
        let mut next_moves: Vec<NextMove> = next_counts
            .into_iter()
            .map(|(point, game_count)| NextMove { point, game_count })
            .collect();
        next_moves.sort_by(|a, b| b.game_count.cmp(&a.game_count).then(a.point.cmp(&b.point)));

        let page_size = request.page_size.max(1);
        let num_results = matched.len();
        let total_pages = num_results.div_ceil(page_size);
        let results = matched
            .into_iter()
            .skip(request.page * page_size)
            .take(page_size)
            .collect();

        Ok(SearchResponse {
            num_results,
            results,
            next_moves,
            total_pages,
            current_page: request.page,
            player_counts,
        })
    }

    fn lookup(&self, lookup: &GameLookup) -> Result<Option<Game>> {
        let Some(game) = self.games.iter().find(|g| g.path == lookup.path) else {
            return Ok(None);
        };
        let moves = game
            .moves
            .iter()
            .map(|m| {
                Placement::new(
                    m.color,
                    transform_vertex(m.point, self.size, lookup.rotation, lookup.is_mirrored),
                )
            })
            .collect();
        Ok(Some(Game {
            rotation: lookup.rotation,
            is_mirrored: lookup.is_mirrored,
            moves,
            ..game.clone()
        }))
    }
}
