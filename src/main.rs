//! Goban-Pattern: pattern editor and game replay from the command line.
//!
//! ## Usage
//!
//! - `goban-pattern` - Show a demo
//! - `goban-pattern edit` - Read editor commands from stdin (see `protocol`)
//! - `goban-pattern replay --moves D4b-Q16w --move 0` - Print a replayed board
//! - `goban-pattern demo` - Play a random game and scrub through it
//!
//! Logs go to stderr; set `RUST_LOG` to change the level.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use goban_pattern::board::{BoardPosition, Color, Placement, Sign, Vertex};
use goban_pattern::config::Config;
use goban_pattern::editor::EditorState;
use goban_pattern::notation::{format_moves, format_vertex, parse_moves, serialize_board};
use goban_pattern::protocol::Session;
use goban_pattern::replay::ReplayCache;
use goban_pattern::rules::{GoRules, RulesEngine};
use goban_pattern::search::{Game, SearchClient, SearchEvent, SearchRequest, StaticBackend};
use goban_pattern::viewer::{GameSelection, Viewer};

/// Goban-Pattern: Go pattern editor and game replay engine
#[derive(Parser)]
#[command(name = "goban-pattern")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Board size (overrides GOBAN_BOARD_SIZE)
    #[arg(long, global = true)]
    board_size: Option<usize>,

    /// Replay cache capacity (overrides GOBAN_CACHE_CAPACITY)
    #[arg(long, global = true)]
    cache_capacity: Option<usize>,

    /// Search debounce in milliseconds (overrides GOBAN_DEBOUNCE_MS)
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the editor command protocol on stdin/stdout
    Edit,
    /// Print the board after move `k` of a move list
    Replay {
        /// Moves as `D4b-Q16w-...`
        #[arg(long)]
        moves: String,
        /// Zero-based move index; -1 is the empty board
        #[arg(long = "move", allow_negative_numbers = true)]
        k: isize,
    },
    /// Play a random game, scrub through it, and search for a pattern
    Demo {
        /// Seed for the random game
        #[arg(long, default_value_t = 7)]
        seed: u64,
        /// Number of moves to attempt
        #[arg(long, default_value_t = 120)]
        moves: usize,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(size) = cli.board_size {
        config.board_size = size;
    }
    if let Some(capacity) = cli.cache_capacity {
        config.cache_capacity = capacity;
    }
    if let Some(ms) = cli.debounce_ms {
        config.debounce = Duration::from_millis(ms);
    }
    config.validate()?;
    debug!(?config, "configuration");

    match cli.command {
        Some(Commands::Edit) => {
            let mut session = Session::new(config.board_size);
            session.run(io::stdin().lock(), io::stdout().lock())?;
        }
        Some(Commands::Replay { moves, k }) => {
            let moves = parse_moves(&moves, config.board_size).context("invalid move list")?;
            let cache = ReplayCache::new(config.board_size, config.cache_capacity);
            print!("{}", cache.board_at(&moves, k));
        }
        Some(Commands::Demo { seed, moves }) => run_demo(&config, seed, moves)?,
        None => run_demo(&config, 7, 120)?,
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Random legal game. Colors alternate; points that are illegal for the
/// player to move are retried a bounded number of times.
fn random_game(size: usize, seed: u64, len: usize) -> Vec<Placement> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let rules = GoRules;
    let mut board = BoardPosition::empty(size);
    let mut color = Color::Black;
    let mut moves = Vec::with_capacity(len);

    for _ in 0..len {
        for _ in 0..size * size {
            let v = Vertex::new(rng.usize(..size), rng.usize(..size));
            if let Ok(next) = rules.apply(&board, color, v) {
                board = next;
                moves.push(Placement::new(color, v));
                break;
            }
        }
        color = color.opposite();
    }
    moves
}

fn run_demo(config: &Config, seed: u64, len: usize) -> Result<()> {
    let size = config.board_size;
    println!("Goban-Pattern: pattern editor and replay engine\n");

    // Demo 1: editor
    println!("=== Editor Demo ===");
    let mut editor = EditorState::new(size);
    let near = size / 4;
    let far = size - 1 - near;
    editor.commit_move(Vertex::new(near, far));
    editor.commit_move(Vertex::new(far, near));
    // Clicking a stone again in alternate mode flips it.
    editor.commit_move(Vertex::new(near, far));
    println!("Pattern: {}", serialize_board(editor.board()));
    editor.undo();
    println!("After undo: {}", serialize_board(editor.board()));
    println!("Next brush color: {:?}", editor.brush_color());
    println!("{}", editor.board());

    // Demo 2: replay
    println!("=== Replay Demo ===");
    let moves = random_game(size, seed, len);
    info!(seed, moves = moves.len(), "generated game");
    println!("Game: {}", format_moves(&moves[..moves.len().min(8)], size));

    let cache = ReplayCache::new(size, config.cache_capacity);
    let start = Instant::now();
    for k in -1..moves.len() as isize {
        cache.board_at(&moves, k);
    }
    let cold = start.elapsed();
    let start = Instant::now();
    for k in (-1..moves.len() as isize).rev() {
        cache.board_at(&moves, k);
    }
    let warm = start.elapsed();
    println!("Scrubbed {} positions: cold {cold:?}, warm {warm:?}", moves.len() + 1);

    let game = Game {
        path: format!("random-{seed}.sgf"),
        score: 0,
        last_move_matched: 0,
        rotation: 0,
        is_mirrored: false,
        is_inverted: false,
        player_black: Some(1),
        player_white: Some(2),
        moves,
    };
    let mut viewer = Viewer::new(&cache);
    viewer.select(Some(GameSelection::at_match(game.clone())));
    viewer.last_move();
    let board = viewer.board();
    let captured = game.moves.len().saturating_sub(board.stones().len());
    println!(
        "Final position after {} moves ({captured} stones captured):",
        game.moves.len()
    );
    println!("{board}");

    // Demo 3: search
    println!("=== Search Demo ===");
    let mut pattern = BoardPosition::empty(size);
    for p in game.moves.iter().take(3) {
        pattern.set(p.point, Sign::from(p.color));
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    let backend = Arc::new(StaticBackend::new(size, vec![game]));
    let debounce = config.debounce;
    let page_size = config.page_size;
    let event = runtime.block_on(async move {
        let (mut client, mut events) = SearchClient::spawn(backend, debounce);
        // A burst of edits collapses into one search for the last request.
        client.submit(SearchRequest::new(&BoardPosition::empty(size), Color::Black));
        client.submit(SearchRequest::new(&pattern, Color::White).with_page(0, page_size));
        events.recv().await
    });
    match event {
        Some(SearchEvent::Results { seq, response }) => {
            println!("Search #{seq}: {} game(s)", response.num_results);
            for next in response.next_moves.iter().take(3) {
                println!(
                    "  next {} in {} game(s)",
                    format_vertex(next.point, size),
                    next.game_count
                );
            }
        }
        Some(SearchEvent::Failed { seq, error }) => println!("Search #{seq} failed: {error:#}"),
        Some(SearchEvent::Game { .. }) | None => println!("No search results"),
    }
    Ok(())
}
