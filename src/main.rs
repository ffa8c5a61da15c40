use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rummy_engine::game::{Game, GameStatus, Seat, TurnOutcome};
use rummy_engine::solver::SearchResult;
use rummy_engine::{Board, Hand, Meld, MoveSearchEngine, SearchConfig, parse_tiles};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_COMMIT"), ")"))]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the computer opponent's move for a hand and board
    Solve {
        /// Hand tiles, e.g. "r1 r2 r3 k9"
        #[arg(long)]
        hand: String,

        /// A set on the board, e.g. "b 4 5 6" or "5 r b k"; repeat for more sets
        #[arg(long)]
        board: Vec<String>,

        /// Seed for the search's random sampling
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Search configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Play two computer opponents against each other
    Selfplay {
        /// Seed for the deal and both players
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Stop after this many turns
        #[arg(long, default_value_t = 500)]
        max_turns: usize,

        /// Search configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct SolveOutput {
    strategy: Option<String>,
    score: i32,
    board: Option<Vec<Vec<String>>>,
    hand_tiles_used: Option<Vec<String>>,
    candidates_evaluated: usize,
    elapsed_ms: f64,
}

fn load_config(path: Option<&PathBuf>) -> Result<SearchConfig, String> {
    match path {
        Some(path) => SearchConfig::load(path).map_err(|e| format!("{}: {}", path.display(), e)),
        None => Ok(SearchConfig::default()),
    }
}

fn format_tiles<'a, I: IntoIterator<Item = &'a rummy_engine::Tile>>(tiles: I) -> String {
    tiles.into_iter().map(|t| t.to_string()).collect::<Vec<_>>().join(" ")
}

fn print_diagnostics(result: &SearchResult) {
    for report in &result.reports {
        println!(
            "  {:<9} best score {:>3} from {} candidates",
            report.strategy, report.best_score, report.candidates_evaluated
        );
    }
    println!("  {:.2} ms", result.elapsed_ms);
}

fn solve(hand: &str, board: &[String], seed: u64, config: Option<&PathBuf>) -> Result<(), String> {
    let hand = Hand::from_tiles(parse_tiles(hand).map_err(|e| e.to_string())?);
    let melds = board
        .iter()
        .map(|s| Meld::from_string(s))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    let sets: Vec<&[rummy_engine::Tile]> = melds.iter().map(|meld| meld.tiles.as_slice()).collect();
    let board = Board::from_sets(&sets).map_err(|e| e.to_string())?;

    let mut engine = MoveSearchEngine::seeded(load_config(config)?, seed);
    let result = engine.find_move(&board, &hand).map_err(|e| e.to_string())?;

    println!("Search:");
    print_diagnostics(&result);

    let summary = result.chosen.as_ref().map(|chosen| chosen.summary());
    let output = SolveOutput {
        strategy: result.strategy.map(|s| s.to_string()),
        score: result.score(),
        board: summary
            .as_ref()
            .map(|s| s.sets.iter().map(|set| set.iter().map(|t| t.to_string()).collect()).collect()),
        hand_tiles_used: summary.map(|s| s.hand_tiles_used.iter().map(|t| t.to_string()).collect()),
        candidates_evaluated: result.candidates_evaluated,
        elapsed_ms: result.elapsed_ms,
    };
    let json = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
    println!("{}", json);

    if result.chosen.is_none() {
        println!("No beneficial move found: draw a tile.");
    }
    Ok(())
}

fn selfplay(seed: u64, max_turns: usize, config: Option<&PathBuf>) -> Result<(), String> {
    let config = load_config(config)?;
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut game = Game::new(&mut rng);
    let mut engines = [
        MoveSearchEngine::seeded(config.clone(), seed.wrapping_add(1)),
        MoveSearchEngine::seeded(config, seed.wrapping_add(2)),
    ];

    for seat in [Seat::First, Seat::Second] {
        println!("{:?} hand: {}", seat, format_tiles(game.hand(seat).tiles()));
    }

    let mut turn = 0;
    while !game.is_over() && turn < max_turns {
        turn += 1;
        let seat = game.current_seat().map_err(|e| e.to_string())?;
        let played = game
            .play_computer_turn(&mut engines[seat.index()])
            .map_err(|e| e.to_string())?;

        let action = match (played.outcome, played.search.strategy) {
            (TurnOutcome::Placed(count), Some(strategy)) => format!("placed {} ({})", count, strategy),
            (TurnOutcome::Placed(count), None) => format!("placed {}", count),
            (TurnOutcome::Drew(tile), _) => format!("drew {}", tile),
            (TurnOutcome::Passed, _) => "passed".to_string(),
        };
        println!(
            "Turn {:>3} {:?}: {} [{} candidates, {:.2} ms, {} left in hand]",
            turn,
            seat,
            action,
            played.search.candidates_evaluated,
            played.search.elapsed_ms,
            game.hand(seat).count()
        );
    }

    println!("\nBoard:");
    for set in game.board().sets() {
        println!("  {}", format_tiles(&set));
    }
    match game.status() {
        GameStatus::Won(seat) => println!("{:?} wins after {} turns", seat, turn),
        GameStatus::Tie => println!("Tie after {} turns", turn),
        GameStatus::InProgress(_) => println!("Stopped after {} turns", turn),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Solve {
            hand,
            board,
            seed,
            config,
        } => solve(hand, board, *seed, config.as_ref()),
        Command::Selfplay {
            seed,
            max_turns,
            config,
        } => selfplay(*seed, *max_turns, config.as_ref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
