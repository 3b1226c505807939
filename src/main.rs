use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chess_bot::config::{GameConfig, PlayerConfig, RuleSet, DEFAULT_DIFFICULTY};
use chess_bot::{Color, Game, GameStatus, Search};

/// Plays a bot-versus-bot game and prints the final position.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[arg(long, default_value = "White")]
    white: String,

    #[arg(long, default_value = "Black")]
    black: String,

    /// Plies searched below each of white's candidate moves
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
    white_depth: u16,

    #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
    black_depth: u16,

    /// White picks uniformly among legal moves
    #[arg(long)]
    white_random: bool,

    #[arg(long)]
    black_random: bool,

    /// Seed for tie-breaking and random movers
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many plies even if the game is not over
    #[arg(long, default_value_t = 400)]
    max_plies: usize,

    /// Allow castling through an attacked square
    #[arg(long)]
    castle_through_check: bool,

    /// Treat stalemate as a loss for the side to move
    #[arg(long)]
    stalemate_is_checkmate: bool,

    /// Print the board after every move
    #[arg(long)]
    show_moves: bool,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        let player = |name: &str, depth: u16, random: bool| {
            if random {
                PlayerConfig::random(name)
            } else {
                PlayerConfig::new(name, depth)
            }
        };
        GameConfig {
            white: player(&self.white, self.white_depth, self.white_random),
            black: player(&self.black, self.black_depth, self.black_random),
            rules: RuleSet {
                castle_through_check: self.castle_through_check,
                stalemate_is_checkmate: self.stalemate_is_checkmate,
            },
            seed: self.seed,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.game_config();
    let mut game = Game::from_config(&config);
    let mut search = match config.seed {
        Some(seed) => Search::with_seed(seed),
        None => Search::new(),
    };

    info!(
        white = %config.white.name,
        black = %config.black.name,
        rules = ?config.rules,
        "starting game"
    );

    let mut status = game.check_endgame();
    while !status.is_over() && game.history().len() < args.max_plies {
        let played = search
            .play_bot_turn(&mut game)
            .with_context(|| format!("{} failed to move", game.current_player().name()))?;
        if played.is_none() {
            break;
        }
        if args.show_moves {
            println!("{}", game.board());
        }
        status = game.check_endgame();
    }

    if !status.is_over() {
        warn!(plies = game.history().len(), "stopped before the game ended");
    }

    println!("{}", game.board());
    match status {
        GameStatus::Checkmate { winner } => {
            println!("Checkmate, {} ({}) wins", game.player(winner).name(), winner)
        }
        GameStatus::Stalemate => println!("Stalemate"),
        GameStatus::FiftyMoveDraw => println!("Draw by the fifty-move rule"),
        GameStatus::ThreefoldDraw => println!("Draw by threefold repetition"),
        GameStatus::Ongoing => println!("Unfinished after {} plies", game.history().len()),
    }
    for color in [Color::White, Color::Black] {
        let player = game.player(color);
        println!("{}: {}", player.name(), player.score());
    }

    Ok(())
}
