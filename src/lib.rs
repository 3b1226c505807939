pub mod board;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod history;
pub mod movegen;
pub mod search;

pub use board::{Board, Color, Piece, PieceKind, Square};
pub use config::{GameConfig, PlayerConfig, RuleSet};
pub use error::ChessError;
pub use game::{Game, GameStatus, Player};
pub use history::{ApplyMode, MoveRecord};
pub use movegen::{Move, MoveKind};
pub use search::Search;
