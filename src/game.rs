use tracing::{debug, info};

use crate::board::{Board, Color, Piece, PieceKind};
use crate::config::{GameConfig, PlayerConfig, RuleSet};
use crate::error::ChessError;
use crate::evaluation::Evaluator;
use crate::history::{color_index, ApplyMode, History, MoveRecord};
use crate::movegen::{self, Move, MoveGenerator, MoveKind, Position};

/// Plies without a pawn move or capture after which the game is drawn.
pub const FIFTY_MOVE_LIMIT: u16 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate { winner: Color },
    Stalemate,
    FiftyMoveDraw,
    ThreefoldDraw,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        *self != GameStatus::Ongoing
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    config: PlayerConfig,
    score: u32,
    can_castle: bool,
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            score: 0,
            can_castle: true,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn difficulty(&self) -> u16 {
        self.config.difficulty
    }

    pub fn is_random_mover(&self) -> bool {
        self.config.random_mover
    }

    /// Sum of the values of captured pieces, plus the king's value for a win.
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn can_castle(&self) -> bool {
        self.can_castle
    }

    fn reset(&mut self) {
        self.score = 0;
        self.can_castle = true;
    }
}

/// The whole game: position, both players, history and the draw counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    players: [Player; 2],
    history: History,
    turn: Color,
    no_progress: u16,
    rules: RuleSet,
    generator: MoveGenerator,
    result: Option<GameStatus>,
}

impl Game {
    pub fn new(
        white_name: &str,
        white_difficulty: u16,
        black_name: &str,
        black_difficulty: u16,
    ) -> Self {
        Self::from_config(&GameConfig {
            white: PlayerConfig::new(white_name, white_difficulty),
            black: PlayerConfig::new(black_name, black_difficulty),
            ..GameConfig::default()
        })
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::from_position(config, Board::new(), Color::White)
    }

    /// Starts from an arbitrary board with both castling rights intact.
    pub fn from_position(config: &GameConfig, board: Board, turn: Color) -> Self {
        Self {
            board,
            players: [Player::new(config.white.clone()), Player::new(config.black.clone())],
            history: History::new(),
            turn,
            no_progress: 0,
            rules: config.rules,
            generator: MoveGenerator::with_rules(&config.rules),
            result: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn player(&self, color: Color) -> &Player {
        &self.players[color_index(color)]
    }

    pub fn current_player(&self) -> &Player {
        self.player(self.turn)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn no_progress(&self) -> u16 {
        self.no_progress
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn result(&self) -> Option<GameStatus> {
        self.result
    }

    pub fn castling_rights(&self) -> [bool; 2] {
        [self.players[0].can_castle, self.players[1].can_castle]
    }

    pub fn position(&self) -> Position<'_> {
        Position {
            board: &self.board,
            side: self.turn,
            can_castle: self.current_player().can_castle,
            last_move: self.history.last(),
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.generator.generate_moves(&self.position())
    }

    pub fn pseudo_legal_moves(&self) -> Vec<Move> {
        self.generator.pseudo_legal_moves(&self.position())
    }

    pub fn is_legal(&self, mv: &Move) -> bool {
        self.generator.is_move_valid(&self.position(), mv)
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.generator.is_king_in_check(&self.board, color)
    }

    /// Static evaluation of the current board, positive when `perspective` is ahead.
    pub fn evaluate(&self, perspective: Color) -> i32 {
        Evaluator::new().evaluate(&self.board, perspective)
    }

    /// Plays a move chosen by a player. Illegal moves, and any move after
    /// [`Game::check_endgame`] has settled the game, are rejected and leave
    /// the game untouched. `promotion` defaults to a queen.
    pub fn make_move(
        &mut self,
        mv: Move,
        promotion: Option<PieceKind>,
    ) -> Result<MoveRecord, ChessError> {
        if self.result.is_some() {
            return Err(ChessError::GameOver);
        }
        if !self.is_legal(&mv) {
            return Err(ChessError::IllegalMove(mv));
        }
        self.apply(mv, ApplyMode::Real, promotion)
    }

    /// Applies `mv` without checking legality. Only real moves touch the
    /// scores and the no-progress counter; both kinds are undone by
    /// [`Game::undo_move`].
    pub fn apply(
        &mut self,
        mv: Move,
        mode: ApplyMode,
        promotion: Option<PieceKind>,
    ) -> Result<MoveRecord, ChessError> {
        let side = self.turn;
        let piece = self
            .board
            .piece_at(mv.from)
            .filter(|piece| piece.color == side)
            .ok_or(ChessError::NoPieceToMove(mv.from))?;
        let kind = movegen::classify(&self.board, mv);
        let promoted = match kind {
            MoveKind::Promotion => {
                let choice = promotion.unwrap_or(PieceKind::Queen);
                if !choice.is_promotion_target() {
                    return Err(ChessError::InvalidPromotion(choice));
                }
                Some(Piece::new(choice, side))
            }
            _ => None,
        };

        let player = &mut self.players[color_index(side)];
        let castling_before = player.can_castle;
        let captured = self.board.apply(mv, kind, promoted);
        if matches!(piece.kind, PieceKind::King | PieceKind::Rook) {
            player.can_castle = false;
        }

        let record = MoveRecord {
            kind,
            from: mv.from,
            to: mv.to,
            piece,
            captured,
            promoted,
            castling_before,
            no_progress_before: self.no_progress,
            mode,
        };

        if mode == ApplyMode::Real {
            if let Some(captured) = captured {
                player.score += captured.value();
            }
            self.no_progress = if record.is_pawn_move() || record.is_capture() {
                0
            } else {
                self.no_progress + 1
            };
            info!(
                player = %player.config.name,
                %mv,
                ?kind,
                captured = ?captured.map(|piece| piece.name()),
                "move played"
            );
        }

        self.history.push(record);
        self.turn = side.opposite();
        Ok(record)
    }

    /// Takes back the most recent move.
    pub fn undo_move(&mut self) -> Result<MoveRecord, ChessError> {
        let record = self.history.pop().ok_or(ChessError::EmptyHistory)?;
        self.turn = record.color();
        self.board.revert(&record);

        let player = &mut self.players[color_index(record.color())];
        player.can_castle = record.castling_before;

        if record.mode == ApplyMode::Real {
            if let Some(captured) = record.captured {
                player.score = player.score.saturating_sub(captured.value());
            }
            self.no_progress = record.no_progress_before;
            if let Some(GameStatus::Checkmate { winner }) = self.result.take() {
                let winner = &mut self.players[color_index(winner)];
                winner.score = winner.score.saturating_sub(PieceKind::King.value());
            }
            debug!(mv = %record.mv(), "move taken back");
        }

        Ok(record)
    }

    /// Outcome of the current position without side effects.
    pub fn status(&self) -> GameStatus {
        if self.legal_moves().is_empty() {
            if self.rules.stalemate_is_checkmate || self.is_in_check(self.turn) {
                GameStatus::Checkmate {
                    winner: self.turn.opposite(),
                }
            } else {
                GameStatus::Stalemate
            }
        } else if self.no_progress >= FIFTY_MOVE_LIMIT {
            GameStatus::FiftyMoveDraw
        } else if self
            .history
            .is_threefold_repetition(&self.board, self.turn, self.castling_rights())
        {
            GameStatus::ThreefoldDraw
        } else {
            GameStatus::Ongoing
        }
    }

    /// Like [`Game::status`], but settles a finished game: the winner of a
    /// checkmate is credited the king's value once.
    pub fn check_endgame(&mut self) -> GameStatus {
        if let Some(result) = self.result {
            return result;
        }
        let status = self.status();
        if status.is_over() {
            if let GameStatus::Checkmate { winner } = status {
                self.players[color_index(winner)].score += PieceKind::King.value();
            }
            info!(
                ?status,
                white = self.players[0].score,
                black = self.players[1].score,
                "game over"
            );
            self.result = Some(status);
        }
        status
    }

    pub fn is_game_over(&self) -> bool {
        self.result.is_some() || self.status().is_over()
    }

    /// Back to the starting position, keeping player names and difficulties.
    pub fn reset(&mut self) {
        self.board = Board::new();
        for player in &mut self.players {
            player.reset();
        }
        self.history.clear();
        self.turn = Color::White;
        self.no_progress = 0;
        self.result = None;
        info!("game reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;

    fn mv(s: &str) -> Move {
        s.parse().unwrap()
    }

    fn play(game: &mut Game, moves: &[&str]) {
        for m in moves {
            game.make_move(mv(m), None).unwrap();
        }
    }

    #[test]
    fn test_new_game() {
        let game = Game::new("Alice", 3, "Bob", 1);
        assert_eq!(game.player(Color::White).name(), "Alice");
        assert_eq!(game.player(Color::Black).difficulty(), 1);
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.legal_moves().len(), 20);
        assert_eq!(game.status(), GameStatus::Ongoing);
    }

    #[test]
    fn test_illegal_move_is_rejected_without_mutation() {
        let mut game = Game::new("a", 1, "b", 1);
        let before = game.clone();
        assert_eq!(
            game.make_move(mv("e2e5"), None),
            Err(ChessError::IllegalMove(mv("e2e5")))
        );
        assert_eq!(
            game.make_move(mv("e7e5"), None),
            Err(ChessError::IllegalMove(mv("e7e5")))
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_undo_on_empty_history() {
        let mut game = Game::new("a", 1, "b", 1);
        assert_eq!(game.undo_move(), Err(ChessError::EmptyHistory));
    }

    #[test]
    fn test_apply_requires_own_piece() {
        let mut game = Game::new("a", 1, "b", 1);
        let empty: Square = "e4".parse().unwrap();
        assert_eq!(
            game.apply(Move::new(empty, "e5".parse().unwrap()), ApplyMode::Real, None),
            Err(ChessError::NoPieceToMove(empty))
        );
        assert_eq!(
            game.apply(mv("e7e5"), ApplyMode::Speculative, None),
            Err(ChessError::NoPieceToMove("e7".parse().unwrap()))
        );
    }

    #[test]
    fn test_capture_scores_and_undo_restores() {
        let mut game = Game::new("a", 1, "b", 1);
        play(&mut game, &["e2e4", "d7d5"]);
        let before = game.clone();

        let record = game.make_move(mv("e4d5"), None).unwrap();
        assert_eq!(record.captured, Some(Piece::new(PieceKind::Pawn, Color::Black)));
        assert_eq!(game.player(Color::White).score(), 10);
        assert_eq!(game.no_progress(), 0);
        assert_eq!(game.turn(), Color::Black);

        game.undo_move().unwrap();
        assert_eq!(game, before);
    }

    #[test]
    fn test_speculative_move_leaves_score_and_counter() {
        let mut game = Game::new("a", 1, "b", 1);
        play(&mut game, &["e2e4", "d7d5", "g1f3"]);
        assert_eq!(game.no_progress(), 1);
        let before = game.clone();

        game.apply(mv("d5e4"), ApplyMode::Speculative, None).unwrap();
        assert_eq!(game.player(Color::Black).score(), 0);
        assert_eq!(game.no_progress(), 1);
        assert_eq!(game.turn(), Color::White);

        game.undo_move().unwrap();
        assert_eq!(game, before);
    }

    #[test]
    fn test_king_and_rook_moves_clear_castling() {
        let mut game = Game::new("a", 1, "b", 1);
        play(&mut game, &["h2h4", "e7e5", "h1h3"]);
        assert!(!game.player(Color::White).can_castle());
        assert!(game.player(Color::Black).can_castle());

        play(&mut game, &["e8e7"]);
        assert!(!game.player(Color::Black).can_castle());

        game.undo_move().unwrap();
        assert!(game.player(Color::Black).can_castle());
        game.undo_move().unwrap();
        assert!(game.player(Color::White).can_castle());
    }

    #[test]
    fn test_is_legal() {
        let mut game = Game::new("a", 1, "b", 1);
        assert!(game.is_legal(&mv("g1f3")));
        assert!(!game.is_legal(&mv("g1e2")));
        assert!(!game.is_legal(&mv("e1e2")));

        play(&mut game, &["e2e4", "f7f6", "d1h5"]);
        assert!(game.is_legal(&mv("g7g6")));
        assert!(!game.is_legal(&mv("a7a6")));
        assert!(!game.is_legal(&mv("e8f7")));
    }

    #[test]
    fn test_settled_game_rejects_moves_until_undone() {
        let mut game = Game::new("a", 1, "b", 1);
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        play(&mut game, &shuffle);
        play(&mut game, &shuffle);
        assert!(game.is_game_over());
        assert_eq!(game.result(), None);
        assert_eq!(game.check_endgame(), GameStatus::ThreefoldDraw);
        assert_eq!(game.result(), Some(GameStatus::ThreefoldDraw));

        let before = game.clone();
        assert_eq!(game.make_move(mv("g1f3"), None), Err(ChessError::GameOver));
        assert_eq!(game, before);

        game.undo_move().unwrap();
        assert_eq!(game.result(), None);
        assert!(!game.is_game_over());
        play(&mut game, &["f6g8"]);
        assert!(game.is_game_over());
    }

    #[test]
    fn test_reset() {
        let mut game = Game::new("a", 1, "b", 1);
        play(&mut game, &["e2e4", "d7d5", "e4d5", "g8f6"]);
        game.reset();
        assert_eq!(game, Game::new("a", 1, "b", 1));
    }

    #[test]
    fn test_evaluate_is_symmetric_at_start() {
        let game = Game::new("a", 1, "b", 1);
        assert_eq!(game.evaluate(Color::White), 0);
        assert_eq!(game.evaluate(Color::Black), 0);
    }
}
