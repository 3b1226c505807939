use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, trace};

use crate::board::{Color, Piece, PieceKind};
use crate::error::ChessError;
use crate::evaluation::Evaluator;
use crate::game::Game;
use crate::history::{ApplyMode, MoveRecord};
use crate::movegen::Move;

/// Score of capturing the enemy king, and of being mated.
pub const KING_CAPTURE_SCORE: i32 = 99_990;
const SCORE_BOUND: i32 = 100_000;

const PROMOTION_CHOICES: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

/// Depth-limited alpha-beta bot. Every probe made on the game is taken
/// back before a method returns.
pub struct Search {
    evaluator: Evaluator,
    rng: StdRng,
    nodes_searched: u64,
}

impl Search {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            evaluator: Evaluator::new(),
            rng,
            nodes_searched: 0,
        }
    }

    /// Best move for the side to move; ties are broken uniformly at random.
    /// `depth` counts the plies searched below each root move.
    pub fn find_best_move(
        &mut self,
        game: &mut Game,
        depth: u16,
    ) -> Result<Option<Move>, ChessError> {
        let scored = self.score_moves(game, depth)?;
        let Some(best_score) = scored.iter().map(|(_, score)| *score).max() else {
            return Ok(None);
        };
        let tied: Vec<Move> = scored
            .iter()
            .filter(|(_, score)| *score == best_score)
            .map(|(mv, _)| *mv)
            .collect();
        let choice = tied.choose(&mut self.rng).copied();

        debug!(
            depth,
            nodes = self.nodes_searched,
            best_score,
            tied = tied.len(),
            choice = ?choice.map(|mv| mv.to_string()),
            "search finished"
        );
        Ok(choice)
    }

    /// Exact minimax score of every legal root move from the mover's side.
    /// A move that captures the enemy king is returned alone.
    pub fn score_moves(
        &mut self,
        game: &mut Game,
        depth: u16,
    ) -> Result<Vec<(Move, i32)>, ChessError> {
        self.nodes_searched = 0;
        let perspective = game.turn();
        let mut scored = Vec::new();

        for mv in game.legal_moves() {
            if captures_king(game, mv) {
                return Ok(vec![(mv, KING_CAPTURE_SCORE)]);
            }
            game.apply(mv, ApplyMode::Speculative, None)?;
            let score = self.alpha_beta(game, depth, -SCORE_BOUND, SCORE_BOUND, false, perspective);
            game.undo_move()?;
            let score = score?;
            trace!(%mv, score, "root move scored");
            scored.push((mv, score));
        }

        Ok(scored)
    }

    fn alpha_beta(
        &mut self,
        game: &mut Game,
        depth: u16,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        perspective: Color,
    ) -> Result<i32, ChessError> {
        self.nodes_searched += 1;

        if depth == 0 {
            return Ok(self.evaluator.evaluate(game.board(), perspective));
        }

        let moves = game.legal_moves();
        let stalemated = moves.is_empty()
            && !game.rules().stalemate_is_checkmate
            && !game.is_in_check(game.turn());
        if stalemated {
            return Ok(0);
        }

        // With no moves left the side to move has lost
        let mut best = if maximizing { -KING_CAPTURE_SCORE } else { KING_CAPTURE_SCORE };

        for mv in moves {
            if captures_king(game, mv) {
                return Ok(if maximizing { KING_CAPTURE_SCORE } else { -KING_CAPTURE_SCORE });
            }

            game.apply(mv, ApplyMode::Speculative, None)?;
            let score = self.alpha_beta(game, depth - 1, alpha, beta, !maximizing, perspective);
            game.undo_move()?;
            let score = score?;

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if alpha >= beta {
                break;
            }
        }

        Ok(best)
    }

    pub fn random_move(&mut self, game: &Game) -> Option<Move> {
        game.legal_moves().choose(&mut self.rng).copied()
    }

    pub fn random_promotion(&mut self) -> PieceKind {
        *PROMOTION_CHOICES
            .choose(&mut self.rng)
            .unwrap_or(&PieceKind::Queen)
    }

    /// Chooses and plays a move for the side to move according to its
    /// player's settings. Returns `None` when there is nothing to play.
    pub fn play_bot_turn(&mut self, game: &mut Game) -> Result<Option<MoveRecord>, ChessError> {
        let player = game.current_player().config().clone();
        let (mv, promotion) = if player.random_mover {
            (self.random_move(game), Some(self.random_promotion()))
        } else {
            (self.find_best_move(game, player.difficulty)?, None)
        };
        match mv {
            Some(mv) => game.make_move(mv, promotion).map(Some),
            None => Ok(None),
        }
    }

    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

fn captures_king(game: &Game, mv: Move) -> bool {
    game.board().piece_at(mv.to) == Some(Piece::new(PieceKind::King, game.turn().opposite()))
}
