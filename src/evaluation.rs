use crate::board::{Board, Color, Piece, PieceKind, Square, BOARD_SIZE};

/// Evaluation units per point of material.
pub const EVAL_SCALE: i32 = 10;

type PieceSquareTable = [[i32; 8]; 8];

// Tables are laid out from white's side: row 0 is rank 8. Black reads them
// with the rows mirrored.

// Encourages central control and advancement
const PAWN_TABLE: PieceSquareTable = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [50, 50, 50, 50, 50, 50, 50, 50],
    [10, 10, 20, 30, 30, 20, 10, 10],
    [5, 5, 10, 25, 25, 10, 5, 5],
    [0, 0, 0, 20, 20, 0, 0, 0],
    [5, -5, -10, 0, 0, -10, -5, 5],
    [5, 10, 10, -20, -20, 10, 10, 5],
    [0, 0, 0, 0, 0, 0, 0, 0],
];

const KNIGHT_TABLE: PieceSquareTable = [
    [-50, -40, -30, -30, -30, -30, -40, -50],
    [-40, -20, 0, 0, 0, 0, -20, -40],
    [-30, 0, 10, 15, 15, 10, 0, -30],
    [-30, 5, 15, 20, 20, 15, 5, -30],
    [-30, 0, 15, 20, 20, 15, 0, -30],
    [-30, 5, 10, 15, 15, 10, 5, -30],
    [-40, -20, 0, 5, 5, 0, -20, -40],
    [-50, -40, -30, -30, -30, -30, -40, -50],
];

// Long diagonals
const BISHOP_TABLE: PieceSquareTable = [
    [-20, -10, -10, -10, -10, -10, -10, -20],
    [-10, 0, 0, 0, 0, 0, 0, -10],
    [-10, 0, 5, 10, 10, 5, 0, -10],
    [-10, 5, 5, 10, 10, 5, 5, -10],
    [-10, 0, 10, 10, 10, 10, 0, -10],
    [-10, 10, 10, 10, 10, 10, 10, -10],
    [-10, 5, 0, 0, 0, 0, 5, -10],
    [-20, -10, -10, -10, -10, -10, -10, -20],
];

// Seventh rank and central files
const ROOK_TABLE: PieceSquareTable = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [5, 10, 10, 10, 10, 10, 10, 5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [-5, 0, 0, 0, 0, 0, 0, -5],
    [0, 0, 0, 5, 5, 0, 0, 0],
];

const QUEEN_TABLE: PieceSquareTable = [
    [-20, -10, -10, -5, -5, -10, -10, -20],
    [-10, 0, 0, 0, 0, 0, 0, -10],
    [-10, 0, 5, 5, 5, 5, 0, -10],
    [-5, 0, 5, 5, 5, 5, 0, -5],
    [0, 0, 5, 5, 5, 5, 0, -5],
    [-10, 5, 5, 5, 5, 5, 0, -10],
    [-10, 0, 5, 0, 0, 0, 0, -10],
    [-20, -10, -10, -5, -5, -10, -10, -20],
];

// Keeps the king tucked away behind its pawns
const KING_TABLE: PieceSquareTable = [
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-30, -40, -40, -50, -50, -40, -40, -30],
    [-20, -30, -30, -40, -40, -30, -30, -20],
    [-10, -20, -20, -20, -20, -20, -20, -10],
    [20, 20, 0, 0, 0, 0, 20, 20],
    [20, 30, 10, 0, 0, 10, 30, 20],
];

/// Material plus piece-square evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    /// Board score from `perspective`'s point of view.
    pub fn evaluate(&self, board: &Board, perspective: Color) -> i32 {
        let white_minus_black: i32 = board
            .pieces()
            .map(|(square, piece)| match piece.color {
                Color::White => self.piece_score(piece, square),
                Color::Black => -self.piece_score(piece, square),
            })
            .sum();

        match perspective {
            Color::White => white_minus_black,
            Color::Black => -white_minus_black,
        }
    }

    /// Base value plus positional bonus of one piece, always non-negative in
    /// material terms regardless of color.
    pub fn piece_score(&self, piece: Piece, square: Square) -> i32 {
        let table = match piece.kind {
            PieceKind::Pawn => &PAWN_TABLE,
            PieceKind::Knight => &KNIGHT_TABLE,
            PieceKind::Bishop => &BISHOP_TABLE,
            PieceKind::Rook => &ROOK_TABLE,
            PieceKind::Queen => &QUEEN_TABLE,
            PieceKind::King => &KING_TABLE,
        };
        let row = match piece.color {
            Color::White => square.row(),
            Color::Black => BOARD_SIZE - 1 - square.row(),
        };
        piece.value() as i32 * EVAL_SCALE + table[row as usize][square.file() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_material_advantage() {
        let evaluator = Evaluator::new();
        let mut board = Board::new();
        board.set(sq("d8"), None);
        assert!(evaluator.evaluate(&board, Color::White) > 800);
        assert_eq!(
            evaluator.evaluate(&board, Color::White),
            -evaluator.evaluate(&board, Color::Black)
        );
    }

    #[test]
    fn test_tables_mirror_rows_for_black() {
        let evaluator = Evaluator::new();
        let white_knight = Piece::new(PieceKind::Knight, Color::White);
        let black_knight = Piece::new(PieceKind::Knight, Color::Black);
        assert_eq!(
            evaluator.piece_score(white_knight, sq("g1")),
            evaluator.piece_score(black_knight, sq("g8"))
        );
        assert_eq!(evaluator.piece_score(white_knight, sq("e4")), 300 + 20);

        // Pawns on the seventh rank from their own side earn the largest bonus
        let white_pawn = Piece::new(PieceKind::Pawn, Color::White);
        let black_pawn = Piece::new(PieceKind::Pawn, Color::Black);
        assert_eq!(evaluator.piece_score(white_pawn, sq("a7")), 150);
        assert_eq!(evaluator.piece_score(black_pawn, sq("a2")), 150);
    }

    #[test]
    fn test_central_pawn_push_improves_score() {
        let evaluator = Evaluator::new();
        let mut board = Board::new();
        let start = evaluator.evaluate(&board, Color::White);
        let pawn = board.piece_at(sq("e2"));
        board.set(sq("e2"), None);
        board.set(sq("e4"), pawn);
        assert!(evaluator.evaluate(&board, Color::White) > start);
    }
}
