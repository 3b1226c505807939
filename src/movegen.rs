use std::fmt;
use std::str::FromStr;

use tracing::error;

use crate::board::{Board, Color, Piece, PieceKind, Square};
use crate::config::RuleSet;
use crate::error::ChessError;
use crate::history::MoveRecord;

/// A coordinate pair. What kind of move it is follows from the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

impl FromStr for Move {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ChessError::InvalidMoveNotation(s.to_string());
        if s.len() != 4 || !s.is_ascii() {
            return Err(invalid());
        }
        let from = s[0..2].parse().map_err(|_| invalid())?;
        let to = s[2..4].parse().map_err(|_| invalid())?;
        Ok(Move::new(from, to))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Normal,
    Castling,
    Promotion,
    EnPassant,
}

/// The slice of game state move generation depends on.
#[derive(Debug, Clone, Copy)]
pub struct Position<'a> {
    pub board: &'a Board,
    pub side: Color,
    pub can_castle: bool,
    pub last_move: Option<&'a MoveRecord>,
}

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];
const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveGenerator {
    castle_through_check: bool,
}

impl MoveGenerator {
    pub fn new() -> Self {
        Self {
            castle_through_check: false,
        }
    }

    pub fn with_rules(rules: &RuleSet) -> Self {
        Self {
            castle_through_check: rules.castle_through_check,
        }
    }

    /// All legal moves for the side to move.
    pub fn generate_moves(&self, position: &Position) -> Vec<Move> {
        self.pseudo_legal_moves(position)
            .into_iter()
            .filter(|mv| self.leaves_king_safe(position.board, position.side, *mv))
            .collect()
    }

    pub fn is_move_valid(&self, position: &Position, mv: &Move) -> bool {
        self.pseudo_legal_moves(position).contains(mv)
            && self.leaves_king_safe(position.board, position.side, *mv)
    }

    /// Moves that follow each piece's movement rules, ignoring whether the
    /// mover's king ends up attacked.
    pub fn pseudo_legal_moves(&self, position: &Position) -> Vec<Move> {
        let mut moves = Vec::new();
        let board = position.board;
        let side = position.side;

        for (from, piece) in board.pieces().filter(|(_, piece)| piece.color == side) {
            match piece.kind {
                PieceKind::Pawn => self.pawn_moves(position, from, &mut moves),
                PieceKind::Rook => slide_moves(board, from, side, &ROOK_DIRECTIONS, &mut moves),
                PieceKind::Knight => step_moves(board, from, side, &KNIGHT_OFFSETS, &mut moves),
                PieceKind::Bishop => {
                    slide_moves(board, from, side, &BISHOP_DIRECTIONS, &mut moves)
                }
                PieceKind::Queen => {
                    slide_moves(board, from, side, &ROOK_DIRECTIONS, &mut moves);
                    slide_moves(board, from, side, &BISHOP_DIRECTIONS, &mut moves);
                }
                PieceKind::King => {
                    step_moves(board, from, side, &KING_OFFSETS, &mut moves);
                    self.castling_moves(position, from, &mut moves);
                }
            }
        }

        moves
    }

    fn pawn_moves(&self, position: &Position, from: Square, moves: &mut Vec<Move>) {
        let board = position.board;
        let side = position.side;
        let forward = side.forward();

        if let Some(one) = from.offset(0, forward).filter(|sq| board.is_empty(*sq)) {
            moves.push(Move::new(from, one));
            if from.row() == side.pawn_row() {
                if let Some(two) = from.offset(0, 2 * forward).filter(|sq| board.is_empty(*sq)) {
                    moves.push(Move::new(from, two));
                }
            }
        }

        for file_delta in [-1, 1] {
            if let Some(target) = from.offset(file_delta, forward) {
                if board.piece_at(target).is_some_and(|piece| piece.color != side) {
                    moves.push(Move::new(from, target));
                }
            }
        }

        if let Some(mv) = en_passant_capture(board, side, from, position.last_move) {
            moves.push(mv);
        }
    }

    fn castling_moves(&self, position: &Position, from: Square, moves: &mut Vec<Move>) {
        let board = position.board;
        let side = position.side;
        let row = side.home_row();

        if !position.can_castle || from != Square::at(4, row) {
            return;
        }
        if self.is_king_in_check(board, side) {
            return;
        }

        // (rook file, squares that must be empty, square the king crosses, king target)
        let wings: [(u8, &[u8], u8, u8); 2] = [(0, &[1, 2, 3], 3, 2), (7, &[5, 6], 5, 6)];
        for (rook_file, between, transit, target) in wings {
            let rook = Some(Piece::new(PieceKind::Rook, side));
            if board.piece_at(Square::at(rook_file, row)) != rook {
                continue;
            }
            if !between.iter().all(|file| board.is_empty(Square::at(*file, row))) {
                continue;
            }
            if !self.castle_through_check
                && self.is_square_under_attack(board, Square::at(transit, row), side.opposite())
            {
                continue;
            }
            moves.push(Move::new(from, Square::at(target, row)));
        }
    }

    /// Plays `mv` on a scratch copy and reports whether the mover's king is
    /// left unattacked.
    fn leaves_king_safe(&self, board: &Board, side: Color, mv: Move) -> bool {
        let mut probe = board.clone();
        let kind = classify(board, mv);
        let promoted = (kind == MoveKind::Promotion).then(|| Piece::new(PieceKind::Queen, side));
        probe.apply(mv, kind, promoted);
        !self.is_king_in_check(&probe, side)
    }

    pub fn is_square_under_attack(&self, board: &Board, square: Square, attacker: Color) -> bool {
        let is_attacker = |piece: Option<Piece>, kinds: &[PieceKind]| {
            piece.is_some_and(|piece| piece.color == attacker && kinds.contains(&piece.kind))
        };

        // Rook/queen along files and rows, bishop/queen along diagonals
        let straight = [PieceKind::Rook, PieceKind::Queen];
        let diagonal = [PieceKind::Bishop, PieceKind::Queen];
        for &(df, dr) in &ROOK_DIRECTIONS {
            if is_attacker(first_piece_along(board, square, df, dr), &straight) {
                return true;
            }
        }
        for &(df, dr) in &BISHOP_DIRECTIONS {
            if is_attacker(first_piece_along(board, square, df, dr), &diagonal) {
                return true;
            }
        }

        let occupant = |df: i8, dr: i8| square.offset(df, dr).and_then(|sq| board.piece_at(sq));

        if KNIGHT_OFFSETS
            .iter()
            .any(|&(df, dr)| is_attacker(occupant(df, dr), &[PieceKind::Knight]))
        {
            return true;
        }
        if KING_OFFSETS.iter().any(|&(df, dr)| is_attacker(occupant(df, dr), &[PieceKind::King])) {
            return true;
        }

        // An attacking pawn stands one row behind the square, from its own point of view
        let pawn_row = -attacker.forward();
        [-1, 1]
            .iter()
            .any(|&df| is_attacker(occupant(df, pawn_row), &[PieceKind::Pawn]))
    }

    pub fn is_king_in_check(&self, board: &Board, color: Color) -> bool {
        match board.find_king(color) {
            Some(king) => self.is_square_under_attack(board, king, color.opposite()),
            None => {
                error!(%color, "board has no king");
                false
            }
        }
    }
}

impl Default for MoveGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn first_piece_along(board: &Board, from: Square, df: i8, dr: i8) -> Option<Piece> {
    let mut current = from;
    while let Some(next) = current.offset(df, dr) {
        if let Some(piece) = board.piece_at(next) {
            return Some(piece);
        }
        current = next;
    }
    None
}

/// Rays stop at the first occupied square, which is included when it holds an enemy.
fn slide_moves(
    board: &Board,
    from: Square,
    side: Color,
    directions: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(df, dr) in directions {
        let mut current = from;
        while let Some(next) = current.offset(df, dr) {
            match board.piece_at(next) {
                None => moves.push(Move::new(from, next)),
                Some(piece) => {
                    if piece.color != side {
                        moves.push(Move::new(from, next));
                    }
                    break;
                }
            }
            current = next;
        }
    }
}

fn step_moves(
    board: &Board,
    from: Square,
    side: Color,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(df, dr) in offsets {
        if let Some(target) = from.offset(df, dr) {
            if board.piece_at(target).map_or(true, |piece| piece.color != side) {
                moves.push(Move::new(from, target));
            }
        }
    }
}

/// Decides which special handling a coordinate pair needs on `board`.
pub fn classify(board: &Board, mv: Move) -> MoveKind {
    match board.piece_at(mv.from) {
        Some(Piece { kind: PieceKind::King, .. }) if mv.from.file().abs_diff(mv.to.file()) == 2 => {
            MoveKind::Castling
        }
        Some(Piece { kind: PieceKind::Pawn, color }) => {
            if mv.to.row() == color.promotion_row() {
                MoveKind::Promotion
            } else if mv.from.file() != mv.to.file() && board.is_empty(mv.to) {
                MoveKind::EnPassant
            } else {
                MoveKind::Normal
            }
        }
        _ => MoveKind::Normal,
    }
}

/// En passant for the pawn on `from`, allowed only right after the enemy
/// pawn beside it made a double step.
fn en_passant_capture(
    board: &Board,
    side: Color,
    from: Square,
    last_move: Option<&MoveRecord>,
) -> Option<Move> {
    let last = last_move?;
    let enemy_pawn = Piece::new(PieceKind::Pawn, side.opposite());
    if last.piece != enemy_pawn || !last.is_double_pawn_push() {
        return None;
    }
    if board.piece_at(last.to) != Some(enemy_pawn) {
        return None;
    }
    if last.to.row() != from.row() || last.to.file().abs_diff(from.file()) != 1 {
        return None;
    }
    let target = from.offset(last.to.file() as i8 - from.file() as i8, side.forward())?;
    board.is_empty(target).then(|| Move::new(from, target))
}

/// Every en-passant capture `side` could make given the previous move.
pub fn en_passant_moves(board: &Board, side: Color, last_move: Option<&MoveRecord>) -> Vec<Move> {
    let own_pawn = Piece::new(PieceKind::Pawn, side);
    board
        .pieces()
        .filter(|(_, piece)| *piece == own_pawn)
        .filter_map(|(from, _)| en_passant_capture(board, side, from, last_move))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn position(board: &Board, side: Color) -> Position<'_> {
        Position {
            board,
            side,
            can_castle: true,
            last_move: None,
        }
    }

    #[test]
    fn test_move_notation() {
        let mv: Move = "e2e4".parse().unwrap();
        assert_eq!(mv, Move::new(sq("e2"), sq("e4")));
        assert_eq!(mv.to_string(), "e2e4");
        assert!("e2e".parse::<Move>().is_err());
        assert!("e2e9".parse::<Move>().is_err());
    }

    #[test]
    fn test_knight_in_corner() {
        let mut board = Board::empty();
        board.set(sq("a1"), Some(Piece::new(PieceKind::Knight, Color::White)));
        board.set(sq("h1"), Some(Piece::new(PieceKind::King, Color::White)));
        board.set(sq("h8"), Some(Piece::new(PieceKind::King, Color::Black)));
        board.set(sq("c2"), Some(Piece::new(PieceKind::Pawn, Color::Black)));
        let generator = MoveGenerator::new();
        let knight_moves: Vec<Move> = generator
            .generate_moves(&position(&board, Color::White))
            .into_iter()
            .filter(|mv| mv.from == sq("a1"))
            .collect();
        assert_eq!(knight_moves.len(), 2);
        assert!(knight_moves.contains(&Move::new(sq("a1"), sq("c2"))));
    }

    #[test]
    fn test_rook_blocked_by_friend_and_enemy() {
        let mut board = Board::empty();
        board.set(sq("d4"), Some(Piece::new(PieceKind::Rook, Color::White)));
        board.set(sq("d6"), Some(Piece::new(PieceKind::Pawn, Color::White)));
        board.set(sq("f4"), Some(Piece::new(PieceKind::Knight, Color::Black)));
        board.set(sq("a1"), Some(Piece::new(PieceKind::King, Color::White)));
        board.set(sq("h8"), Some(Piece::new(PieceKind::King, Color::Black)));
        let generator = MoveGenerator::new();
        let rook_moves: Vec<Move> = generator
            .generate_moves(&position(&board, Color::White))
            .into_iter()
            .filter(|mv| mv.from == sq("d4"))
            .collect();
        // d5, e4, f4 (capture), c4, b4, a4, d3, d2, d1
        assert_eq!(rook_moves.len(), 9);
        assert!(rook_moves.contains(&"d4f4".parse().unwrap()));
        assert!(!rook_moves.contains(&"d4d6".parse().unwrap()));
        assert!(!rook_moves.contains(&"d4g4".parse().unwrap()));
    }

    #[test]
    fn test_check_detection() {
        let generator = MoveGenerator::new();
        let mut board = Board::empty();
        board.set(sq("e1"), Some(Piece::new(PieceKind::King, Color::White)));
        board.set(sq("e8"), Some(Piece::new(PieceKind::King, Color::Black)));
        assert!(!generator.is_king_in_check(&board, Color::White));

        board.set(sq("d2"), Some(Piece::new(PieceKind::Pawn, Color::Black)));
        assert!(generator.is_king_in_check(&board, Color::White));
        board.set(sq("d2"), None);

        // Pawns only attack diagonally forward
        board.set(sq("e2"), Some(Piece::new(PieceKind::Pawn, Color::Black)));
        assert!(!generator.is_king_in_check(&board, Color::White));
        board.set(sq("e2"), None);
        board.set(sq("d7"), Some(Piece::new(PieceKind::Pawn, Color::White)));
        assert!(generator.is_king_in_check(&board, Color::Black));
        board.set(sq("d7"), None);

        board.set(sq("f3"), Some(Piece::new(PieceKind::Knight, Color::Black)));
        assert!(generator.is_king_in_check(&board, Color::White));
        board.set(sq("f3"), None);

        board.set(sq("b4"), Some(Piece::new(PieceKind::Bishop, Color::Black)));
        assert!(generator.is_king_in_check(&board, Color::White));
        board.set(sq("c3"), Some(Piece::new(PieceKind::Knight, Color::White)));
        assert!(!generator.is_king_in_check(&board, Color::White));

        board.set(sq("e5"), Some(Piece::new(PieceKind::Queen, Color::Black)));
        assert!(generator.is_king_in_check(&board, Color::White));
    }

    #[test]
    fn test_pinned_piece_cannot_move() {
        let mut board = Board::empty();
        board.set(sq("e1"), Some(Piece::new(PieceKind::King, Color::White)));
        board.set(sq("e2"), Some(Piece::new(PieceKind::Knight, Color::White)));
        board.set(sq("e8"), Some(Piece::new(PieceKind::Rook, Color::Black)));
        board.set(sq("a8"), Some(Piece::new(PieceKind::King, Color::Black)));
        let generator = MoveGenerator::new();
        let moves = generator.generate_moves(&position(&board, Color::White));
        assert!(moves.iter().all(|mv| mv.from != sq("e2")));
        assert!(!moves.is_empty());
    }

    #[test]
    fn test_classify() {
        let board = Board::new();
        assert_eq!(classify(&board, "e2e4".parse().unwrap()), MoveKind::Normal);
        assert_eq!(classify(&board, "e1g1".parse().unwrap()), MoveKind::Castling);

        let mut board = Board::empty();
        board.set(sq("b7"), Some(Piece::new(PieceKind::Pawn, Color::White)));
        board.set(sq("e5"), Some(Piece::new(PieceKind::Pawn, Color::White)));
        assert_eq!(classify(&board, "b7b8".parse().unwrap()), MoveKind::Promotion);
        assert_eq!(classify(&board, "e5d6".parse().unwrap()), MoveKind::EnPassant);
    }
}
