use crate::board::{Board, Color, Piece, PieceKind, Square};
use crate::movegen::{self, Move, MoveKind};

/// Whether a move is part of the game or only a probe by the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    Real,
    Speculative,
}

/// Everything needed to take a move back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub kind: MoveKind,
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub promoted: Option<Piece>,
    /// The mover's castling right before the move.
    pub castling_before: bool,
    pub no_progress_before: u16,
    pub mode: ApplyMode,
}

impl MoveRecord {
    pub fn mv(&self) -> Move {
        Move::new(self.from, self.to)
    }

    pub fn color(&self) -> Color {
        self.piece.color
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub fn is_pawn_move(&self) -> bool {
        self.piece.kind == PieceKind::Pawn
    }

    /// Once one of these is played, no earlier position can come back.
    pub fn is_irreversible(&self) -> bool {
        self.kind == MoveKind::Castling || self.is_pawn_move() || self.is_capture()
    }

    pub fn is_double_pawn_push(&self) -> bool {
        self.is_pawn_move() && self.from.row().abs_diff(self.to.row()) == 2
    }
}

/// Ordered record of applied moves. Undo only ever pops the last entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    moves: Vec<MoveRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: MoveRecord) {
        self.moves.push(record);
    }

    pub fn pop(&mut self) -> Option<MoveRecord> {
        self.moves.pop()
    }

    pub fn last(&self) -> Option<&MoveRecord> {
        self.moves.last()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MoveRecord> {
        self.moves.iter()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }

    /// Walks the history backwards two plies at a time, rebuilding earlier
    /// positions with the same side to move on a scratch board, and counts
    /// how many of them match the current one. A position matches when the
    /// board, both castling rights and the available en-passant captures
    /// are identical.
    pub fn is_threefold_repetition(
        &self,
        board: &Board,
        side_to_move: Color,
        castling: [bool; 2],
    ) -> bool {
        let current_en_passant = movegen::en_passant_moves(board, side_to_move, self.last());
        let mut previous = board.clone();
        let mut rights = castling;
        let mut occurrences = 1;
        let mut remaining = self.moves.len();

        while remaining >= 2 {
            for _ in 0..2 {
                remaining -= 1;
                let record = &self.moves[remaining];
                if record.is_irreversible() {
                    return false;
                }
                previous.revert(record);
                rights[color_index(record.color())] = record.castling_before;
            }

            if previous != *board || rights != castling {
                continue;
            }
            let before = remaining.checked_sub(1).map(|index| &self.moves[index]);
            if movegen::en_passant_moves(&previous, side_to_move, before) != current_en_passant {
                continue;
            }
            occurrences += 1;
            if occurrences == 3 {
                return true;
            }
        }
        false
    }
}

pub(crate) fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}
