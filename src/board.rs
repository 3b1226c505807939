use std::fmt;
use std::str::FromStr;

use crate::error::ChessError;
use crate::history::MoveRecord;
use crate::movegen::{Move, MoveKind};

pub const BOARD_SIZE: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Material worth in points. The king's value is a sentinel for "game won".
    pub fn value(&self) -> u32 {
        match self {
            PieceKind::Pawn => 10,
            PieceKind::Knight | PieceKind::Bishop => 30,
            PieceKind::Rook => 50,
            PieceKind::Queen => 90,
            PieceKind::King => 900,
        }
    }

    pub fn is_promotion_target(&self) -> bool {
        matches!(
            self,
            PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight
        )
    }

    fn name(&self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Rook => "rook",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a pawn advance. White sits on rows 6 and 7.
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn home_row(&self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    pub fn pawn_row(&self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    pub fn promotion_row(&self) -> u8 {
        self.opposite().home_row()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    pub fn value(&self) -> u32 {
        self.kind.value()
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.color, self.kind.name())
    }

    pub fn symbol(&self) -> char {
        let symbol = match self.kind {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        };
        match self.color {
            Color::White => symbol,
            Color::Black => symbol.to_ascii_lowercase(),
        }
    }
}

/// A board coordinate. `row` 0 is rank 8, so black starts on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    row: u8,
    file: u8,
}

impl Square {
    pub fn new(file: i16, row: i16) -> Result<Self, ChessError> {
        if !Self::within_bounds(file) {
            return Err(ChessError::InvalidCoordinate(file));
        }
        if !Self::within_bounds(row) {
            return Err(ChessError::InvalidCoordinate(row));
        }
        Ok(Self {
            file: file as u8,
            row: row as u8,
        })
    }

    /// Unchecked constructor for coordinates already known to be on the board.
    pub(crate) const fn at(file: u8, row: u8) -> Self {
        Self { file, row }
    }

    pub fn within_bounds(coord: i16) -> bool {
        (0..BOARD_SIZE as i16).contains(&coord)
    }

    pub fn file(&self) -> u8 {
        self.file
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    /// Rank as printed on a board, 1 through 8.
    pub fn rank(&self) -> u8 {
        BOARD_SIZE - self.row
    }

    pub fn offset(&self, file_delta: i8, row_delta: i8) -> Option<Square> {
        Square::new(
            self.file as i16 + file_delta as i16,
            self.row as i16 + row_delta as i16,
        )
        .ok()
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |file| Square { file, row }))
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ChessError::InvalidSquare(s.to_string());
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };
        let file = file.to_ascii_lowercase();
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return Err(invalid());
        }
        Square::new((file as u8 - b'a') as i16, (b'8' - rank as u8) as i16)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8], // indexed [row][file]
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl Board {
    pub fn new() -> Self {
        let mut board = Self::empty();
        for color in [Color::White, Color::Black] {
            for (file, kind) in BACK_RANK.iter().enumerate() {
                board.squares[color.home_row() as usize][file] = Some(Piece::new(*kind, color));
                board.squares[color.pawn_row() as usize][file] =
                    Some(Piece::new(PieceKind::Pawn, color));
            }
        }
        board
    }

    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.row as usize][square.file as usize]
    }

    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.row as usize][square.file as usize] = piece;
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |square| self.piece_at(square).map(|piece| (square, piece)))
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, piece)| *piece == Piece::new(PieceKind::King, color))
            .map(|(square, _)| square)
    }

    /// Moves the piece on `mv.from` and performs the side effects of `kind`.
    /// Returns the captured piece, if any.
    pub fn apply(&mut self, mv: Move, kind: MoveKind, promoted: Option<Piece>) -> Option<Piece> {
        let moving = self.piece_at(mv.from);
        let mut captured = self.piece_at(mv.to);

        match kind {
            MoveKind::Normal => {}
            MoveKind::Promotion => {
                self.set(mv.from, promoted.or(moving));
            }
            MoveKind::EnPassant => {
                let passed = en_passant_victim(mv);
                captured = self.piece_at(passed);
                self.set(passed, None);
            }
            MoveKind::Castling => {
                let (rook_from, rook_to) = castling_rook_squares(mv);
                let rook = self.piece_at(rook_from);
                self.set(rook_from, None);
                self.set(rook_to, rook);
            }
        }

        let piece = self.piece_at(mv.from);
        self.set(mv.from, None);
        self.set(mv.to, piece);
        captured
    }

    /// Inverse of [`Board::apply`] for the move described by `record`.
    pub fn revert(&mut self, record: &MoveRecord) {
        let mv = record.mv();
        self.set(mv.from, Some(record.piece));
        match record.kind {
            MoveKind::Normal | MoveKind::Promotion => {
                self.set(mv.to, record.captured);
            }
            MoveKind::EnPassant => {
                self.set(mv.to, None);
                self.set(en_passant_victim(mv), record.captured);
            }
            MoveKind::Castling => {
                self.set(mv.to, None);
                let (rook_from, rook_to) = castling_rook_squares(mv);
                let rook = self.piece_at(rook_to);
                self.set(rook_to, None);
                self.set(rook_from, rook);
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// The passed pawn sits beside the capturer, on the capturer's starting row.
fn en_passant_victim(mv: Move) -> Square {
    Square {
        file: mv.to.file,
        row: mv.from.row,
    }
}

fn castling_rook_squares(mv: Move) -> (Square, Square) {
    let row = mv.from.row;
    if mv.to.file > mv.from.file {
        (Square { file: 7, row }, Square { file: 5, row })
    } else {
        (Square { file: 0, row }, Square { file: 3, row })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = String::new();
        for row in 0..BOARD_SIZE {
            result.push((b'8' - row) as char);
            result.push(' ');
            for file in 0..BOARD_SIZE {
                let square = Square { file, row };
                result.push(self.piece_at(square).map_or('.', |piece| piece.symbol()));
                if file < BOARD_SIZE - 1 {
                    result.push(' ');
                }
            }
            result.push('\n');
        }
        result.push_str("  a b c d e f g h\n");
        write!(f, "{}", result)
    }
}
