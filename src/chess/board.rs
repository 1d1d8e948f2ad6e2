//! The board: 64 optional piece slots plus game state (spec §3).

use crate::chess::piece::{Color, Kind, Piece};
use crate::chess::position::Position;
use crate::chess::zobrist;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            white_king_side: true,
            white_queen_side: true,
            black_king_side: true,
            black_queen_side: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    squares: [Option<Piece>; 64],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    /// The square a pawn can capture onto en passant, if any.
    pub en_passant_target: Option<Position>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    /// Zobrist hashes of every position reached so far in this game, in
    /// order, used for threefold-repetition detection. Naturally bounded by
    /// game length (spec §5 forbids unbounded growth; a chess game is finite
    /// and self-play caps ply count via `maxStepsPerGame`).
    pub history: Vec<u64>,
}

impl Board {
    pub fn empty() -> Self {
        Self {
            squares: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::none(),
            en_passant_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
        }
    }

    pub fn new_game() -> Self {
        let mut board = Board::empty();
        board.castling = CastlingRights::all();

        let back_rank = [
            Kind::Rook,
            Kind::Knight,
            Kind::Bishop,
            Kind::Queen,
            Kind::King,
            Kind::Bishop,
            Kind::Knight,
            Kind::Rook,
        ];
        for (file, kind) in back_rank.iter().enumerate() {
            board.set(Position::new(0, file as i8), Some(Piece::new(*kind, Color::White)));
            board.set(Position::new(7, file as i8), Some(Piece::new(*kind, Color::Black)));
            board.set(Position::new(1, file as i8), Some(Piece::new(Kind::Pawn, Color::White)));
            board.set(Position::new(6, file as i8), Some(Piece::new(Kind::Pawn, Color::Black)));
        }
        board.history.push(board.compute_hash());
        board
    }

    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        if !pos.is_on_board() {
            return None;
        }
        self.squares[pos.index()]
    }

    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        self.squares[pos.index()] = piece;
    }

    pub fn iter_pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|p| (Position::from_index(i), p)))
    }

    /// Full recompute of the Zobrist hash from scratch. Simple and correct;
    /// the board is only 64 squares, so incremental updates are not worth
    /// the bug surface for a training core that must never silently corrupt
    /// its repetition history.
    pub fn compute_hash(&self) -> u64 {
        let mut hash = 0u64;
        for (pos, piece) in self.iter_pieces() {
            hash ^= zobrist::piece_key(piece.kind, piece.color, pos.index());
        }
        if self.side_to_move == Color::Black {
            hash ^= zobrist::black_to_move_key();
        }
        if self.castling.white_king_side {
            hash ^= zobrist::castling_key(0);
        }
        if self.castling.white_queen_side {
            hash ^= zobrist::castling_key(1);
        }
        if self.castling.black_king_side {
            hash ^= zobrist::castling_key(2);
        }
        if self.castling.black_queen_side {
            hash ^= zobrist::castling_key(3);
        }
        if let Some(ep) = self.en_passant_target {
            hash ^= zobrist::en_passant_key(ep.file as usize);
        }
        hash
    }

    pub fn current_hash(&self) -> u64 {
        *self.history.last().unwrap_or(&self.compute_hash())
    }

    pub fn repetition_count(&self) -> usize {
        let current = self.current_hash();
        self.history.iter().filter(|&&h| h == current).count()
    }
}
