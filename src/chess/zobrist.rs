//! Zobrist hashing for repetition detection (spec §9: "use canonical hashes
//! keyed by piece placements, side to move, castling rights, and en-passant
//! file; store hashes in history, not board copies").
//!
//! The key table is generated once from a fixed internal seed so hashes are
//! stable across processes and runs — required for the determinism property
//! in spec §8 (byte-identical checkpoints need byte-identical history hashes).

use crate::chess::piece::{Color, Kind};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::OnceLock;

const ZOBRIST_SEED: u64 = 0x5EED_CAFE_D00D_0001;

pub struct ZobristTable {
    /// [kind][color][square]
    piece_keys: [[[u64; 64]; 2]; 6],
    castling_keys: [u64; 4],
    en_passant_keys: [u64; 8],
    black_to_move_key: u64,
}

fn kind_index(kind: Kind) -> usize {
    match kind {
        Kind::Pawn => 0,
        Kind::Knight => 1,
        Kind::Bishop => 2,
        Kind::Rook => 3,
        Kind::Queen => 4,
        Kind::King => 5,
    }
}

fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

fn build_table() -> ZobristTable {
    let mut rng = SmallRng::seed_from_u64(ZOBRIST_SEED);
    let mut piece_keys = [[[0u64; 64]; 2]; 6];
    for kind in piece_keys.iter_mut() {
        for color in kind.iter_mut() {
            for square in color.iter_mut() {
                *square = rng.random();
            }
        }
    }
    let mut castling_keys = [0u64; 4];
    for key in castling_keys.iter_mut() {
        *key = rng.random();
    }
    let mut en_passant_keys = [0u64; 8];
    for key in en_passant_keys.iter_mut() {
        *key = rng.random();
    }
    ZobristTable {
        piece_keys,
        castling_keys,
        en_passant_keys,
        black_to_move_key: rng.random(),
    }
}

static TABLE: OnceLock<ZobristTable> = OnceLock::new();

fn table() -> &'static ZobristTable {
    TABLE.get_or_init(build_table)
}

pub fn piece_key(kind: Kind, color: Color, square_index: usize) -> u64 {
    table().piece_keys[kind_index(kind)][color_index(color)][square_index]
}

/// `slot` in 0..4: White-K, White-Q, Black-K, Black-Q.
pub fn castling_key(slot: usize) -> u64 {
    table().castling_keys[slot]
}

pub fn en_passant_key(file: usize) -> u64 {
    table().en_passant_keys[file]
}

pub fn black_to_move_key() -> u64 {
    table().black_to_move_key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_stable_across_calls() {
        let a = piece_key(Kind::Pawn, Color::White, 0);
        let b = piece_key(Kind::Pawn, Color::White, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_squares_differ() {
        assert_ne!(
            piece_key(Kind::Pawn, Color::White, 0),
            piece_key(Kind::Pawn, Color::White, 1)
        );
    }
}
