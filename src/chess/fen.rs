//! FEN import/export. Parse errors name the offending field (spec §4.1).

use crate::chess::board::{Board, CastlingRights};
use crate::chess::piece::{Color, Kind};
use crate::chess::position::Position;
use crate::error::{CoreError, CoreResult};

fn fen_err(field: &str, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidFen {
        field: field.to_string(),
        reason: reason.into(),
    }
}

pub fn from_fen(fen: &str) -> CoreResult<Board> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(fen_err("record", "expected at least 4 space-separated fields"));
    }

    let mut board = Board::empty();
    parse_placement(fields[0], &mut board)?;
    board.side_to_move = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(fen_err("side to move", format!("expected 'w' or 'b', got '{other}'"))),
    };
    board.castling = parse_castling(fields[2])?;
    board.en_passant_target = parse_en_passant(fields[3])?;

    board.halfmove_clock = match fields.get(4) {
        Some(s) => s.parse().map_err(|_| fen_err("halfmove clock", format!("'{s}' is not a number")))?,
        None => 0,
    };
    board.fullmove_number = match fields.get(5) {
        Some(s) => s.parse().map_err(|_| fen_err("fullmove number", format!("'{s}' is not a number")))?,
        None => 1,
    };

    validate_kings(&board)?;
    validate_castling_rights(&board)?;
    board.history = vec![board.compute_hash()];
    Ok(board)
}

fn parse_placement(placement: &str, board: &mut Board) -> CoreResult<()> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(fen_err("piece placement", format!("expected 8 ranks, got {}", ranks.len())));
    }
    for (rank_from_top, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_from_top as i8;
        let mut file = 0i8;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as i8;
                if file > 8 {
                    return Err(fen_err("piece placement", format!("rank '{rank_str}' overflows 8 files")));
                }
                continue;
            }
            if file >= 8 {
                return Err(fen_err("piece placement", format!("rank '{rank_str}' overflows 8 files")));
            }
            let (kind, color) = Kind::from_fen_char(c)
                .ok_or_else(|| fen_err("piece placement", format!("unrecognized piece char '{c}'")))?;
            board.set(Position::new(rank, file), Some(crate::chess::piece::Piece::new(kind, color)));
            file += 1;
        }
        if file != 8 {
            return Err(fen_err("piece placement", format!("rank '{rank_str}' does not sum to 8 files")));
        }
    }
    Ok(())
}

fn parse_castling(field: &str) -> CoreResult<CastlingRights> {
    if field == "-" {
        return Ok(CastlingRights::none());
    }
    let mut rights = CastlingRights::none();
    for c in field.chars() {
        match c {
            'K' => rights.white_king_side = true,
            'Q' => rights.white_queen_side = true,
            'k' => rights.black_king_side = true,
            'q' => rights.black_queen_side = true,
            other => return Err(fen_err("castling availability", format!("unrecognized flag '{other}'"))),
        }
    }
    Ok(rights)
}

fn parse_en_passant(field: &str) -> CoreResult<Option<Position>> {
    if field == "-" {
        return Ok(None);
    }
    Position::from_algebraic(field)
        .map(Some)
        .ok_or_else(|| fen_err("en passant target", format!("'{field}' is not a valid square")))
}

fn validate_kings(board: &Board) -> CoreResult<()> {
    let mut white_kings = 0;
    let mut black_kings = 0;
    for (_, piece) in board.iter_pieces() {
        if piece.kind == Kind::King {
            match piece.color {
                Color::White => white_kings += 1,
                Color::Black => black_kings += 1,
            }
        }
    }
    if white_kings != 1 || black_kings != 1 {
        return Err(fen_err(
            "piece placement",
            format!("expected exactly one king per side, found {white_kings} white and {black_kings} black"),
        ));
    }
    Ok(())
}

/// Rejects a claimed castling flag whose king or rook isn't on its home
/// square (spec §4.1: bad castling flags are a semantic FEN error).
fn validate_castling_rights(board: &Board) -> CoreResult<()> {
    let has_piece = |pos: Position, color: Color, kind: Kind| matches!(board.piece_at(pos), Some(p) if p.color == color && p.kind == kind);

    let checks = [
        (board.castling.white_king_side, "K", Color::White, Position::new(0, 4), Position::new(0, 7)),
        (board.castling.white_queen_side, "Q", Color::White, Position::new(0, 4), Position::new(0, 0)),
        (board.castling.black_king_side, "k", Color::Black, Position::new(7, 4), Position::new(7, 7)),
        (board.castling.black_queen_side, "q", Color::Black, Position::new(7, 4), Position::new(7, 0)),
    ];

    for (claimed, flag, color, king_square, rook_square) in checks {
        if claimed && !(has_piece(king_square, color, Kind::King) && has_piece(rook_square, color, Kind::Rook)) {
            return Err(fen_err(
                "castling availability",
                format!("flag '{flag}' claimed but king/rook are not on their home squares"),
            ));
        }
    }
    Ok(())
}

pub fn to_fen(board: &Board) -> String {
    let mut ranks = Vec::with_capacity(8);
    for rank in (0..8).rev() {
        let mut rank_str = String::new();
        let mut empty_run = 0;
        for file in 0..8 {
            match board.piece_at(Position::new(rank, file)) {
                None => empty_run += 1,
                Some(piece) => {
                    if empty_run > 0 {
                        rank_str.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    rank_str.push(piece.kind.to_fen_char(piece.color));
                }
            }
        }
        if empty_run > 0 {
            rank_str.push_str(&empty_run.to_string());
        }
        ranks.push(rank_str);
    }
    let placement = ranks.join("/");

    let side = match board.side_to_move {
        Color::White => "w",
        Color::Black => "b",
    };

    let mut castling = String::new();
    if board.castling.white_king_side {
        castling.push('K');
    }
    if board.castling.white_queen_side {
        castling.push('Q');
    }
    if board.castling.black_king_side {
        castling.push('k');
    }
    if board.castling.black_queen_side {
        castling.push('q');
    }
    if castling.is_empty() {
        castling.push('-');
    }

    let en_passant = board
        .en_passant_target
        .map(|p| p.to_algebraic())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{} {} {} {} {} {}",
        placement, side, castling, en_passant, board.halfmove_clock, board.fullmove_number
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn startpos_roundtrips() {
        let board = from_fen(STARTPOS).unwrap();
        assert_eq!(to_fen(&board), STARTPOS);
    }

    #[test]
    fn missing_king_is_rejected() {
        let fen = "8/8/8/8/8/8/8/K7 w - - 0 1";
        assert!(from_fen(fen).is_err());
    }

    #[test]
    fn malformed_rank_is_rejected() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN w KQkq - 0 1";
        assert!(from_fen(fen).is_err());
    }
}
