//! Moves. Castling is encoded as a plain king two-square move; en passant as
//! a pawn diagonal capture onto an empty square (spec §3).

use crate::chess::piece::Kind;
use crate::chess::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub promotion: Option<Kind>,
}

impl Move {
    pub fn new(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn promoting(from: Position, to: Position, kind: Kind) -> Self {
        Self {
            from,
            to,
            promotion: Some(kind),
        }
    }

    pub fn to_uci(self) -> String {
        let promo = match self.promotion {
            Some(Kind::Queen) => "q",
            Some(Kind::Rook) => "r",
            Some(Kind::Bishop) => "b",
            Some(Kind::Knight) => "n",
            _ => "",
        };
        format!(
            "{}{}{}",
            self.from.to_algebraic(),
            self.to.to_algebraic(),
            promo
        )
    }
}
