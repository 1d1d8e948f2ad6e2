//! Opponents the trained agent is scored against (spec §4.8).

use crate::chess::{self, Board, Color, Move};
use rand::rngs::SmallRng;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Baseline {
    RandomLegal,
    Minimax { depth: u32 },
    Heuristic,
}

pub fn choose_move(baseline: Baseline, board: &Board, rng: &mut SmallRng) -> Option<Move> {
    let legal = chess::legal_moves(board);
    if legal.is_empty() {
        return None;
    }
    match baseline {
        Baseline::RandomLegal => {
            let index = rng.random_range(0..legal.len());
            Some(legal[index])
        }
        Baseline::Minimax { depth } => Some(best_move_negamax(board, &legal, depth)),
        Baseline::Heuristic => Some(best_capture_move(board, &legal)),
    }
}

fn material_eval(board: &Board, side: Color) -> i32 {
    let mut score = 0;
    for (_, piece) in board.iter_pieces() {
        let value = piece.kind.material_value();
        score += if piece.color == side { value } else { -value };
    }
    score
}

/// Negamax with alpha-beta pruning, leaf evaluation by material count from
/// the side-to-move's perspective.
fn negamax(board: &Board, depth: u32, mut alpha: i32, beta: i32) -> i32 {
    let status = chess::status(board);
    if status != chess::GameStatus::Ongoing || depth == 0 {
        return match status {
            chess::GameStatus::WhiteWins => if board.side_to_move == Color::White { 100_000 } else { -100_000 },
            chess::GameStatus::BlackWins => if board.side_to_move == Color::Black { 100_000 } else { -100_000 },
            chess::GameStatus::Ongoing => material_eval(board, board.side_to_move),
            _ => 0,
        };
    }

    let legal = chess::legal_moves(board);
    let mut best = i32::MIN;
    for mv in legal {
        let next = chess::apply(board, mv, &[mv]).expect("mv drawn from legal_moves is legal by construction");
        let score = -negamax(&next, depth - 1, -beta, -alpha);
        if score > best {
            best = score;
        }
        if best > alpha {
            alpha = best;
        }
        if alpha >= beta {
            break;
        }
    }
    best
}

fn best_move_negamax(board: &Board, legal: &[Move], depth: u32) -> Move {
    let mut best_move = legal[0];
    let mut best_score = i32::MIN;
    let mut alpha = i32::MIN;
    let beta = i32::MAX;

    for &mv in legal {
        let next = chess::apply(board, mv, legal).expect("mv drawn from legal_moves is legal by construction");
        let score = -negamax(&next, depth.saturating_sub(1), -beta, -alpha);
        if score > best_score {
            best_score = score;
            best_move = mv;
        }
        if best_score > alpha {
            alpha = best_score;
        }
    }
    best_move
}

fn best_capture_move(board: &Board, legal: &[Move]) -> Move {
    let mut best_move = legal[0];
    let mut best_value = -1;
    for &mv in legal {
        let captured_value = board.piece_at(mv.to).map(|p| p.kind.material_value()).unwrap_or(0);
        if captured_value > best_value {
            best_value = captured_value;
            best_move = mv;
        }
    }
    best_move
}
