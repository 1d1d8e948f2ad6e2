//! Baseline evaluation: plays the trained agent (ε=0) against a fixed
//! opponent, alternating colors (spec §4.8).

pub mod baseline;

pub use baseline::Baseline;

use crate::agent::Agent;
use crate::chess::{Board, Color, GameStatus};
use crate::encoding;
use crate::seed::SeedManager;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameSide {
    AgentIsWhite,
    AgentIsBlack,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub games_played: u32,
    pub win_rate: f32,
    pub draw_rate: f32,
    pub loss_rate: f32,
    pub average_game_length: f32,
}

pub fn run_evaluation(agent: &Agent, baseline: Baseline, games: u32, max_steps_per_game: u32, seed_manager: &SeedManager) -> EvaluationReport {
    let policy = agent.eval_snapshot();
    let mut wins = 0u32;
    let mut draws = 0u32;
    let mut losses = 0u32;
    let mut total_plies = 0u64;

    for game_index in 0..games {
        let side = if game_index % 2 == 0 { GameSide::AgentIsWhite } else { GameSide::AgentIsBlack };
        let mut rng = seed_manager.eval_rng(game_index);
        let (outcome, ply_count) = play_evaluation_game(&policy, baseline, side, max_steps_per_game, &mut rng);
        total_plies += ply_count as u64;
        match outcome {
            GameStatus::WhiteWins => {
                if side == GameSide::AgentIsWhite {
                    wins += 1;
                } else {
                    losses += 1;
                }
            }
            GameStatus::BlackWins => {
                if side == GameSide::AgentIsBlack {
                    wins += 1;
                } else {
                    losses += 1;
                }
            }
            _ => draws += 1,
        }
    }

    EvaluationReport {
        games_played: games,
        win_rate: wins as f32 / games as f32,
        draw_rate: draws as f32 / games as f32,
        loss_rate: losses as f32 / games as f32,
        average_game_length: total_plies as f32 / games as f32,
    }
}

fn play_evaluation_game(
    policy: &crate::agent::FrozenPolicy,
    baseline: Baseline,
    side: GameSide,
    max_steps_per_game: u32,
    rng: &mut rand::rngs::SmallRng,
) -> (GameStatus, u32) {
    let mut board = Board::new_game();
    let mut ply = 0u32;

    loop {
        let status = crate::chess::status(&board);
        if status != GameStatus::Ongoing || ply >= max_steps_per_game {
            return (status, ply);
        }

        let agent_turn = matches!(
            (side, board.side_to_move),
            (GameSide::AgentIsWhite, Color::White) | (GameSide::AgentIsBlack, Color::Black)
        );

        let legal = crate::chess::legal_moves(&board);
        let mv = if agent_turn {
            let state = encoding::encode_state(&board);
            let legal_indices = encoding::legal_action_indices(&board);
            let action = policy
                .select_action_readonly(&state, &legal_indices, rng)
                .expect("non-terminal position always has a legal action");
            encoding::resolve_move(&board, action).expect("action drawn from legal_action_indices resolves to a legal move")
        } else {
            baseline::choose_move(baseline, &board, rng).expect("non-terminal position always has a legal move")
        };

        board = crate::chess::apply(&board, mv, &legal).expect("mv was drawn from legal_moves");
        ply += 1;
    }
}
