//! The chess environment adapter: wraps the chess engine behind a generic
//! `reset`/`step`/`legal_actions` contract the DQN agent and self-play loop
//! consume (spec §4.3).

use crate::chess::{self, Board, Color, GameStatus};
use crate::encoding::{self, ACTION_SPACE_SIZE};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardSchedule {
    pub win: f32,
    pub loss: f32,
    pub draw: f32,
    pub step_limit: f32,
}

impl Default for RewardSchedule {
    fn default() -> Self {
        Self {
            win: 1.0,
            loss: -1.0,
            draw: -0.2,
            step_limit: -1.0,
        }
    }
}

pub struct StepResult {
    pub next_state: Vec<f32>,
    pub reward: f32,
    pub done: bool,
    pub legal_next_actions: BTreeSet<u16>,
}

pub struct Environment {
    board: Board,
    ply_count: u32,
    max_steps_per_game: u32,
    reward_schedule: RewardSchedule,
}

impl Environment {
    pub fn new(max_steps_per_game: u32, reward_schedule: RewardSchedule) -> Self {
        Self {
            board: Board::new_game(),
            ply_count: 0,
            max_steps_per_game,
            reward_schedule,
        }
    }

    pub fn reset(&mut self) -> Vec<f32> {
        self.board = Board::new_game();
        self.ply_count = 0;
        encoding::encode_state(&self.board)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_state(&self) -> Vec<f32> {
        encoding::encode_state(&self.board)
    }

    pub fn legal_actions(&self) -> BTreeSet<u16> {
        encoding::legal_action_indices(&self.board)
    }

    pub fn is_terminal(&self) -> bool {
        chess::status(&self.board) != GameStatus::Ongoing || self.ply_count >= self.max_steps_per_game
    }

    /// Decodes `action`, applies it, and reports the reward from the
    /// perspective of the side that just moved.
    pub fn step(&mut self, action: u16) -> CoreResult<StepResult> {
        let mover = self.board.side_to_move;
        let legal = chess::legal_moves(&self.board);
        let mv = encoding::resolve_move(&self.board, action).ok_or(CoreError::IllegalAction(action))?;

        self.board = chess::apply(&self.board, mv, &legal)?;
        self.ply_count += 1;

        let status = chess::status(&self.board);
        let step_limit_hit = self.ply_count >= self.max_steps_per_game && status == GameStatus::Ongoing;
        let done = status != GameStatus::Ongoing || step_limit_hit;

        let reward = if step_limit_hit {
            self.reward_schedule.step_limit
        } else {
            match status {
                GameStatus::Ongoing => 0.0,
                GameStatus::WhiteWins => {
                    if mover == Color::White {
                        self.reward_schedule.win
                    } else {
                        self.reward_schedule.loss
                    }
                }
                GameStatus::BlackWins => {
                    if mover == Color::Black {
                        self.reward_schedule.win
                    } else {
                        self.reward_schedule.loss
                    }
                }
                GameStatus::DrawStalemate
                | GameStatus::DrawInsufficientMaterial
                | GameStatus::DrawFiftyMove
                | GameStatus::DrawRepetition => self.reward_schedule.draw,
            }
        };

        Ok(StepResult {
            next_state: encoding::encode_state(&self.board),
            reward,
            done,
            legal_next_actions: if done { BTreeSet::new() } else { self.legal_actions() },
        })
    }
}

pub const STATE_ACTION_SPACE: usize = ACTION_SPACE_SIZE;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_returns_startpos_state() {
        let mut env = Environment::new(80, RewardSchedule::default());
        let state = env.reset();
        assert_eq!(state.len(), crate::encoding::STATE_SIZE);
    }

    #[test]
    fn illegal_action_is_rejected() {
        let mut env = Environment::new(80, RewardSchedule::default());
        env.reset();
        let illegal = encoding::encode_action(crate::chess::Move::new(
            crate::chess::Position::new(3, 3),
            crate::chess::Position::new(4, 4),
        ));
        assert!(matches!(env.step(illegal), Err(CoreError::IllegalAction(_))));
    }

    #[test]
    fn step_limit_applies_penalty_not_draw_reward() {
        let mut env = Environment::new(1, RewardSchedule::default());
        env.reset();
        let action = *env.legal_actions().iter().next().unwrap();
        let result = env.step(action).unwrap();
        assert!(result.done);
        assert_eq!(result.reward, RewardSchedule::default().step_limit);
    }
}
