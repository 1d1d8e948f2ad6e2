//! One self-play game, played by a single worker against a frozen agent
//! snapshot. Pure inference: no weight mutation, safe to run on any thread
//! in parallel with every other in-flight game (spec §4.7 step 2-4).

use crate::agent::FrozenPolicy;
use crate::chess::Color;
use crate::env::{Environment, RewardSchedule};
use crate::replay::Experience;
use rand::rngs::SmallRng;

pub struct GameRecord {
    pub experiences: Vec<Experience>,
    pub outcome: GameOutcome,
    pub ply_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    WhiteWins,
    BlackWins,
    Draw,
}

struct PlyRecord {
    mover: Color,
    experience: Experience,
}

pub fn play_game(policy: &FrozenPolicy, max_steps_per_game: u32, reward_schedule: RewardSchedule, rng: &mut SmallRng) -> GameRecord {
    let mut env = Environment::new(max_steps_per_game, reward_schedule);
    let mut state = env.reset();
    let mut records: Vec<PlyRecord> = Vec::new();

    loop {
        if env.is_terminal() {
            break;
        }
        let mover = env.board().side_to_move;
        let legal = env.legal_actions();
        let action = match policy.select_action_readonly(&state, &legal, rng) {
            Some(a) => a,
            None => {
                // is_terminal() was false, so status() guarantees at least one
                // legal move exists; an empty legal set here means movegen and
                // status disagree, an engine bug no self-play cycle should mask.
                let err = crate::error::CoreError::EmptyLegalActions;
                debug_assert!(err.is_fatal());
                log::error!("{err}");
                panic!("{err}");
            }
        };

        let step = env
            .step(action)
            .expect("policy.select_action_readonly only returns indices drawn from legal_actions");

        records.push(PlyRecord {
            mover,
            experience: Experience {
                state: state.clone(),
                action,
                reward: step.reward,
                next_state: step.next_state.clone(),
                done: step.done,
                legal_next_actions: step.legal_next_actions.iter().copied().collect(),
            },
        });

        state = step.next_state;
        if step.done {
            break;
        }
    }

    let status = crate::chess::status(env.board());
    let step_limit_exit = env.is_terminal() && status == crate::chess::GameStatus::Ongoing;

    let outcome = if step_limit_exit {
        GameOutcome::Draw
    } else {
        match status {
            crate::chess::GameStatus::WhiteWins => GameOutcome::WhiteWins,
            crate::chess::GameStatus::BlackWins => GameOutcome::BlackWins,
            _ => GameOutcome::Draw,
        }
    };

    attribute_terminal_rewards(&mut records, outcome, step_limit_exit, reward_schedule);

    let ply_count = records.len() as u32;
    GameRecord {
        experiences: records.into_iter().map(|r| r.experience).collect(),
        outcome,
        ply_count,
    }
}

/// Forces the *last* transition made by each color to carry that color's
/// outcome reward, since only the mover whose move ended the game gets a
/// naturally-correct terminal reward from `Environment::step` — the other
/// color's final move otherwise stays at its intermediate 0.0 (spec §4.7.4).
fn attribute_terminal_rewards(records: &mut [PlyRecord], outcome: GameOutcome, step_limit_exit: bool, schedule: RewardSchedule) {
    for color in [Color::White, Color::Black] {
        if let Some(record) = records.iter_mut().rev().find(|r| r.mover == color) {
            let reward = if step_limit_exit {
                schedule.step_limit
            } else {
                match (outcome, color) {
                    (GameOutcome::WhiteWins, Color::White) | (GameOutcome::BlackWins, Color::Black) => schedule.win,
                    (GameOutcome::WhiteWins, Color::Black) | (GameOutcome::BlackWins, Color::White) => schedule.loss,
                    (GameOutcome::Draw, _) => schedule.draw,
                }
            };
            record.experience.reward = reward;
            record.experience.done = true;
            record.experience.legal_next_actions.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ply(mover: Color) -> PlyRecord {
        PlyRecord {
            mover,
            experience: Experience {
                state: vec![0.0],
                action: 0,
                reward: 0.0,
                next_state: vec![0.0],
                done: false,
                legal_next_actions: vec![0],
            },
        }
    }

    /// spec's reward-attribution example: a three-ply game (white, black,
    /// white) ending in white's win gives the last white transition
    /// `winReward`, the last black transition `lossReward`, and leaves the
    /// earlier transition at 0.
    #[test]
    fn three_ply_white_win_attributes_terminal_rewards_to_each_colors_last_move() {
        let mut records = vec![ply(Color::White), ply(Color::Black), ply(Color::White)];
        let schedule = RewardSchedule::default();
        attribute_terminal_rewards(&mut records, GameOutcome::WhiteWins, false, schedule);

        assert_eq!(records[0].experience.reward, 0.0);
        assert_eq!(records[1].experience.reward, schedule.loss);
        assert_eq!(records[2].experience.reward, schedule.win);
        assert!(!records[0].experience.done);
        assert!(records[1].experience.done);
        assert!(records[2].experience.done);
    }

    #[test]
    fn step_limit_exit_gives_every_colors_last_move_the_step_limit_penalty() {
        let mut records = vec![ply(Color::White), ply(Color::Black)];
        let schedule = RewardSchedule::default();
        attribute_terminal_rewards(&mut records, GameOutcome::Draw, true, schedule);

        assert_eq!(records[0].experience.reward, schedule.step_limit);
        assert_eq!(records[1].experience.reward, schedule.step_limit);
    }
}
