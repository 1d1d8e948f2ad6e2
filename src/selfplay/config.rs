//! Self-play cycle configuration (a subset of `TrainingConfig`).

use crate::env::RewardSchedule;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleConfig {
    pub games_per_cycle: u32,
    pub max_concurrent_games: usize,
    pub max_steps_per_game: u32,
    pub max_batches_per_cycle: Option<u32>,
    pub checkpoint_interval: u64,
    pub reward_schedule: RewardSchedule,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            games_per_cycle: 20,
            max_concurrent_games: 4,
            max_steps_per_game: 80,
            max_batches_per_cycle: None,
            checkpoint_interval: 5,
            reward_schedule: RewardSchedule::default(),
        }
    }
}
