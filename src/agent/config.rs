//! DQN hyperparameters. A subset of `TrainingConfig` (see `config.rs`) the
//! agent needs directly, kept separate so `Agent` can be constructed and
//! unit-tested without the rest of the training configuration.

use crate::nn::LrSchedule;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub hidden_layers: Vec<usize>,
    pub learning_rate: f32,
    /// Modulates `learning_rate` over completed optimizer steps (spec §4.4).
    pub lr_schedule: LrSchedule,
    pub batch_size: usize,
    pub gamma: f32,
    pub exploration_rate: f32,
    pub exploration_decay: f32,
    pub exploration_floor: f32,
    pub target_update_frequency: u64,
    pub double_dqn: bool,
    pub max_grad_norm: f32,
    pub l2_lambda: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![512, 256, 128],
            learning_rate: 0.001,
            lr_schedule: LrSchedule::Constant,
            batch_size: 64,
            gamma: 0.99,
            exploration_rate: 0.1,
            exploration_decay: 0.995,
            exploration_floor: 0.01,
            target_update_frequency: 100,
            double_dqn: true,
            max_grad_norm: 1.0,
            l2_lambda: 0.0,
        }
    }
}
