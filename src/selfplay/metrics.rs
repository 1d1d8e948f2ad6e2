//! Per-cycle metrics record exposed to callers (spec §6 external outputs).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleMetrics {
    pub cycle: u64,
    pub games_played: u32,
    pub white_wins: u32,
    pub draws: u32,
    pub black_wins: u32,
    pub average_game_length: f32,
    pub mean_loss: f32,
    pub mean_grad_norm: f32,
    pub buffer_size: usize,
    pub epsilon: f32,
}
