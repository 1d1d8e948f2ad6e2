//! The self-play training loop: per cycle, play games in parallel against a
//! frozen policy snapshot, then train sequentially against the replay
//! buffer (spec §4.7).

pub mod config;
pub mod metrics;
pub mod worker;

pub use config::CycleConfig;
pub use metrics::CycleMetrics;
pub use worker::{GameOutcome, GameRecord};

use crate::agent::Agent;
use crate::error::CoreResult;
use crate::replay::ReplayBuffer;
use crate::seed::SeedManager;
use rayon::prelude::*;
use rayon::ThreadPool;

pub struct SelfPlayLoop {
    config: CycleConfig,
    pool: ThreadPool,
}

impl SelfPlayLoop {
    pub fn new(config: CycleConfig) -> Self {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_concurrent_games)
            .build()
            .expect("thread pool construction should not fail for a positive thread count");
        Self { config, pool }
    }

    /// Runs one cycle: game-generation phase (parallel, frozen policy) then
    /// policy-update phase (sequential, live online network).
    pub fn run_cycle(&self, cycle: u64, agent: &mut Agent, buffer: &mut ReplayBuffer, seed_manager: &SeedManager) -> CoreResult<CycleMetrics> {
        let records = self.play_games(cycle, agent, seed_manager);

        let games_played = records.len() as u32;
        let mut white_wins = 0;
        let mut black_wins = 0;
        let mut draws = 0;
        let mut total_plies = 0u64;
        for record in &records {
            match record.outcome {
                GameOutcome::WhiteWins => white_wins += 1,
                GameOutcome::BlackWins => black_wins += 1,
                GameOutcome::Draw => draws += 1,
            }
            total_plies += record.ply_count as u64;
        }

        // Single writer after join: flatten in worker-id order, which is
        // exactly the order `into_par_iter` + `collect` preserves regardless
        // of completion timing (spec §4.7 step 5).
        for record in records {
            buffer.extend(record.experiences);
        }

        let mut replay_rng = seed_manager.replay_rng(cycle);
        let mut batches_trained = 0u32;
        let mut loss_sum = 0.0f32;
        let mut grad_norm_sum = 0.0f32;
        let batch_size = agent.batch_size();
        let batch_cap = self.config.max_batches_per_cycle.unwrap_or(u32::MAX);

        while batches_trained < batch_cap && agent.is_warmed_up(buffer.size()) {
            let sampled = match buffer.sample(batch_size, &mut replay_rng) {
                Ok(sampled) => sampled,
                Err(err) => {
                    log::warn!("stopping training phase early at cycle {cycle}: {err}");
                    break;
                }
            };
            let stats = agent.update(&sampled)?;
            loss_sum += stats.loss;
            grad_norm_sum += stats.grad_norm;
            batches_trained += 1;
        }

        agent.decay_epsilon();

        Ok(CycleMetrics {
            cycle,
            games_played,
            white_wins,
            draws,
            black_wins,
            average_game_length: if games_played > 0 { total_plies as f32 / games_played as f32 } else { 0.0 },
            mean_loss: if batches_trained > 0 { loss_sum / batches_trained as f32 } else { 0.0 },
            mean_grad_norm: if batches_trained > 0 { grad_norm_sum / batches_trained as f32 } else { 0.0 },
            buffer_size: buffer.size(),
            epsilon: agent.epsilon,
        })
    }

    fn play_games(&self, cycle: u64, agent: &Agent, seed_manager: &SeedManager) -> Vec<GameRecord> {
        let policy = agent.snapshot();
        let games_per_cycle = self.config.games_per_cycle;
        let max_steps_per_game = self.config.max_steps_per_game;
        let reward_schedule = self.config.reward_schedule;

        self.pool.install(|| {
            (0..games_per_cycle)
                .into_par_iter()
                .map(|worker_id| {
                    let mut rng = seed_manager.worker_rng(cycle, worker_id);
                    worker::play_game(&policy, max_steps_per_game, reward_schedule, &mut rng)
                })
                .collect()
        })
    }

    pub fn should_checkpoint(&self, cycle: u64) -> bool {
        cycle > 0 && cycle % self.config.checkpoint_interval == 0
    }
}

/// Runs cycles `1..=max_cycles`, stopping early (after flushing the last
/// completed cycle) if `cancelled` reports true at a cycle boundary — never
/// mid-cycle (spec §4.7 cancellation contract).
pub fn run<F, C>(
    loop_driver: &SelfPlayLoop,
    agent: &mut Agent,
    buffer: &mut ReplayBuffer,
    seed_manager: &SeedManager,
    max_cycles: u64,
    mut cancelled: C,
    mut on_cycle_complete: F,
) -> CoreResult<()>
where
    F: FnMut(&CycleMetrics, &Agent) -> CoreResult<()>,
    C: FnMut() -> bool,
{
    for cycle in 1..=max_cycles {
        if cancelled() {
            return Err(crate::error::CoreError::Cancelled);
        }
        let metrics = loop_driver.run_cycle(cycle, agent, buffer, seed_manager)?;
        on_cycle_complete(&metrics, agent)?;
    }
    Ok(())
}
