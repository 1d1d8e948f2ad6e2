//! The DQN agent: epsilon-greedy action selection with legal-action masking,
//! Double-DQN (or standard) target computation, and target-network sync
//! (spec §4.6).

pub mod config;

pub use config::AgentConfig;

use crate::encoding::ACTION_SPACE_SIZE;
use crate::error::CoreResult;
use crate::nn::{argmax_masked, batch_from_rows, LossKind, Network, OptimizerState};
use crate::replay::Experience;
use rand::rngs::SmallRng;
use rand::Rng;
use std::collections::BTreeSet;

pub struct UpdateStats {
    pub loss: f32,
    pub grad_norm: f32,
    pub mean_target: f32,
    pub nonzero_reward_fraction: f32,
}

pub struct Agent {
    pub online: Network,
    pub target: Network,
    optimizer: OptimizerState,
    config: AgentConfig,
    pub epsilon: f32,
    updates_since_sync: u64,
}

fn legal_mask(legal: &BTreeSet<u16>) -> Vec<bool> {
    let mut mask = vec![false; ACTION_SPACE_SIZE];
    for &index in legal {
        mask[index as usize] = true;
    }
    mask
}

impl Agent {
    pub fn new(online: Network, target: Network, optimizer: OptimizerState, config: AgentConfig) -> Self {
        let epsilon = config.exploration_rate;
        Self {
            online,
            target,
            optimizer,
            config,
            epsilon,
            updates_since_sync: 0,
        }
    }

    /// Epsilon-greedy selection over `legal`, ties broken in index order
    /// (the argmax helper returns the first maximal index it scans).
    pub fn select_action(&mut self, state: &[f32], legal: &BTreeSet<u16>, rng: &mut SmallRng) -> Option<u16> {
        if legal.is_empty() {
            return None;
        }
        if rng.random::<f32>() < self.epsilon {
            let choice = rng.random_range(0..legal.len());
            return legal.iter().nth(choice).copied();
        }
        let q_values = self.online.predict_single(state);
        let mask = legal_mask(legal);
        argmax_masked(&q_values, &mask).map(|index| index as u16)
    }


    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.exploration_decay).max(self.config.exploration_floor);
    }

    pub fn is_warmed_up(&self, buffer_size: usize) -> bool {
        buffer_size >= self.config.batch_size
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn optimizer_state(&self) -> &OptimizerState {
        &self.optimizer
    }

    pub fn optimizer_step(&self) -> u64 {
        self.optimizer.step
    }

    pub fn updates_since_sync(&self) -> u64 {
        self.updates_since_sync
    }

    /// Rebuilds an agent from checkpointed parts (networks, optimizer state
    /// including its step counter, and the epsilon reached at save time).
    pub fn from_checkpoint(
        online: Network,
        target: Network,
        optimizer: OptimizerState,
        config: AgentConfig,
        epsilon: f32,
        updates_since_sync: u64,
    ) -> Self {
        Self {
            online,
            target,
            optimizer,
            config,
            epsilon,
            updates_since_sync,
        }
    }

    /// Batch update: builds the Double-DQN (or standard) target vector for
    /// each sampled experience, trains the online network one step with
    /// Huber loss, and periodically hard-syncs the target network.
    pub fn update(&mut self, batch: &[&Experience]) -> CoreResult<UpdateStats> {
        let states: Vec<Vec<f32>> = batch.iter().map(|e| e.state.clone()).collect();
        let next_states: Vec<Vec<f32>> = batch.iter().map(|e| e.next_state.clone()).collect();

        let state_batch = batch_from_rows(&states);
        let next_state_batch = batch_from_rows(&next_states);

        // Bootstrap values come from a pass over next-states, computed before
        // the forward pass this update trains on (the online net's weights
        // must not move between building targets and training against them).
        let online_next_q = self.online.forward(&next_state_batch);
        let target_next_q = self.target.forward(&next_state_batch);

        let mut nonzero_rewards = 0usize;
        let mut target_sum = 0.0f32;
        let mut bootstraps = Vec::with_capacity(batch.len());

        for (col, experience) in batch.iter().enumerate() {
            if experience.reward != 0.0 {
                nonzero_rewards += 1;
            }

            let y = if experience.done {
                experience.reward
            } else {
                let legal: BTreeSet<u16> = experience.legal_next_actions.iter().copied().collect();
                let mask = legal_mask(&legal);
                let selector_col: Vec<f32> = if self.config.double_dqn {
                    online_next_q.column(col).to_vec()
                } else {
                    target_next_q.column(col).to_vec()
                };
                let best_action = argmax_masked(&selector_col, &mask);
                let bootstrap = match best_action {
                    Some(a) => target_next_q[[a, col]],
                    None => 0.0,
                };
                experience.reward + self.config.gamma * bootstrap
            };

            target_sum += y;
            bootstraps.push(y);
        }

        // Forward pass this update actually trains on.
        let predictions = self.online.forward(&state_batch);
        let mut targets = predictions.clone();
        for (col, experience) in batch.iter().enumerate() {
            targets[[experience.action as usize, col]] = bootstraps[col];
        }

        let loss = self.online.backward_batch(&predictions, &targets, LossKind::Huber);

        let lr = self.config.lr_schedule.lr_at(self.config.learning_rate, self.optimizer.step);
        let grad_norm = self.online.update_weights(&mut self.optimizer, lr, self.config.l2_lambda, self.config.max_grad_norm)?;

        self.updates_since_sync += 1;
        if self.updates_since_sync >= self.config.target_update_frequency {
            self.online.copy_to(&mut self.target);
            self.updates_since_sync = 0;
        }

        Ok(UpdateStats {
            loss,
            grad_norm,
            mean_target: target_sum / batch.len() as f32,
            nonzero_reward_fraction: nonzero_rewards as f32 / batch.len() as f32,
        })
    }

    pub fn soft_sync_target(&mut self, tau: f32) {
        self.target.soft_update_from(&self.online, tau);
    }

    /// A frozen copy of the current online network plus epsilon, safe to
    /// share read-only across self-play's parallel game workers for the
    /// whole cycle (spec §4.7 step 1: freeze-per-cycle is the default).
    pub fn snapshot(&self) -> FrozenPolicy {
        FrozenPolicy {
            online: self.online.clone(),
            epsilon: self.epsilon,
        }
    }

    /// Greedy (ε=0) snapshot, used for baseline evaluation (spec §4.8).
    pub fn eval_snapshot(&self) -> FrozenPolicy {
        FrozenPolicy {
            online: self.online.clone(),
            epsilon: 0.0,
        }
    }
}

/// Read-only, clonable view of an agent's policy used during the
/// game-generation phase of a self-play cycle. Carries no optimizer state.
pub struct FrozenPolicy {
    online: Network,
    epsilon: f32,
}

impl FrozenPolicy {
    pub fn select_action_readonly(&self, state: &[f32], legal: &BTreeSet<u16>, rng: &mut SmallRng) -> Option<u16> {
        if legal.is_empty() {
            return None;
        }
        if rng.random::<f32>() < self.epsilon {
            let choice = rng.random_range(0..legal.len());
            return legal.iter().nth(choice).copied();
        }
        let q_values = self.online.predict_single_inference(state);
        let mask = legal_mask(legal);
        argmax_masked(&q_values, &mask).map(|index| index as u16)
    }
}
