//! The full set of knobs the training core exposes (spec §6). Parsing this
//! from a CLI or config file is explicitly out of scope for the core itself
//! (that belongs to the binaries in `src/bin/`); this module owns the
//! struct, its defaults, and validation.

use crate::agent::AgentConfig;
use crate::error::{CoreError, CoreResult};
use crate::eval::Baseline;
use crate::selfplay::CycleConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub agent: AgentConfig,
    pub cycles: CycleConfig,
    pub max_cycles: u64,
    pub max_experience_buffer: usize,
    pub evaluation_games: u32,
    pub baseline_depth: u32,
    /// `None` means nondeterministic: the run draws a fresh master seed from
    /// the OS (see `SeedManager::from_entropy`) instead of a fixed one.
    pub seed: Option<u64>,
    pub checkpoint_directory: String,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            cycles: CycleConfig::default(),
            max_cycles: 100,
            max_experience_buffer: 50_000,
            evaluation_games: 100,
            baseline_depth: 2,
            seed: None,
            checkpoint_directory: "checkpoints".to_string(),
        }
    }
}

impl TrainingConfig {
    /// Rejects combinations that would make the core misbehave silently
    /// rather than fail fast (spec §6: validated, not parsed, by the core).
    pub fn validate(&self) -> CoreResult<()> {
        if self.agent.batch_size == 0 {
            return Err(CoreError::InvalidConfig("agent.batch_size must be greater than zero".to_string()));
        }
        if self.agent.batch_size > self.max_experience_buffer {
            return Err(CoreError::InvalidConfig("agent.batch_size cannot exceed max_experience_buffer".to_string()));
        }
        if self.cycles.games_per_cycle == 0 {
            return Err(CoreError::InvalidConfig("cycles.games_per_cycle must be greater than zero".to_string()));
        }
        if self.cycles.max_concurrent_games == 0 {
            return Err(CoreError::InvalidConfig("cycles.max_concurrent_games must be greater than zero".to_string()));
        }
        if self.cycles.checkpoint_interval == 0 {
            return Err(CoreError::InvalidConfig("cycles.checkpoint_interval must be greater than zero".to_string()));
        }
        if !(0.0..=1.0).contains(&self.agent.gamma) {
            return Err(CoreError::InvalidConfig("agent.gamma must be in [0, 1]".to_string()));
        }
        if self.agent.exploration_floor > self.agent.exploration_rate {
            return Err(CoreError::InvalidConfig("agent.exploration_floor cannot exceed agent.exploration_rate".to_string()));
        }
        if self.evaluation_games == 0 {
            return Err(CoreError::InvalidConfig("evaluation_games must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn evaluation_baseline(&self) -> Baseline {
        Baseline::Minimax { depth: self.baseline_depth }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(TrainingConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut config = TrainingConfig::default();
        config.agent.batch_size = 0;
        assert!(matches!(config.validate(), Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn oversized_batch_size_is_rejected() {
        let mut config = TrainingConfig::default();
        config.max_experience_buffer = 10;
        config.agent.batch_size = 64;
        assert!(matches!(config.validate(), Err(CoreError::InvalidConfig(_))));
    }
}
