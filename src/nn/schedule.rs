//! Learning-rate schedules, applied per policy update (the time base `t`
//! used throughout is the number of completed `update_weights` calls).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LrSchedule {
    Constant,
    Exponential { decay_rate: f32, decay_steps: u64 },
    Step { gamma: f32, step_size: u64 },
    Linear { floor: f32, decay_steps: u64 },
}

impl LrSchedule {
    pub fn lr_at(self, base_lr: f32, t: u64) -> f32 {
        match self {
            LrSchedule::Constant => base_lr,
            LrSchedule::Exponential { decay_rate, decay_steps } => {
                base_lr * decay_rate.powf(t as f32 / decay_steps.max(1) as f32)
            }
            LrSchedule::Step { gamma, step_size } => {
                let exponent = (t / step_size.max(1)) as i32;
                base_lr * gamma.powi(exponent)
            }
            LrSchedule::Linear { floor, decay_steps } => {
                let fraction = (t as f32 / decay_steps.max(1) as f32).min(1.0);
                base_lr + (floor - base_lr) * fraction
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_schedule_never_decays() {
        assert_eq!(LrSchedule::Constant.lr_at(0.01, 1_000_000), 0.01);
    }

    #[test]
    fn linear_schedule_reaches_floor() {
        let schedule = LrSchedule::Linear { floor: 0.0, decay_steps: 100 };
        assert_eq!(schedule.lr_at(0.01, 200), 0.0);
    }
}
