//! Bounded FIFO experience replay with uniform random sampling (spec §4.5).

use rand::rngs::SmallRng;
use rand::seq::index::sample;
use std::collections::VecDeque;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Experience {
    pub state: Vec<f32>,
    pub action: u16,
    pub reward: f32,
    pub next_state: Vec<f32>,
    pub done: bool,
    pub legal_next_actions: Vec<u16>,
}

pub struct ReplayBuffer {
    capacity: usize,
    items: VecDeque<Experience>,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    /// Amortized O(1): evicts the oldest entry once at capacity.
    pub fn push(&mut self, experience: Experience) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(experience);
    }

    pub fn extend(&mut self, experiences: impl IntoIterator<Item = Experience>) {
        for experience in experiences {
            self.push(experience);
        }
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Draws `k` distinct experiences uniformly at random, without replacement.
    pub fn sample(&self, k: usize, rng: &mut SmallRng) -> CoreResult<Vec<&Experience>> {
        if k > self.items.len() {
            return Err(CoreError::BufferUnderflow {
                requested: k,
                available: self.items.len(),
            });
        }
        Ok(sample(rng, self.items.len(), k)
            .into_iter()
            .map(|index| &self.items[index])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn dummy(reward: f32) -> Experience {
        Experience {
            state: vec![0.0],
            action: 0,
            reward,
            next_state: vec![0.0],
            done: false,
            legal_next_actions: vec![0],
        }
    }

    #[test]
    fn push_beyond_capacity_evicts_oldest() {
        let mut buffer = ReplayBuffer::new(2);
        buffer.push(dummy(1.0));
        buffer.push(dummy(2.0));
        buffer.push(dummy(3.0));
        assert_eq!(buffer.size(), 2);
        assert_eq!(buffer.items[0].reward, 2.0);
        assert_eq!(buffer.items[1].reward, 3.0);
    }

    #[test]
    fn sample_more_than_available_errors() {
        let mut buffer = ReplayBuffer::new(10);
        buffer.push(dummy(1.0));
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(matches!(buffer.sample(5, &mut rng), Err(CoreError::BufferUnderflow { .. })));
    }

    #[test]
    fn sample_returns_distinct_indices() {
        let mut buffer = ReplayBuffer::new(10);
        for i in 0..10 {
            buffer.push(dummy(i as f32));
        }
        let mut rng = SmallRng::seed_from_u64(42);
        let sampled = buffer.sample(5, &mut rng).unwrap();
        assert_eq!(sampled.len(), 5);
        let mut rewards: Vec<i32> = sampled.iter().map(|e| e.reward as i32).collect();
        rewards.sort_unstable();
        rewards.dedup();
        assert_eq!(rewards.len(), 5);
    }
}
