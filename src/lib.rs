//! # chessrl
//!
//! A self-play DQN training core for chess: an array-based rules engine,
//! a hand-rolled dense-MLP Q-network, a replay buffer, a Double-DQN agent,
//! and a parallel self-play loop that trains the agent against itself and
//! periodically scores it against fixed baselines.
//!
//! ## Layout
//!
//! - [`chess`] — board representation, move generation, legality, FEN, game status
//! - [`encoding`] — board/action encoding into fixed-size network inputs/outputs
//! - [`nn`] — the dense feedforward network, optimizers, losses, LR schedules
//! - [`replay`] — the bounded experience replay buffer
//! - [`agent`] — the DQN agent (epsilon-greedy, Double-DQN targets, target sync)
//! - [`env`] — the chess environment adapter the agent trains against
//! - [`selfplay`] — the parallel game-generation + training cycle loop
//! - [`eval`] — baseline opponents and the evaluation match driver
//! - [`checkpoint`] — atomic checkpoint save/load
//! - [`seed`] — deterministic sub-stream RNG derivation
//! - [`config`] — the full training configuration surface

pub mod agent;
pub mod checkpoint;
pub mod chess;
pub mod config;
pub mod encoding;
pub mod env;
pub mod error;
pub mod eval;
pub mod logging;
pub mod nn;
pub mod replay;
pub mod seed;
pub mod selfplay;

pub use config::TrainingConfig;
pub use error::{CoreError, CoreResult};
