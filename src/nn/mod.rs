//! Hand-rolled dense-MLP neural network core: no autodiff, explicit forward,
//! backward, optimizer, and loss formulas (spec §4.4).

pub mod layer;
pub mod loss;
pub mod network;
pub mod optimizer;
pub mod schedule;

pub use layer::Activation;
pub use loss::LossKind;
pub use network::{argmax_masked, batch_from_rows, Architecture, Network};
pub use optimizer::{OptimizerKind, OptimizerState};
pub use schedule::LrSchedule;
