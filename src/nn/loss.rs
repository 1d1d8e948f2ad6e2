//! Loss functions. Both return an averaged scalar plus dL/dŷ, the gradient
//! `update_weights` needs to kick off backpropagation.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossKind {
    Mse,
    Huber,
}

const HUBER_DELTA: f32 = 1.0;

pub fn compute(kind: LossKind, predictions: &Array2<f32>, targets: &Array2<f32>) -> (f32, Array2<f32>) {
    match kind {
        LossKind::Mse => mse(predictions, targets),
        LossKind::Huber => huber(predictions, targets),
    }
}

fn mse(predictions: &Array2<f32>, targets: &Array2<f32>) -> (f32, Array2<f32>) {
    let residual = predictions - targets;
    let n = residual.len() as f32;
    let loss = residual.mapv(|r| r * r).sum() / n;
    let grad = &residual * (2.0 / n);
    (loss, grad)
}

fn huber(predictions: &Array2<f32>, targets: &Array2<f32>) -> (f32, Array2<f32>) {
    let residual = predictions - targets;
    let n = residual.len() as f32;

    let loss = residual
        .mapv(|r| {
            if r.abs() <= HUBER_DELTA {
                0.5 * r * r
            } else {
                HUBER_DELTA * (r.abs() - 0.5 * HUBER_DELTA)
            }
        })
        .sum()
        / n;

    let grad = residual.mapv(|r| {
        if r.abs() <= HUBER_DELTA {
            r
        } else {
            HUBER_DELTA * r.signum()
        }
    }) / n;

    (loss, grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn mse_of_identical_vectors_is_zero() {
        let a = arr2(&[[1.0, 2.0, 3.0]]);
        let (loss, grad) = compute(LossKind::Mse, &a, &a);
        assert_eq!(loss, 0.0);
        assert!(grad.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn huber_matches_mse_inside_delta() {
        let predictions = arr2(&[[0.5]]);
        let targets = arr2(&[[0.0]]);
        let (huber_loss, _) = compute(LossKind::Huber, &predictions, &targets);
        let (mse_loss, _) = compute(LossKind::Mse, &predictions, &targets);
        assert!((huber_loss - mse_loss / 2.0).abs() < 1e-6);
    }

    #[test]
    fn huber_is_linear_outside_delta() {
        let predictions = arr2(&[[10.0]]);
        let targets = arr2(&[[0.0]]);
        let (loss, grad) = compute(LossKind::Huber, &predictions, &targets);
        assert!((loss - (HUBER_DELTA * (10.0 - 0.5 * HUBER_DELTA))).abs() < 1e-6);
        assert_eq!(grad[[0, 0]], HUBER_DELTA);
    }
}
