//! The dense feedforward Q-network: configurable hidden sizes, ReLU hidden
//! activations, linear output over the action space (spec §4.4).

use crate::error::{CoreError, CoreResult};
use crate::nn::layer::{Activation, Layer};
use crate::nn::loss::{self, LossKind};
use crate::nn::optimizer::OptimizerState;
use ndarray::{Array1, Array2, Axis};
use rand::RngCore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Architecture {
    pub input_size: usize,
    pub hidden_sizes: Vec<usize>,
    pub output_size: usize,
}

impl Architecture {
    pub fn label(&self) -> String {
        let hidden = self.hidden_sizes.iter().map(|n| n.to_string()).collect::<Vec<_>>().join("-");
        format!("{}-[{}]-{}", self.input_size, hidden, self.output_size)
    }
}

#[derive(Clone)]
pub struct Network {
    architecture: Architecture,
    layers: Vec<Layer>,
    accumulated_samples: usize,
}

impl Network {
    pub fn new(input_size: usize, hidden_sizes: &[usize], output_size: usize, rng: &mut dyn RngCore) -> Self {
        let mut sizes = vec![input_size];
        sizes.extend_from_slice(hidden_sizes);
        sizes.push(output_size);

        let mut layers = Vec::with_capacity(sizes.len() - 1);
        for i in 0..sizes.len() - 1 {
            let is_output = i == sizes.len() - 2;
            let activation = if is_output { Activation::Linear } else { Activation::Relu };
            layers.push(Layer::new(sizes[i], sizes[i + 1], activation, rng));
        }

        Self {
            architecture: Architecture {
                input_size,
                hidden_sizes: hidden_sizes.to_vec(),
                output_size,
            },
            layers,
            accumulated_samples: 0,
        }
    }

    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_shapes(&self) -> Vec<(usize, usize)> {
        self.layers.iter().map(|l| (l.fan_out(), l.fan_in())).collect()
    }

    pub fn weights(&self, index: usize) -> &Array2<f32> {
        &self.layers[index].weights
    }

    pub fn biases(&self, index: usize) -> &Array1<f32> {
        &self.layers[index].biases
    }

    pub fn set_weights(&mut self, index: usize, weights: Array2<f32>) {
        self.layers[index].weights = weights;
    }

    pub fn set_biases(&mut self, index: usize, biases: Array1<f32>) {
        self.layers[index].biases = biases;
    }

    /// Batched forward pass. `input` is `(input_size, batch_size)`.
    pub fn forward(&mut self, input: &Array2<f32>) -> Array2<f32> {
        let mut activation = input.clone();
        for layer in self.layers.iter_mut() {
            activation = layer.forward(&activation);
        }
        activation
    }

    pub fn predict_single(&mut self, input: &[f32]) -> Vec<f32> {
        let column = Array2::from_shape_vec((input.len(), 1), input.to_vec()).expect("input length must match architecture");
        let output = self.forward(&column);
        output.column(0).to_vec()
    }

    /// Read-only batched forward pass, safe to call concurrently across
    /// worker threads against the same frozen snapshot.
    pub fn forward_inference(&self, input: &Array2<f32>) -> Array2<f32> {
        let mut activation = input.clone();
        for layer in &self.layers {
            activation = layer.forward_inference(&activation);
        }
        activation
    }

    pub fn predict_single_inference(&self, input: &[f32]) -> Vec<f32> {
        let column = Array2::from_shape_vec((input.len(), 1), input.to_vec()).expect("input length must match architecture");
        self.forward_inference(&column).column(0).to_vec()
    }

    /// Runs loss + backward for one batch, accumulating gradients (does not
    /// apply them — call `update_weights` once enough batches have
    /// accumulated).
    pub fn backward_batch(&mut self, predictions: &Array2<f32>, targets: &Array2<f32>, loss_kind: LossKind) -> f32 {
        let (loss_value, mut grad) = loss::compute(loss_kind, predictions, targets);
        for layer in self.layers.iter_mut().rev() {
            grad = layer.backward(&grad);
        }
        self.accumulated_samples += predictions.ncols();
        loss_value
    }

    /// Averages accumulated gradients, applies L2 weight decay, clips the
    /// joint gradient to `max_grad_norm`, steps the optimizer, then clears
    /// accumulators (spec §4.4).
    pub fn update_weights(&mut self, optimizer: &mut OptimizerState, lr: f32, l2_lambda: f32, max_grad_norm: f32) -> CoreResult<f32> {
        if self.accumulated_samples == 0 {
            return Ok(0.0);
        }
        let n = self.accumulated_samples as f32;
        for layer in self.layers.iter_mut() {
            layer.grad_weights /= n;
            layer.grad_biases /= n;
            if l2_lambda > 0.0 {
                let decay = layer.weights.clone() * l2_lambda;
                layer.grad_weights = layer.grad_weights.clone() + decay;
            }
        }

        let grad_norm = self.global_grad_norm();
        if grad_norm > max_grad_norm && grad_norm > 0.0 {
            let scale = max_grad_norm / grad_norm;
            for layer in self.layers.iter_mut() {
                layer.grad_weights *= scale;
                layer.grad_biases *= scale;
            }
        }

        optimizer.begin_step();
        for (index, layer) in self.layers.iter_mut().enumerate() {
            let grad_weights = layer.grad_weights.clone();
            let grad_biases = layer.grad_biases.clone();
            optimizer.step_layer(index, &mut layer.weights, &mut layer.biases, &grad_weights, &grad_biases, lr);
        }

        if self.has_non_finite_weights() {
            return Err(CoreError::NumericalInstability(
                "non-finite weight detected after optimizer step".to_string(),
            ));
        }

        for layer in self.layers.iter_mut() {
            layer.clear_gradients();
        }
        self.accumulated_samples = 0;
        Ok(grad_norm)
    }

    fn global_grad_norm(&self) -> f32 {
        let mut sum_sq = 0.0f32;
        for layer in &self.layers {
            sum_sq += layer.grad_weights.mapv(|g| g * g).sum();
            sum_sq += layer.grad_biases.mapv(|g| g * g).sum();
        }
        sum_sq.sqrt()
    }

    fn has_non_finite_weights(&self) -> bool {
        self.layers
            .iter()
            .any(|layer| !layer.weights.iter().all(|w| w.is_finite()) || !layer.biases.iter().all(|b| b.is_finite()))
    }

    /// Hard copy of parameters onto `target` — used for periodic target-network sync.
    pub fn copy_to(&self, target: &mut Network) {
        for (index, layer) in self.layers.iter().enumerate() {
            target.layers[index].weights = layer.weights.clone();
            target.layers[index].biases = layer.biases.clone();
        }
    }

    /// Polyak soft update: `target ← tau * online + (1 - tau) * target`.
    pub fn soft_update_from(&mut self, online: &Network, tau: f32) {
        for (index, layer) in self.layers.iter_mut().enumerate() {
            layer.weights = &online.layers[index].weights * tau + &layer.weights * (1.0 - tau);
            layer.biases = &online.layers[index].biases * tau + &layer.biases * (1.0 - tau);
        }
    }
}

pub fn batch_from_rows(rows: &[Vec<f32>]) -> Array2<f32> {
    let feature_len = rows.first().map(|r| r.len()).unwrap_or(0);
    let mut batch = Array2::zeros((feature_len, rows.len()));
    for (col, row) in rows.iter().enumerate() {
        batch.column_mut(col).assign(&Array1::from_vec(row.clone()));
    }
    batch
}

/// Ties break in index order: the first maximal legal index wins, not the
/// last (`Iterator::max_by` would keep the last, which is the wrong way).
pub fn argmax_masked(values: &[f32], legal: &[bool]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, (&value, &is_legal)) in values.iter().zip(legal.iter()).enumerate() {
        if !is_legal {
            continue;
        }
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn forward_output_shape_matches_architecture() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut net = Network::new(8, &[16, 8], 4, &mut rng);
        let input = Array2::zeros((8, 3));
        let output = net.forward(&input);
        assert_eq!(output.shape(), &[4, 3]);
    }

    #[test]
    fn single_and_batched_forward_agree() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut net = Network::new(4, &[6], 2, &mut rng);
        let single = net.predict_single(&[0.1, 0.2, 0.3, 0.4]);
        let batch = net.forward(&Array2::from_shape_vec((4, 1), vec![0.1, 0.2, 0.3, 0.4]).unwrap());
        assert!((single[0] - batch[[0, 0]]).abs() < 1e-6);
        assert!((single[1] - batch[[1, 0]]).abs() < 1e-6);
    }

    #[test]
    fn masked_argmax_skips_illegal_actions() {
        let values = vec![5.0, 10.0, 1.0];
        let legal = vec![true, false, true];
        assert_eq!(argmax_masked(&values, &legal), Some(0));
    }
}
