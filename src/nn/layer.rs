//! A single dense layer: weights, biases, and the forward/backward caches
//! needed to compute gradients without a second forward pass.

use ndarray::{Array1, Array2, Axis};
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;
use rand::RngCore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Relu,
    Linear,
}

impl Activation {
    fn apply(self, z: &Array2<f32>) -> Array2<f32> {
        match self {
            Activation::Relu => z.mapv(|v| v.max(0.0)),
            Activation::Linear => z.clone(),
        }
    }

    fn derivative(self, z: &Array2<f32>) -> Array2<f32> {
        match self {
            Activation::Relu => z.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Linear => Array2::ones(z.raw_dim()),
        }
    }
}

/// Dense layer with shape `(fan_out, fan_in)` weights, matching the
/// column-major batch convention used throughout the network: activations
/// are `(features, batch_size)`.
#[derive(Clone)]
pub struct Layer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,

    input_cache: Array2<f32>,
    pre_activation_cache: Array2<f32>,

    pub grad_weights: Array2<f32>,
    pub grad_biases: Array1<f32>,
}

impl Layer {
    /// He initialization: `w ~ N(0, sqrt(2/fan_in))`, zero biases.
    pub fn new(fan_in: usize, fan_out: usize, activation: Activation, rng: &mut dyn RngCore) -> Self {
        let std_dev = (2.0 / fan_in as f32).sqrt();
        let weights = Array2::random_using((fan_out, fan_in), Normal::new(0.0, std_dev).unwrap(), rng);
        Self {
            weights,
            biases: Array1::zeros(fan_out),
            activation,
            input_cache: Array2::zeros((fan_in, 0)),
            pre_activation_cache: Array2::zeros((fan_out, 0)),
            grad_weights: Array2::zeros((fan_out, fan_in)),
            grad_biases: Array1::zeros(fan_out),
        }
    }

    pub fn fan_in(&self) -> usize {
        self.weights.ncols()
    }

    pub fn fan_out(&self) -> usize {
        self.weights.nrows()
    }

    /// `input` is `(fan_in, batch_size)`. Returns `(fan_out, batch_size)`.
    pub fn forward(&mut self, input: &Array2<f32>) -> Array2<f32> {
        let z = self.weights.dot(input) + self.biases.clone().insert_axis(Axis(1));
        self.input_cache = input.clone();
        self.pre_activation_cache = z.clone();
        self.activation.apply(&z)
    }

    /// Same computation as `forward` but without touching the backward
    /// caches, so it can run behind a shared `&Network` — self-play's game
    /// phase is pure inference across parallel workers (spec §4.7).
    pub fn forward_inference(&self, input: &Array2<f32>) -> Array2<f32> {
        let z = self.weights.dot(input) + self.biases.clone().insert_axis(Axis(1));
        self.activation.apply(&z)
    }

    /// `grad_output` is dL/dA for this layer's activation output, shape
    /// `(fan_out, batch_size)`. Accumulates into `grad_weights`/`grad_biases`
    /// (summed, not averaged — callers divide by total sample count once at
    /// `update_weights` time) and returns dL/dA for the previous layer.
    pub fn backward(&mut self, grad_output: &Array2<f32>) -> Array2<f32> {
        let grad_z = grad_output * &self.activation.derivative(&self.pre_activation_cache);
        self.grad_weights = self.grad_weights.clone() + grad_z.dot(&self.input_cache.t());
        self.grad_biases = self.grad_biases.clone() + grad_z.sum_axis(Axis(1));
        self.weights.t().dot(&grad_z)
    }

    pub fn clear_gradients(&mut self) {
        self.grad_weights.fill(0.0);
        self.grad_biases.fill(0.0);
    }
}
