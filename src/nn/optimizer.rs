//! Optimizers: explicit update formulas, no autodiff. One `OptimizerState`
//! instance tracks per-layer momentum/moment buffers plus a shared step
//! counter `t` used for Adam's bias correction.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OptimizerKind {
    Sgd { momentum: f32 },
    Adam { beta1: f32, beta2: f32, epsilon: f32 },
    Rmsprop { rho: f32, epsilon: f32, momentum: f32 },
}

impl Default for OptimizerKind {
    fn default() -> Self {
        OptimizerKind::Adam {
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct LayerBuffers {
    m_weights: Array2<f32>,
    v_weights: Array2<f32>,
    m_biases: Array1<f32>,
    v_biases: Array1<f32>,
}

impl LayerBuffers {
    fn zeros(fan_out: usize, fan_in: usize) -> Self {
        Self {
            m_weights: Array2::zeros((fan_out, fan_in)),
            v_weights: Array2::zeros((fan_out, fan_in)),
            m_biases: Array1::zeros(fan_out),
            v_biases: Array1::zeros(fan_out),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct OptimizerState {
    kind: OptimizerKind,
    buffers: Vec<LayerBuffers>,
    pub step: u64,
}

impl OptimizerState {
    pub fn new(kind: OptimizerKind, layer_shapes: &[(usize, usize)]) -> Self {
        Self {
            kind,
            buffers: layer_shapes.iter().map(|&(out, inp)| LayerBuffers::zeros(out, inp)).collect(),
            step: 0,
        }
    }

    pub fn kind(&self) -> OptimizerKind {
        self.kind
    }

    /// Layer-buffer shapes, used to validate a checkpoint's optimizer state
    /// matches the network it is being restored alongside.
    pub fn layer_shapes(&self) -> Vec<(usize, usize)> {
        self.buffers.iter().map(|b| (b.m_weights.nrows(), b.m_weights.ncols())).collect()
    }

    /// Applies one optimizer step to a single layer's weights/biases given
    /// its (already L2-regularized, clipped) gradients.
    pub fn step_layer(
        &mut self,
        layer_index: usize,
        weights: &mut Array2<f32>,
        biases: &mut Array1<f32>,
        grad_weights: &Array2<f32>,
        grad_biases: &Array1<f32>,
        lr: f32,
    ) {
        let buf = &mut self.buffers[layer_index];
        match self.kind {
            OptimizerKind::Sgd { momentum } => {
                buf.m_weights = &buf.m_weights * momentum + &(grad_weights * lr);
                buf.m_biases = &buf.m_biases * momentum + &(grad_biases * lr);
                *weights -= &buf.m_weights;
                *biases -= &buf.m_biases;
            }
            OptimizerKind::Adam { beta1, beta2, epsilon } => {
                let t = self.step as i32;
                buf.m_weights = &buf.m_weights * beta1 + &(grad_weights * (1.0 - beta1));
                buf.v_weights = &buf.v_weights * beta2 + &(grad_weights.mapv(|g| g * g) * (1.0 - beta2));
                buf.m_biases = &buf.m_biases * beta1 + &(grad_biases * (1.0 - beta1));
                buf.v_biases = &buf.v_biases * beta2 + &(grad_biases.mapv(|g| g * g) * (1.0 - beta2));

                let bias_correction1 = 1.0 - beta1.powi(t);
                let bias_correction2 = 1.0 - beta2.powi(t);

                let m_hat_w = &buf.m_weights / bias_correction1;
                let v_hat_w = &buf.v_weights / bias_correction2;
                *weights -= &(lr * &m_hat_w / &(v_hat_w.mapv(f32::sqrt) + epsilon));

                let m_hat_b = &buf.m_biases / bias_correction1;
                let v_hat_b = &buf.v_biases / bias_correction2;
                *biases -= &(lr * &m_hat_b / &(v_hat_b.mapv(f32::sqrt) + epsilon));
            }
            OptimizerKind::Rmsprop { rho, epsilon, momentum } => {
                buf.v_weights = &buf.v_weights * rho + &(grad_weights.mapv(|g| g * g) * (1.0 - rho));
                buf.v_biases = &buf.v_biases * rho + &(grad_biases.mapv(|g| g * g) * (1.0 - rho));

                let delta_w = lr * grad_weights / &(buf.v_weights.mapv(f32::sqrt) + epsilon);
                let delta_b = lr * grad_biases / &(buf.v_biases.mapv(f32::sqrt) + epsilon);

                buf.m_weights = &buf.m_weights * momentum + &delta_w;
                buf.m_biases = &buf.m_biases * momentum + &delta_b;
                *weights -= &buf.m_weights;
                *biases -= &buf.m_biases;
            }
        }
    }

    pub fn begin_step(&mut self) {
        self.step += 1;
    }
}
