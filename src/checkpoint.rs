//! Checkpoint persistence (spec §7).
//!
//! Weights are written with `safetensors` (portable, framework-agnostic);
//! everything else needed to resume — architecture, optimizer kind, agent
//! hyperparameters, cycle number, epsilon, master seed — goes in a JSON
//! sidecar. Both halves are written to temp files and renamed into place so
//! a crash mid-write never leaves a checkpoint directory half-written. A
//! `latest` pointer file records the most recent complete cycle.
//!
//! The optimizer's full state (kind, per-layer m/v buffers, step counter)
//! is embedded in the JSON sidecar too, so resuming a run continues Adam's
//! bias-corrected averages exactly where they left off rather than
//! restarting them at zero.

use crate::agent::{Agent, AgentConfig};
use crate::error::{CoreError, CoreResult};
use crate::nn::{Architecture, Network, OptimizerState};
use rand::SeedableRng;
use safetensors::tensor::{Dtype, TensorView};
use safetensors::SafeTensors;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

const FORMAT_VERSION: u32 = 1;
const IO_RETRIES: u32 = 3;
const IO_RETRY_DELAY: Duration = Duration::from_millis(50);

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    architecture: Architecture,
    agent_config: AgentConfig,
    optimizer: OptimizerState,
    cycle: u64,
    epsilon: f32,
    updates_since_sync: u64,
    master_seed: u64,
}

pub struct LoadedCheckpoint {
    pub agent: Agent,
    pub cycle: u64,
    pub master_seed: u64,
}

fn tensors_path(dir: &Path, cycle: u64) -> PathBuf {
    dir.join(format!("cycle-{:08}.safetensors", cycle))
}

fn envelope_path(dir: &Path, cycle: u64) -> PathBuf {
    dir.join(format!("cycle-{:08}.json", cycle))
}

fn latest_path(dir: &Path) -> PathBuf {
    dir.join("latest")
}

fn io_err(path: &Path, source: io::Error) -> CoreError {
    CoreError::Io { path: path.to_path_buf(), source }
}

/// Writes `bytes` to `path` via a sibling temp file followed by a rename,
/// retrying transient I/O failures a bounded number of times.
fn write_atomic(path: &Path, bytes: &[u8]) -> CoreResult<()> {
    let mut tmp_path = path.to_path_buf();
    tmp_path.set_extension(format!("{}.tmp", path.extension().and_then(|e| e.to_str()).unwrap_or("part")));

    let mut last_err = None;
    for attempt in 0..IO_RETRIES {
        match fs::write(&tmp_path, bytes).and_then(|_| fs::rename(&tmp_path, path)) {
            Ok(()) => return Ok(()),
            Err(err) => {
                last_err = Some(err);
                if attempt + 1 < IO_RETRIES {
                    thread::sleep(IO_RETRY_DELAY);
                }
            }
        }
    }
    Err(io_err(path, last_err.expect("loop runs at least once")))
}

fn read_with_retry(path: &Path) -> CoreResult<Vec<u8>> {
    let mut last_err = None;
    for attempt in 0..IO_RETRIES {
        match fs::read(path) {
            Ok(bytes) => return Ok(bytes),
            Err(err) => {
                last_err = Some(err);
                if attempt + 1 < IO_RETRIES {
                    thread::sleep(IO_RETRY_DELAY);
                }
            }
        }
    }
    Err(io_err(path, last_err.expect("loop runs at least once")))
}

fn f32_le_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn f32_from_le_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect()
}

struct RawTensor {
    name: String,
    shape: Vec<usize>,
    bytes: Vec<u8>,
}

fn network_tensors(prefix: &str, network: &Network, out: &mut Vec<RawTensor>) {
    for index in 0..network.layer_count() {
        let weights = network.weights(index).as_standard_layout().into_owned();
        let biases = network.biases(index).as_standard_layout().into_owned();
        out.push(RawTensor {
            name: format!("{prefix}.layer{index}.weight"),
            shape: weights.shape().to_vec(),
            bytes: f32_le_bytes(weights.as_slice().expect("standard layout is contiguous")),
        });
        out.push(RawTensor {
            name: format!("{prefix}.layer{index}.bias"),
            shape: biases.shape().to_vec(),
            bytes: f32_le_bytes(biases.as_slice().expect("standard layout is contiguous")),
        });
    }
}

fn has_non_finite(tensors: &[RawTensor]) -> bool {
    tensors.iter().any(|t| f32_from_le_bytes(&t.bytes).iter().any(|v| !v.is_finite()))
}

/// Saves a checkpoint for `cycle`, refusing to persist non-finite weights
/// (spec §7: NaN must never be checkpointed).
pub fn save(dir: &Path, cycle: u64, agent: &Agent, master_seed: u64) -> CoreResult<()> {
    fs::create_dir_all(dir).map_err(|source| io_err(dir, source))?;

    let mut raw = Vec::new();
    network_tensors("online", &agent.online, &mut raw);
    network_tensors("target", &agent.target, &mut raw);

    if has_non_finite(&raw) {
        return Err(CoreError::NumericalInstability(format!("refusing to checkpoint non-finite weights at cycle {cycle}")));
    }

    let views: Vec<(String, TensorView)> = raw
        .iter()
        .map(|t| {
            let view =
                TensorView::new(Dtype::F32, t.shape.clone(), &t.bytes).expect("shape and byte length are derived from the same contiguous f32 array");
            (t.name.clone(), view)
        })
        .collect();

    let tensor_bytes =
        safetensors::serialize(views, &None).map_err(|err| CoreError::InvalidConfig(format!("failed to encode checkpoint tensors: {err}")))?;

    let envelope = Envelope {
        version: FORMAT_VERSION,
        architecture: agent.online.architecture().clone(),
        agent_config: agent.config().clone(),
        optimizer: agent.optimizer_state().clone(),
        cycle,
        epsilon: agent.epsilon,
        updates_since_sync: agent.updates_since_sync(),
        master_seed,
    };
    let envelope_json =
        serde_json::to_vec_pretty(&envelope).map_err(|err| CoreError::InvalidConfig(format!("failed to encode checkpoint metadata: {err}")))?;

    write_atomic(&tensors_path(dir, cycle), &tensor_bytes)?;
    write_atomic(&envelope_path(dir, cycle), &envelope_json)?;
    write_atomic(&latest_path(dir), cycle.to_string().as_bytes())?;
    Ok(())
}

/// Loads the checkpoint for `cycle`, rejecting it outright if its
/// architecture doesn't match `expected_architecture`.
pub fn load(dir: &Path, cycle: u64, expected_architecture: &Architecture) -> CoreResult<LoadedCheckpoint> {
    let envelope_bytes = read_with_retry(&envelope_path(dir, cycle))?;
    let envelope: Envelope =
        serde_json::from_slice(&envelope_bytes).map_err(|err| CoreError::InvalidConfig(format!("corrupt checkpoint metadata: {err}")))?;

    if &envelope.architecture != expected_architecture {
        return Err(CoreError::IncompatibleCheckpoint {
            expected: expected_architecture.label(),
            found: envelope.architecture.label(),
        });
    }

    let tensor_bytes = read_with_retry(&tensors_path(dir, cycle))?;
    let tensors = SafeTensors::deserialize(&tensor_bytes).map_err(|err| CoreError::InvalidConfig(format!("corrupt checkpoint tensors: {err}")))?;

    let mut rng = rand::rngs::SmallRng::seed_from_u64(envelope.master_seed);
    let mut online = Network::new(envelope.architecture.input_size, &envelope.architecture.hidden_sizes, envelope.architecture.output_size, &mut rng);
    let mut target = Network::new(envelope.architecture.input_size, &envelope.architecture.hidden_sizes, envelope.architecture.output_size, &mut rng);

    load_network_tensors("online", &tensors, &mut online)?;
    load_network_tensors("target", &tensors, &mut target)?;

    let agent = Agent::from_checkpoint(online, target, envelope.optimizer, envelope.agent_config, envelope.epsilon, envelope.updates_since_sync);

    Ok(LoadedCheckpoint { agent, cycle: envelope.cycle, master_seed: envelope.master_seed })
}

fn load_network_tensors(prefix: &str, tensors: &SafeTensors, network: &mut Network) -> CoreResult<()> {
    for index in 0..network.layer_count() {
        let weight_name = format!("{prefix}.layer{index}.weight");
        let bias_name = format!("{prefix}.layer{index}.bias");

        let weight_view = tensors.tensor(&weight_name).map_err(|err| CoreError::InvalidConfig(format!("missing tensor {weight_name}: {err}")))?;
        let bias_view = tensors.tensor(&bias_name).map_err(|err| CoreError::InvalidConfig(format!("missing tensor {bias_name}: {err}")))?;

        let weight_shape = weight_view.shape();
        let weights = ndarray::Array2::from_shape_vec((weight_shape[0], weight_shape[1]), f32_from_le_bytes(weight_view.data()))
            .map_err(|err| CoreError::InvalidConfig(format!("malformed weight tensor {weight_name}: {err}")))?;
        let biases = ndarray::Array1::from_vec(f32_from_le_bytes(bias_view.data()));

        network.set_weights(index, weights);
        network.set_biases(index, biases);
    }
    Ok(())
}

/// Reads the `latest` pointer file, if any checkpoint has been written yet.
pub fn latest_cycle(dir: &Path) -> CoreResult<Option<u64>> {
    let path = latest_path(dir);
    if !path.exists() {
        return Ok(None);
    }
    let bytes = read_with_retry(&path)?;
    let text = String::from_utf8_lossy(&bytes);
    let cycle = text.trim().parse::<u64>().map_err(|err| CoreError::InvalidConfig(format!("corrupt latest-checkpoint pointer: {err}")))?;
    Ok(Some(cycle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentConfig;
    use crate::nn::{Network, OptimizerKind, OptimizerState};
    use rand::rngs::SmallRng;
    use tempfile::tempdir;

    fn build_agent() -> Agent {
        let mut rng = SmallRng::seed_from_u64(1);
        let online = Network::new(8, &[16], 4, &mut rng);
        let target = Network::new(8, &[16], 4, &mut rng);
        let optimizer = OptimizerState::new(OptimizerKind::default(), online.layer_shapes());
        Agent::new(online, target, optimizer, AgentConfig::default())
    }

    #[test]
    fn round_trips_weights_and_metadata() {
        let dir = tempdir().unwrap();
        let agent = build_agent();
        save(dir.path(), 3, &agent, 42).unwrap();

        let loaded = load(dir.path(), 3, agent.online.architecture()).unwrap();
        assert_eq!(loaded.cycle, 3);
        assert_eq!(loaded.master_seed, 42);
        assert_eq!(loaded.agent.online.weights(0), agent.online.weights(0));
        assert_eq!(latest_cycle(dir.path()).unwrap(), Some(3));
    }

    #[test]
    fn architecture_mismatch_is_rejected() {
        let dir = tempdir().unwrap();
        let agent = build_agent();
        save(dir.path(), 1, &agent, 7).unwrap();

        let wrong = Architecture { input_size: 9, hidden_sizes: vec![16], output_size: 4 };
        let result = load(dir.path(), 1, &wrong);
        assert!(matches!(result, Err(CoreError::IncompatibleCheckpoint { .. })));
    }
}
