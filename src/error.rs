//! Error taxonomy for the self-play training core.
//!
//! Variants map directly onto the failure modes the core can hit: engine bugs
//! that must be treated as fatal (an illegal move slipping past masking), and
//! recoverable conditions the training loop handles locally (sampling before
//! warmup, a transient checkpoint write failure).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid FEN: {field} ({reason})")]
    InvalidFen { field: String, reason: String },

    #[error("illegal move attempted")]
    IllegalMove,

    #[error("illegal action index {0} selected")]
    IllegalAction(u16),

    #[error("legal action set is empty on a non-terminal position")]
    EmptyLegalActions,

    #[error("replay buffer underflow: requested {requested} samples, {available} available")]
    BufferUnderflow { requested: usize, available: usize },

    #[error("numerical instability detected: {0}")]
    NumericalInstability(String),

    #[error("incompatible checkpoint: expected architecture {expected}, found {found}")]
    IncompatibleCheckpoint { expected: String, found: String },

    #[error("checkpoint I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("training cancelled at cycle boundary")]
    Cancelled,
}

impl CoreError {
    /// Fatal errors stop the run with a single summary record (spec §7);
    /// everything else is counted and logged, then handled locally.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CoreError::IllegalMove
                | CoreError::IllegalAction(_)
                | CoreError::EmptyLegalActions
                | CoreError::IncompatibleCheckpoint { .. }
        )
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
