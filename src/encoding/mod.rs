//! Fixed encodings between chess positions/moves and the flat tensors the
//! neural network core consumes (spec §4.2).

pub mod action;
pub mod state;

pub use action::{decode_action, encode_action, legal_action_indices, resolve_move, ACTION_SPACE_SIZE};
pub use state::{encode_state, STATE_SIZE};
