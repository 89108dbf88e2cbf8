//! Common types used throughout the plinko settlement engine.
//!
//! Wire and state types live here so the execution layer, the simulator and any off-chain
//! verifier agree on a single binary encoding.

pub mod execution;
pub mod plinko;

pub use execution::{
    Account, Event, Instruction, Key, Output, Transaction, Value, NAMESPACE,
};
