//! Plinko domain types.
//!
//! Multiplier tables, play requests, lightning mode and bankroll state shared by the execution
//! layer and off-chain verifiers.

mod asset;
mod bankroll;
mod codec;
mod constants;
mod multipliers;
mod play;

pub use asset::*;
pub use bankroll::*;
pub use codec::{read_string, string_encode_size, truncate_message, write_string};
pub use constants::*;
pub use multipliers::*;
pub use play::*;

#[cfg(test)]
mod tests;
