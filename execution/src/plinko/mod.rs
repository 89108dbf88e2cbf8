//! Pure plinko rules: path derivation, play validation and bet sequencing.
//!
//! Nothing here touches state, so every function can be replayed off-chain from the same
//! inputs.

pub mod path;
pub mod sequence;
pub mod validator;

pub use path::{drop_ball, Path};
pub use sequence::{play_sequence, BetOutcome, Sequence};
pub use validator::{validate_play, Exposure, PlayParams};
