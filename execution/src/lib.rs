//! Plinko execution layer.
//!
//! This crate contains the deterministic request/fulfill settlement engine (`Layer`): a player's
//! `Play` escrows the wager and reserves worst-case exposure against the bankroll, and the
//! oracle's `Fulfill` replays the bets from its random words and settles the net result.
//!
//! ## Determinism requirements
//! - Do not use wall-clock time inside execution; refund timing is measured in views.
//! - Randomness only enters through `Fulfill` words.
//! - Avoid iteration order of hash-based collections influencing outputs.
//!
//! ## Minimal execution pipeline (example)
//! ```rust,ignore
//! use plinko_execution::{mocks, Layer};
//! use plinko_types::NAMESPACE;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let (_operators, config) = mocks::engine_config();
//! let mut state = mocks::genesis_state(&config).await?;
//! let mut layer = Layer::new(&state, &config, NAMESPACE, /* view */ 1);
//! let (outputs, _nonces) = layer.execute(vec![/* signed transactions */]).await?;
//! let changes = layer.commit();
//! state.apply(changes).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod ledger;
pub mod oracle;
pub mod plinko;
pub mod query;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;


mod layer;

mod state;

pub use config::{Config, ConfigError, EngineConfig, Role};
pub use error::PlinkoError;
pub use layer::Layer;
pub use ledger::BankrollLedger;
pub use oracle::{request_id, ReferenceOracle};
pub use state::{nonce, PrepareError, State, Status};

#[cfg(any(test, feature = "mocks"))]
pub use state::Memory;
