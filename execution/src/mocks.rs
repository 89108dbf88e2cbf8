//! Fixtures shared by unit tests, integration tests and the simulator.

use crate::{
    config::{Config, EngineConfig},
    state::{Memory, State},
    Layer,
};
use anyhow::Result;
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    Signer,
};
use commonware_math::algebra::Random;
use commonware_utils::from_hex_formatted;
use plinko_types::{
    execution::{Output, Transaction},
    plinko::{RandomWord, WORD_SIZE},
    NAMESPACE,
};
use rand::{rngs::StdRng, SeedableRng};

pub const ADMIN_SEED: u64 = 0;
pub const ORACLE_SEED: u64 = 1;
/// Player keys are derived from seeds at or above this value.
pub const PLAYER_SEED_BASE: u64 = 1_000;

/// Creates an account keypair for Ed25519 signatures used by users
pub fn create_account_keypair(seed: u64) -> (PrivateKey, PublicKey) {
    let mut rng = StdRng::seed_from_u64(seed);
    let private = PrivateKey::random(&mut rng);
    let public = private.public_key();
    (private, public)
}

/// Creates the `index`-th player keypair, disjoint from the operator keys.
pub fn create_player_keypair(index: u64) -> (PrivateKey, PublicKey) {
    create_account_keypair(PLAYER_SEED_BASE.saturating_add(index))
}

/// Signers holding the privileged roles of [`engine_config`].
pub struct Operators {
    pub admin: PrivateKey,
    pub oracle: PrivateKey,
}

/// Default engine configuration with deterministic admin and oracle keys.
pub fn engine_config() -> (Operators, EngineConfig) {
    let (admin, admin_public) = create_account_keypair(ADMIN_SEED);
    let (oracle, oracle_public) = create_account_keypair(ORACLE_SEED);
    let config = Config::new(&admin_public, &oracle_public);
    let engine = config
        .validate()
        .expect("default config must validate");
    (Operators { admin, oracle }, engine)
}

/// Empty in-memory state seeded with the configuration's genesis values.
pub async fn genesis_state(config: &EngineConfig) -> Result<Memory> {
    let mut state = Memory::default();
    for (key, value) in config.genesis() {
        state.insert(key, value).await?;
    }
    Ok(state)
}

/// Executes one block at `view` and commits it.
pub async fn execute_block(
    state: &mut Memory,
    config: &EngineConfig,
    view: u64,
    transactions: Vec<Transaction>,
) -> Result<Vec<Output>> {
    let (outputs, changes) = {
        let mut layer = Layer::new(&*state, config, NAMESPACE, view);
        let (outputs, _) = layer.execute(transactions).await?;
        (outputs, layer.commit())
    };
    state.apply(changes).await?;
    Ok(outputs)
}

/// Parses a hex-encoded 32-byte word.
pub fn word_from_hex(hex: &str) -> Option<RandomWord> {
    let bytes = from_hex_formatted(hex)?;
    let bytes: [u8; WORD_SIZE] = bytes.try_into().ok()?;
    Some(RandomWord(bytes))
}
