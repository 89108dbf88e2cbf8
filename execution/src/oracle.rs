//! Randomness request correlation and a reference oracle.
//!
//! A request id is derived as:
//! ```text
//! id = sha256(request_namespace || player || nonce || sequence)
//! ```
//! where `sequence` is a global counter bumped on every accepted play, so two requests never
//! share an id even when a player replays the same nonce after a refund.
//!
//! [`ReferenceOracle`] answers a request with `num_bets` words:
//! ```text
//! word[i] = sha256(secret || id || i)
//! ```
//! It stands in for an external verifiable randomness service in tests and the simulator.

use commonware_cryptography::{ed25519::PublicKey, sha256::Sha256, Hasher};
use plinko_types::{
    execution::request_namespace,
    plinko::{RandomWord, RequestId},
};

/// Derives the correlation id of a play request.
pub fn request_id(namespace: &[u8], player: &PublicKey, nonce: u64, sequence: u64) -> RequestId {
    let mut hasher = Sha256::new();
    hasher.update(&request_namespace(namespace));
    hasher.update(player.as_ref());
    hasher.update(&nonce.to_be_bytes());
    hasher.update(&sequence.to_be_bytes());
    hasher.finalize()
}

/// Hash-chain oracle keyed by a secret.
#[derive(Clone, Debug)]
pub struct ReferenceOracle {
    secret: [u8; 32],
}

impl ReferenceOracle {
    pub fn new(secret: [u8; 32]) -> Self {
        Self { secret }
    }

    pub fn from_seed(seed: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"oracle");
        hasher.update(&seed.to_be_bytes());
        Self::new(hasher.finalize().0)
    }

    pub fn word(&self, id: &RequestId, index: u32) -> RandomWord {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(id.as_ref());
        hasher.update(&index.to_be_bytes());
        RandomWord(hasher.finalize().0)
    }

    pub fn words(&self, id: &RequestId, count: u32) -> Vec<RandomWord> {
        (0..count).map(|i| self.word(id, i)).collect()
    }
}
