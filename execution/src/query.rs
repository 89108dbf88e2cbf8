//! Read-only views over committed (or staged) state.

use crate::state::State;
use anyhow::Result;
use commonware_cryptography::ed25519::PublicKey;
use plinko_types::{
    execution::{Key, Value},
    plinko::{Asset, Bankroll, LightningMode, MultiplierTable, PlayRequest, RequestId},
};

pub use crate::ledger::wallet_balance;
pub use crate::state::nonce;

/// The full multiplier table; unconfigured when nothing was stored at genesis.
pub async fn get_multipliers<S: State>(state: &S) -> Result<MultiplierTable> {
    Ok(match state.get(&Key::Multipliers).await? {
        Some(Value::Multipliers(table)) => table,
        _ => MultiplierTable::new(),
    })
}

pub async fn play_request<S: State>(state: &S, id: &RequestId) -> Result<Option<PlayRequest>> {
    Ok(match state.get(&Key::PlayRequest(*id)).await? {
        Some(Value::PlayRequest(request)) => Some(request),
        _ => None,
    })
}

pub async fn bankroll<S: State>(state: &S, asset: &Asset) -> Result<Bankroll> {
    crate::ledger::load_bankroll(state, asset).await
}

pub async fn lightning_mode<S: State>(state: &S) -> Result<LightningMode> {
    Ok(match state.get(&Key::LightningMode).await? {
        Some(Value::LightningMode(mode)) => mode,
        _ => LightningMode::default(),
    })
}

/// Id of the player's outstanding request, if any.
pub async fn pending_play<S: State>(state: &S, player: &PublicKey) -> Result<Option<RequestId>> {
    Ok(match state.get(&Key::PendingPlay(player.clone())).await? {
        Some(Value::PendingPlay(id)) => Some(id),
        _ => None,
    })
}

pub(crate) async fn request_sequence<S: State>(state: &S) -> Result<u64> {
    Ok(match state.get(&Key::RequestSequence).await? {
        Some(Value::RequestSequence(sequence)) => sequence,
        _ => 0,
    })
}
