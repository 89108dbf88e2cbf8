//! Bankroll ledger seam.
//!
//! The settlement engine never owns bankroll funds. It reserves worst-case exposure on accept
//! and settles a signed net amount on fulfillment through [`BankrollLedger`]. Every call fails
//! with [`PlinkoError::GameNotAuthorized`] until the bankroll has granted the game capability.

use crate::{error::PlinkoError, state::State};
use commonware_cryptography::ed25519::PublicKey;
use plinko_types::{
    execution::{Key, Value},
    plinko::{Asset, Bankroll},
};
use std::future::Future;
use tracing::debug;

pub trait BankrollLedger {
    /// Balance not already reserved for pending plays.
    fn available_balance(&self, asset: &Asset) -> impl Future<Output = Result<u64, PlinkoError>>;

    /// Holds `amount` of the balance against a pending play.
    fn reserve(
        &mut self,
        asset: &Asset,
        amount: u64,
    ) -> impl Future<Output = Result<(), PlinkoError>>;

    /// Undoes a previous reservation.
    fn release(
        &mut self,
        asset: &Asset,
        amount: u64,
    ) -> impl Future<Output = Result<(), PlinkoError>>;

    /// Moves `net` from the bankroll to the player (positive) or from the player to the
    /// bankroll (negative).
    fn settle(
        &mut self,
        asset: &Asset,
        player: &PublicKey,
        net: i128,
    ) -> impl Future<Output = Result<(), PlinkoError>>;
}

pub async fn load_bankroll<S: State>(state: &S, asset: &Asset) -> anyhow::Result<Bankroll> {
    Ok(match state.get(&Key::Bankroll(*asset)).await? {
        Some(Value::Bankroll(bankroll)) => bankroll,
        _ => Bankroll::default(),
    })
}

pub async fn game_granted<S: State>(state: &S) -> anyhow::Result<bool> {
    Ok(matches!(
        state.get(&Key::GameGrant).await?,
        Some(Value::GameGrant(true))
    ))
}

pub async fn wallet_balance<S: State>(
    state: &S,
    player: &PublicKey,
    asset: &Asset,
) -> anyhow::Result<u64> {
    Ok(
        match state.get(&Key::Wallet(player.clone(), *asset)).await? {
            Some(Value::Wallet(balance)) => balance,
            _ => 0,
        },
    )
}

/// Adds to a wallet and returns the new balance.
pub async fn credit_wallet<S: State>(
    state: &mut S,
    player: &PublicKey,
    asset: &Asset,
    amount: u64,
) -> Result<u64, PlinkoError> {
    let balance = wallet_balance(state, player, asset)
        .await?
        .checked_add(amount)
        .ok_or(PlinkoError::ArithmeticOverflow)?;
    state
        .insert(Key::Wallet(player.clone(), *asset), Value::Wallet(balance))
        .await?;
    Ok(balance)
}

/// Takes from a wallet and returns the new balance.
pub async fn debit_wallet<S: State>(
    state: &mut S,
    player: &PublicKey,
    asset: &Asset,
    amount: u64,
) -> Result<u64, PlinkoError> {
    let available = wallet_balance(state, player, asset).await?;
    let balance = available
        .checked_sub(amount)
        .ok_or(PlinkoError::InsufficientFunds {
            needed: amount,
            available,
        })?;
    state
        .insert(Key::Wallet(player.clone(), *asset), Value::Wallet(balance))
        .await?;
    Ok(balance)
}

async fn ensure_granted<S: State>(state: &S) -> Result<(), PlinkoError> {
    if !game_granted(state).await? {
        return Err(PlinkoError::GameNotAuthorized);
    }
    Ok(())
}

impl<S: State> BankrollLedger for S {
    async fn available_balance(&self, asset: &Asset) -> Result<u64, PlinkoError> {
        ensure_granted(self).await?;
        Ok(load_bankroll(self, asset).await?.available())
    }

    async fn reserve(&mut self, asset: &Asset, amount: u64) -> Result<(), PlinkoError> {
        ensure_granted(self).await?;
        let mut bankroll = load_bankroll(self, asset).await?;
        if amount > bankroll.available() {
            return Err(PlinkoError::InsufficientBankroll {
                needed: amount,
                available: bankroll.available(),
            });
        }
        bankroll.reserved += amount;
        self.insert(Key::Bankroll(*asset), Value::Bankroll(bankroll))
            .await?;
        Ok(())
    }

    async fn release(&mut self, asset: &Asset, amount: u64) -> Result<(), PlinkoError> {
        ensure_granted(self).await?;
        let mut bankroll = load_bankroll(self, asset).await?;
        bankroll.reserved = bankroll.reserved.saturating_sub(amount);
        self.insert(Key::Bankroll(*asset), Value::Bankroll(bankroll))
            .await?;
        Ok(())
    }

    async fn settle(
        &mut self,
        asset: &Asset,
        player: &PublicKey,
        net: i128,
    ) -> Result<(), PlinkoError> {
        ensure_granted(self).await?;
        let mut bankroll = load_bankroll(self, asset).await?;
        let amount = u64::try_from(net.unsigned_abs()).map_err(|_| PlinkoError::ArithmeticOverflow)?;
        if net > 0 {
            if amount > bankroll.available() {
                return Err(PlinkoError::InsufficientBankroll {
                    needed: amount,
                    available: bankroll.available(),
                });
            }
            bankroll.balance -= amount;
            credit_wallet(self, player, asset, amount).await?;
        } else if net < 0 {
            debit_wallet(self, player, asset, amount).await?;
            bankroll.balance = bankroll
                .balance
                .checked_add(amount)
                .ok_or(PlinkoError::ArithmeticOverflow)?;
        }
        self.insert(Key::Bankroll(*asset), Value::Bankroll(bankroll))
            .await?;
        debug!(%asset, net, balance = bankroll.balance, "bankroll settled");
        Ok(())
    }
}
