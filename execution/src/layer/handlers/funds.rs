use super::super::*;
use crate::ledger::{credit_wallet, debit_wallet, load_bankroll};
use plinko_types::plinko::Asset;

impl<'a, S: State> Layer<'a, S> {
    pub(in crate::layer) async fn handle_fund_bankroll(
        &mut self,
        public: &PublicKey,
        asset: &Asset,
        amount: u64,
    ) -> Result<Vec<Event>, PlinkoError> {
        if amount == 0 {
            return Err(PlinkoError::InvalidAmount);
        }
        debit_wallet(self, public, asset, amount).await?;

        let mut bankroll = load_bankroll(self, asset).await?;
        bankroll.balance = bankroll
            .balance
            .checked_add(amount)
            .ok_or(PlinkoError::ArithmeticOverflow)?;
        self.insert(Key::Bankroll(*asset), Value::Bankroll(bankroll))
            .await?;

        debug!(funder = ?public, %asset, amount, balance = bankroll.balance, "bankroll funded");
        Ok(vec![Event::BankrollFunded {
            funder: public.clone(),
            asset: *asset,
            amount,
            balance: bankroll.balance,
        }])
    }

    /// Development faucet: mints up to `faucet_cap` per call.
    pub(in crate::layer) async fn handle_deposit(
        &mut self,
        public: &PublicKey,
        asset: &Asset,
        amount: u64,
    ) -> Result<Vec<Event>, PlinkoError> {
        if amount == 0 || amount > self.config.faucet_cap {
            return Err(PlinkoError::InvalidAmount);
        }
        let balance = credit_wallet(self, public, asset, amount).await?;

        Ok(vec![Event::Deposited {
            player: public.clone(),
            asset: *asset,
            amount,
            balance,
        }])
    }
}
