use anyhow::{Context as _, Result};
use commonware_cryptography::ed25519::PublicKey;
use plinko_types::{
    execution::{Event, Instruction, Key, Output, Transaction, Value},
    plinko::RequestId,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::PlinkoError;
use crate::plinko::PlayParams;
use crate::state::{load_account, validate_and_increment_nonce, PrepareError, State, Status};

mod handlers;

/// Staged execution of one block of transactions.
///
/// Writes land in an overlay over the backing state and only reach it through
/// [`Layer::commit`]. A transaction rejected with a domain error keeps its nonce increment and
/// nothing else.
pub struct Layer<'a, S: State> {
    state: &'a S,
    pending: BTreeMap<Key, Status>,
    // Overlay entries replaced by the transaction in flight, oldest first.
    undo: Vec<(Key, Option<Status>)>,

    config: &'a EngineConfig,
    namespace: Vec<u8>,
    view: u64,
}

impl<'a, S: State> Layer<'a, S> {
    pub fn new(state: &'a S, config: &'a EngineConfig, namespace: &[u8], view: u64) -> Self {
        Self {
            state,
            pending: BTreeMap::new(),
            undo: Vec::new(),

            config,
            namespace: namespace.to_vec(),
            view,
        }
    }

    async fn prepare(&mut self, transaction: &Transaction) -> Result<(), PrepareError> {
        let mut account = load_account(self, &transaction.public)
            .await
            .map_err(PrepareError::State)?;
        validate_and_increment_nonce(&mut account, transaction.nonce)?;
        self.pending.insert(
            Key::Account(transaction.public.clone()),
            Status::Update(Value::Account(account)),
        );

        Ok(())
    }

    async fn dispatch(
        &mut self,
        public: &PublicKey,
        nonce: u64,
        instruction: &Instruction,
    ) -> Result<Vec<Event>, PlinkoError> {
        match instruction {
            Instruction::Play {
                wager,
                asset,
                rows,
                risk,
                num_bets,
                stop_gain,
                stop_loss,
            } => {
                let params = PlayParams {
                    wager: *wager,
                    asset: *asset,
                    rows: *rows,
                    risk: *risk,
                    num_bets: *num_bets,
                    stop_gain: *stop_gain,
                    stop_loss: *stop_loss,
                };
                self.handle_play(public, nonce, params).await
            }
            Instruction::Fulfill { id, words } => self.handle_fulfill(public, id, words).await,
            Instruction::Refund { id } => self.handle_refund(public, id).await,
            Instruction::SetMultipliers { risk, rows, values } => {
                self.handle_set_multipliers(public, *risk, *rows, values)
                    .await
            }
            Instruction::SetLightningMode { active, fee } => {
                self.handle_set_lightning_mode(public, *active, *fee).await
            }
            Instruction::SetGameGrant { granted } => {
                self.handle_set_game_grant(public, *granted).await
            }
            Instruction::FundBankroll { asset, amount } => {
                self.handle_fund_bankroll(public, asset, *amount).await
            }
            Instruction::Deposit { asset, amount } => {
                self.handle_deposit(public, asset, *amount).await
            }
        }
    }

    fn stage(&mut self, key: Key, status: Status) {
        let previous = self.pending.insert(key.clone(), status);
        self.undo.push((key, previous));
    }

    fn rollback(&mut self) {
        while let Some((key, previous)) = self.undo.pop() {
            match previous {
                Some(status) => self.pending.insert(key, status),
                None => self.pending.remove(&key),
            };
        }
    }

    async fn apply(&mut self, transaction: &Transaction) -> Result<Vec<Event>> {
        // Nonce already staged by `prepare`; a rejection rolls back to this point.
        self.undo.clear();
        let result = self
            .dispatch(&transaction.public, transaction.nonce, &transaction.instruction)
            .await;

        match result {
            Ok(events) => Ok(events),
            Err(PlinkoError::State(err)) => Err(err),
            Err(err) => {
                self.rollback();
                let request = request_of(&transaction.instruction);
                match &err {
                    PlinkoError::InsufficientBankroll { .. } | PlinkoError::GameNotAuthorized => {
                        warn!(public = ?transaction.public, ?request, %err, "transaction rejected")
                    }
                    _ => {
                        debug!(public = ?transaction.public, ?request, %err, "transaction rejected")
                    }
                }
                Ok(vec![handlers::rejected(&transaction.public, request, &err)])
            }
        }
    }

    pub async fn execute(
        &mut self,
        transactions: Vec<Transaction>,
    ) -> Result<(Vec<Output>, BTreeMap<PublicKey, u64>)> {
        let mut processed_nonces = BTreeMap::new();
        let mut outputs = Vec::new();

        for tx in transactions {
            if !tx.verify() {
                debug!(
                    public = ?tx.public,
                    nonce = tx.nonce,
                    "invalid signature; dropping transaction"
                );
                continue;
            }
            match self.prepare(&tx).await {
                Ok(()) => {}
                Err(PrepareError::NonceMismatch { expected, got }) => {
                    debug!(
                        public = ?tx.public,
                        expected,
                        got,
                        "nonce mismatch; dropping transaction"
                    );
                    continue;
                }
                Err(PrepareError::State(err)) => {
                    return Err(err).context("state error during prepare");
                }
            }
            processed_nonces.insert(tx.public.clone(), tx.nonce.saturating_add(1));
            let events = self
                .apply(&tx)
                .await
                .context("state error during apply")?;
            outputs.extend(events.into_iter().map(Output::Event));
            outputs.push(Output::Transaction(tx));
        }

        Ok((outputs, processed_nonces))
    }

    pub fn commit(self) -> Vec<(Key, Status)> {
        self.pending.into_iter().collect()
    }
}

fn request_of(instruction: &Instruction) -> Option<RequestId> {
    match instruction {
        Instruction::Fulfill { id, .. } | Instruction::Refund { id } => Some(*id),
        _ => None,
    }
}

impl<'a, S: State> State for Layer<'a, S> {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(match self.pending.get(key) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key).await?,
        })
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.stage(key, Status::Update(value));
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        self.stage(key.clone(), Status::Delete);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_account_keypair, engine_config};
    use crate::query;
    use commonware_runtime::deterministic::Runner;
    use commonware_runtime::Runner as _;
    use plinko_types::plinko::{Asset, Bankroll, LightningMode, NATIVE_UNIT};
    use plinko_types::NAMESPACE;

    struct MockState {
        data: std::collections::HashMap<Key, Value>,
    }

    impl MockState {
        fn new() -> Self {
            Self {
                data: std::collections::HashMap::new(),
            }
        }
    }

    impl State for MockState {
        async fn get(&self, key: &Key) -> Result<Option<Value>> {
            Ok(self.data.get(key).cloned())
        }

        async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
            self.data.insert(key, value);
            Ok(())
        }

        async fn delete(&mut self, key: &Key) -> Result<()> {
            self.data.remove(key);
            Ok(())
        }
    }

    struct FailingState;

    impl State for FailingState {
        async fn get(&self, _key: &Key) -> Result<Option<Value>> {
            anyhow::bail!("disk unavailable")
        }

        async fn insert(&mut self, _key: Key, _value: Value) -> Result<()> {
            anyhow::bail!("disk unavailable")
        }

        async fn delete(&mut self, _key: &Key) -> Result<()> {
            anyhow::bail!("disk unavailable")
        }
    }

    fn deposit(amount: u64) -> Instruction {
        Instruction::Deposit {
            asset: Asset::Native,
            amount,
        }
    }

    #[test]
    fn test_nonce_validation() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = MockState::new();
            let (_, config) = engine_config();
            let mut layer = Layer::new(&state, &config, NAMESPACE, 1);

            let (signer, _) = create_account_keypair(10);

            // Wrong nonce should fail
            let tx = Transaction::sign(&signer, 1, deposit(NATIVE_UNIT));
            assert!(layer.prepare(&tx).await.is_err());

            // Correct nonce should succeed
            let tx = Transaction::sign(&signer, 0, deposit(NATIVE_UNIT));
            assert!(layer.prepare(&tx).await.is_ok());

            // Same nonce again should fail
            assert!(layer.prepare(&tx).await.is_err());

            // Next nonce should succeed
            let tx = Transaction::sign(&signer, 1, deposit(NATIVE_UNIT));
            assert!(layer.prepare(&tx).await.is_ok());
        });
    }

    #[test]
    fn test_execute_drops_bad_nonce() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = MockState::new();
            let (_, config) = engine_config();
            let mut layer = Layer::new(&state, &config, NAMESPACE, 1);
            let (signer, public) = create_account_keypair(10);

            let (outputs, nonces) = layer
                .execute(vec![
                    Transaction::sign(&signer, 0, deposit(NATIVE_UNIT)),
                    Transaction::sign(&signer, 5, deposit(NATIVE_UNIT)),
                ])
                .await
                .unwrap();

            // One event plus one transaction; the second transaction is dropped.
            assert_eq!(outputs.len(), 2);
            assert_eq!(nonces.get(&public), Some(&1));
            assert_eq!(
                query::wallet_balance(&layer, &public, &Asset::Native)
                    .await
                    .unwrap(),
                NATIVE_UNIT
            );
        });
    }

    #[test]
    fn test_rejection_keeps_only_nonce() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = MockState::new();
            let (_, config) = engine_config();
            let mut layer = Layer::new(&state, &config, NAMESPACE, 1);
            let (signer, public) = create_account_keypair(10);

            let (outputs, _) = layer
                .execute(vec![Transaction::sign(
                    &signer,
                    0,
                    Instruction::FundBankroll {
                        asset: Asset::Native,
                        amount: NATIVE_UNIT,
                    },
                )])
                .await
                .unwrap();

            assert!(matches!(
                &outputs[0],
                Output::Event(Event::PlinkoRejected {
                    error_code,
                    request: None,
                    ..
                }) if *error_code == plinko_types::plinko::ERROR_INSUFFICIENT_FUNDS
            ));

            let changes = layer.commit();
            assert_eq!(changes.len(), 1);
            assert_eq!(changes[0].0, Key::Account(public));
        });
    }

    #[test]
    fn test_rollback_restores_overlay() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = MockState::new();
            let (_, config) = engine_config();
            let mut layer = Layer::new(&state, &config, NAMESPACE, 1);
            let kept = Key::Bankroll(Asset::Native);
            let fresh = Key::LightningMode;

            layer
                .insert(kept.clone(), Value::Bankroll(Bankroll::default()))
                .await
                .unwrap();
            layer.undo.clear();

            layer
                .insert(
                    kept.clone(),
                    Value::Bankroll(Bankroll {
                        balance: 5,
                        reserved: 0,
                    }),
                )
                .await
                .unwrap();
            layer.delete(&kept).await.unwrap();
            layer
                .insert(fresh.clone(), Value::LightningMode(LightningMode::default()))
                .await
                .unwrap();
            layer.rollback();

            assert_eq!(
                layer.get(&kept).await.unwrap(),
                Some(Value::Bankroll(Bankroll::default()))
            );
            assert_eq!(layer.get(&fresh).await.unwrap(), None);
            assert!(layer.undo.is_empty());
        });
    }

    #[test]
    fn test_forged_signature_dropped() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = MockState::new();
            let (_, config) = engine_config();
            let mut layer = Layer::new(&state, &config, NAMESPACE, 1);
            let (signer, _) = create_account_keypair(10);
            let (_, victim) = create_account_keypair(11);

            let mut tx = Transaction::sign(&signer, 0, deposit(NATIVE_UNIT));
            tx.public = victim.clone();
            let (outputs, nonces) = layer.execute(vec![tx]).await.unwrap();

            assert!(outputs.is_empty());
            assert!(nonces.is_empty());
            assert!(layer.commit().is_empty());
        });
    }

    #[test]
    fn test_commit_applies_to_state() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut state = MockState::new();
            let (_, config) = engine_config();
            let (signer, public) = create_account_keypair(10);

            let changes = {
                let mut layer = Layer::new(&state, &config, NAMESPACE, 1);
                layer
                    .execute(vec![Transaction::sign(&signer, 0, deposit(7))])
                    .await
                    .unwrap();
                layer.commit()
            };
            state.apply(changes).await.unwrap();

            assert_eq!(crate::state::nonce(&state, &public).await.unwrap(), 1);
            assert_eq!(
                query::wallet_balance(&state, &public, &Asset::Native)
                    .await
                    .unwrap(),
                7
            );
        });
    }

    #[test]
    fn test_storage_failure_aborts() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = FailingState;
            let (_, config) = engine_config();
            let mut layer = Layer::new(&state, &config, NAMESPACE, 1);
            let (signer, _) = create_account_keypair(10);

            let result = layer
                .execute(vec![Transaction::sign(&signer, 0, deposit(1))])
                .await;
            assert!(result.is_err());
        });
    }
}
