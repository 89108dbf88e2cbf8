use anyhow::Result;
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;
use plinko_types::execution::{Account, Key, Value};
use std::future::Future;

#[cfg(any(test, feature = "mocks"))]
use std::collections::HashMap;

#[derive(Debug)]
pub enum PrepareError {
    NonceMismatch { expected: u64, got: u64 },
    State(anyhow::Error),
}

pub trait State {
    fn get(&self, key: &Key) -> impl Future<Output = Result<Option<Value>>>;
    fn insert(&mut self, key: Key, value: Value) -> impl Future<Output = Result<()>>;
    fn delete(&mut self, key: &Key) -> impl Future<Output = Result<()>>;

    fn apply(&mut self, changes: Vec<(Key, Status)>) -> impl Future<Output = Result<()>> {
        async {
            for (key, status) in changes {
                match status {
                    Status::Update(value) => self.insert(key, value).await?,
                    Status::Delete => self.delete(&key).await?,
                }
            }
            Ok(())
        }
    }
}

/// In-memory state used by tests and the simulator.
#[cfg(any(test, feature = "mocks"))]
#[derive(Default)]
pub struct Memory {
    state: HashMap<Key, Value>,
}

#[cfg(any(test, feature = "mocks"))]
impl State for Memory {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        Ok(self.state.get(key).cloned())
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        self.state.insert(key, value);
        Ok(())
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        self.state.remove(key);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::large_enum_variant)]
pub enum Status {
    Update(Value),
    Delete,
}

impl Write for Status {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Status::Update(value) => {
                0u8.write(writer);
                value.write(writer);
            }
            Status::Delete => 1u8.write(writer),
        }
    }
}

impl Read for Status {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Status::Update(Value::read(reader)?)),
            1 => Ok(Status::Delete),
            _ => Err(Error::InvalidEnum(kind)),
        }
    }
}

impl EncodeSize for Status {
    fn encode_size(&self) -> usize {
        1 + match self {
            Status::Update(value) => value.encode_size(),
            Status::Delete => 0,
        }
    }
}

pub async fn nonce<S: State>(state: &S, public: &PublicKey) -> Result<u64> {
    Ok(load_account(state, public).await?.nonce)
}

pub(crate) async fn load_account<S: State>(state: &S, public: &PublicKey) -> Result<Account> {
    Ok(match state.get(&Key::Account(public.clone())).await? {
        Some(Value::Account(account)) => account,
        _ => Account::default(),
    })
}

pub(crate) fn validate_and_increment_nonce(
    account: &mut Account,
    provided_nonce: u64,
) -> Result<(), PrepareError> {
    if account.nonce != provided_nonce {
        return Err(PrepareError::NonceMismatch {
            expected: account.nonce,
            got: provided_nonce,
        });
    }
    account.nonce += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_codec::Encode;
    use commonware_runtime::{deterministic::Runner, Runner as _};
    use plinko_types::plinko::Asset;

    impl Memory {
        fn len(&self) -> usize {
            self.state.len()
        }
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [Status::Update(Value::Wallet(42)), Status::Delete] {
            let encoded = status.encode();
            assert_eq!(encoded.len(), status.encode_size());
            assert_eq!(Status::read(&mut &encoded[..]).unwrap(), status);
        }
    }

    #[test]
    fn test_nonce_increment() {
        let mut account = Account::default();
        assert!(validate_and_increment_nonce(&mut account, 0).is_ok());
        assert_eq!(account.nonce, 1);
        assert!(matches!(
            validate_and_increment_nonce(&mut account, 0),
            Err(PrepareError::NonceMismatch {
                expected: 1,
                got: 0
            })
        ));
    }

    #[test]
    fn test_memory_apply() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut state = Memory::default();
            state
                .apply(vec![
                    (Key::GameGrant, Status::Update(Value::GameGrant(true))),
                    (Key::RequestSequence, Status::Update(Value::RequestSequence(3))),
                ])
                .await
                .unwrap();
            assert_eq!(state.len(), 2);
            state
                .apply(vec![(Key::GameGrant, Status::Delete)])
                .await
                .unwrap();
            assert_eq!(state.get(&Key::GameGrant).await.unwrap(), None);
            assert_eq!(
                state.get(&Key::Bankroll(Asset::Native)).await.unwrap(),
                None
            );
        });
    }
}
