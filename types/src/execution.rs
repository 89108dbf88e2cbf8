use bytes::{Buf, BufMut};
use commonware_codec::{Encode, EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use commonware_cryptography::{
    ed25519::{self, PublicKey},
    sha256::{Digest, Sha256},
    Digestible, Hasher, Signer, Verifier,
};
use commonware_utils::union;
use std::fmt::Debug;

use crate::plinko::{
    read_string, string_encode_size, write_string, Asset, Bankroll, LightningMode,
    MultiplierTable, PlayRequest, RandomWord, RequestId, MAX_BETS, MAX_BUCKETS,
    MAX_ERROR_MESSAGE_LENGTH,
};

pub const NAMESPACE: &[u8] = b"_PLINKO";
pub const TRANSACTION_SUFFIX: &[u8] = b"_TX";
pub const REQUEST_SUFFIX: &[u8] = b"_REQUEST";

#[inline]
pub fn transaction_namespace(namespace: &[u8]) -> Vec<u8> {
    union(namespace, TRANSACTION_SUFFIX)
}

#[inline]
pub fn request_namespace(namespace: &[u8]) -> Vec<u8> {
    union(namespace, REQUEST_SUFFIX)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    pub instruction: Instruction,

    pub public: ed25519::PublicKey,
    pub signature: ed25519::Signature,
}

impl Transaction {
    fn payload(nonce: &u64, instruction: &Instruction) -> Vec<u8> {
        let mut payload = Vec::new();
        nonce.write(&mut payload);
        instruction.write(&mut payload);

        payload
    }

    pub fn sign(private: &ed25519::PrivateKey, nonce: u64, instruction: Instruction) -> Self {
        let signature = private.sign(
            &transaction_namespace(NAMESPACE),
            &Self::payload(&nonce, &instruction),
        );

        Self {
            nonce,
            instruction,
            public: private.public_key(),
            signature,
        }
    }

    pub fn verify(&self) -> bool {
        self.public.verify(
            &transaction_namespace(NAMESPACE),
            &Self::payload(&self.nonce, &self.instruction),
            &self.signature,
        )
    }
}

impl Write for Transaction {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
        self.instruction.write(writer);
        self.public.write(writer);
        self.signature.write(writer);
    }
}

impl Read for Transaction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let nonce = u64::read(reader)?;
        let instruction = Instruction::read(reader)?;
        let public = ed25519::PublicKey::read(reader)?;
        let signature = ed25519::Signature::read(reader)?;

        Ok(Self {
            nonce,
            instruction,
            public,
            signature,
        })
    }
}

impl EncodeSize for Transaction {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size()
            + self.instruction.encode_size()
            + self.public.encode_size()
            + self.signature.encode_size()
    }
}

impl Digestible for Transaction {
    type Digest = Digest;

    fn digest(&self) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(self.nonce.to_be_bytes().as_ref());
        hasher.update(self.instruction.encode().as_ref());
        hasher.update(self.public.as_ref());
        // The signature is excluded: any valid signature authorizes the same transaction.
        hasher.finalize()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Drop `num_bets` balls of `wager` each.
    /// Binary: [0] [wager:u64] [asset] [rows:u8] [risk:u8] [numBets:u32] [stopGain:u64] [stopLoss:u64]
    Play {
        wager: u64,
        asset: Asset,
        rows: u8,
        risk: u8,
        num_bets: u32,
        stop_gain: u64,
        stop_loss: u64,
    },

    /// Oracle callback carrying one random word per bet.
    /// Binary: [1] [id:32] [len:varint] [word:32]...
    Fulfill { id: RequestId, words: Vec<RandomWord> },

    /// Reclaim the escrow of a request the oracle never answered.
    /// Binary: [2] [id:32]
    Refund { id: RequestId },

    /// Replace one multiplier slot (admin).
    /// Binary: [3] [risk:u8] [rows:u8] [len:varint] [value:u32]...
    SetMultipliers { risk: u8, rows: u8, values: Vec<u32> },

    /// Toggle lightning mode and set its fee (admin).
    /// Binary: [4] [active:u8] [fee:u64]
    SetLightningMode { active: bool, fee: u64 },

    /// Grant or revoke the game capability on the bankroll (admin).
    /// Binary: [5] [granted:u8]
    SetGameGrant { granted: bool },

    /// Move funds from the sender's wallet into the bankroll.
    /// Binary: [6] [asset] [amount:u64]
    FundBankroll { asset: Asset, amount: u64 },

    /// Mint test funds into the sender's wallet (faucet).
    /// Binary: [7] [asset] [amount:u64]
    Deposit { asset: Asset, amount: u64 },
}

impl Write for Instruction {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Play {
                wager,
                asset,
                rows,
                risk,
                num_bets,
                stop_gain,
                stop_loss,
            } => {
                0u8.write(writer);
                wager.write(writer);
                asset.write(writer);
                rows.write(writer);
                risk.write(writer);
                num_bets.write(writer);
                stop_gain.write(writer);
                stop_loss.write(writer);
            }
            Self::Fulfill { id, words } => {
                1u8.write(writer);
                id.write(writer);
                words.write(writer);
            }
            Self::Refund { id } => {
                2u8.write(writer);
                id.write(writer);
            }
            Self::SetMultipliers { risk, rows, values } => {
                3u8.write(writer);
                risk.write(writer);
                rows.write(writer);
                values.write(writer);
            }
            Self::SetLightningMode { active, fee } => {
                4u8.write(writer);
                active.write(writer);
                fee.write(writer);
            }
            Self::SetGameGrant { granted } => {
                5u8.write(writer);
                granted.write(writer);
            }
            Self::FundBankroll { asset, amount } => {
                6u8.write(writer);
                asset.write(writer);
                amount.write(writer);
            }
            Self::Deposit { asset, amount } => {
                7u8.write(writer);
                asset.write(writer);
                amount.write(writer);
            }
        }
    }
}

impl Read for Instruction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let instruction = match u8::read(reader)? {
            0 => Self::Play {
                wager: u64::read(reader)?,
                asset: Asset::read(reader)?,
                rows: u8::read(reader)?,
                risk: u8::read(reader)?,
                num_bets: u32::read(reader)?,
                stop_gain: u64::read(reader)?,
                stop_loss: u64::read(reader)?,
            },
            1 => Self::Fulfill {
                id: Digest::read(reader)?,
                words: Vec::<RandomWord>::read_range(reader, 0..=MAX_BETS as usize)?,
            },
            2 => Self::Refund {
                id: Digest::read(reader)?,
            },
            3 => Self::SetMultipliers {
                risk: u8::read(reader)?,
                rows: u8::read(reader)?,
                values: Vec::<u32>::read_range(reader, 0..=MAX_BUCKETS)?,
            },
            4 => Self::SetLightningMode {
                active: bool::read(reader)?,
                fee: u64::read(reader)?,
            },
            5 => Self::SetGameGrant {
                granted: bool::read(reader)?,
            },
            6 => Self::FundBankroll {
                asset: Asset::read(reader)?,
                amount: u64::read(reader)?,
            },
            7 => Self::Deposit {
                asset: Asset::read(reader)?,
                amount: u64::read(reader)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(instruction)
    }
}

impl EncodeSize for Instruction {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Play { asset, .. } => {
                    u64::SIZE + asset.encode_size() + u8::SIZE * 2 + u32::SIZE + u64::SIZE * 2
                }
                Self::Fulfill { words, .. } => Digest::SIZE + words.encode_size(),
                Self::Refund { .. } => Digest::SIZE,
                Self::SetMultipliers { values, .. } => u8::SIZE * 2 + values.encode_size(),
                Self::SetLightningMode { .. } => bool::SIZE + u64::SIZE,
                Self::SetGameGrant { .. } => bool::SIZE,
                Self::FundBankroll { asset, .. } | Self::Deposit { asset, .. } => {
                    asset.encode_size() + u64::SIZE
                }
            }
    }
}

/// Minimal account structure for transaction nonce tracking.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct Account {
    pub nonce: u64,
}

impl Write for Account {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
    }
}

impl Read for Account {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            nonce: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Account {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size()
    }
}

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug)]
pub enum Key {
    /// Account for nonce tracking (tag 0)
    Account(PublicKey),

    // Bankroll keys (tags 1-2)
    Bankroll(Asset),
    GameGrant,

    // Game configuration (tags 3-4)
    Multipliers,
    LightningMode,

    // Requests (tags 5-7)
    PlayRequest(RequestId),
    PendingPlay(PublicKey),
    RequestSequence,

    // Player funds (tag 8)
    Wallet(PublicKey, Asset),
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(account) => {
                0u8.write(writer);
                account.write(writer);
            }
            Self::Bankroll(asset) => {
                1u8.write(writer);
                asset.write(writer);
            }
            Self::GameGrant => 2u8.write(writer),
            Self::Multipliers => 3u8.write(writer),
            Self::LightningMode => 4u8.write(writer),
            Self::PlayRequest(id) => {
                5u8.write(writer);
                id.write(writer);
            }
            Self::PendingPlay(player) => {
                6u8.write(writer);
                player.write(writer);
            }
            Self::RequestSequence => 7u8.write(writer),
            Self::Wallet(player, asset) => {
                8u8.write(writer);
                player.write(writer);
                asset.write(writer);
            }
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let key = match u8::read(reader)? {
            0 => Self::Account(PublicKey::read(reader)?),
            1 => Self::Bankroll(Asset::read(reader)?),
            2 => Self::GameGrant,
            3 => Self::Multipliers,
            4 => Self::LightningMode,
            5 => Self::PlayRequest(Digest::read(reader)?),
            6 => Self::PendingPlay(PublicKey::read(reader)?),
            7 => Self::RequestSequence,
            8 => Self::Wallet(PublicKey::read(reader)?, Asset::read(reader)?),
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(_) | Self::PendingPlay(_) => PublicKey::SIZE,
                Self::Bankroll(asset) => asset.encode_size(),
                Self::GameGrant
                | Self::Multipliers
                | Self::LightningMode
                | Self::RequestSequence => 0,
                Self::PlayRequest(_) => Digest::SIZE,
                Self::Wallet(_, asset) => PublicKey::SIZE + asset.encode_size(),
            }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[allow(clippy::large_enum_variant)]
pub enum Value {
    Account(Account),
    Bankroll(Bankroll),
    GameGrant(bool),
    Multipliers(MultiplierTable),
    LightningMode(LightningMode),
    PlayRequest(PlayRequest),
    PendingPlay(RequestId),
    RequestSequence(u64),
    Wallet(u64),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(account) => {
                0u8.write(writer);
                account.write(writer);
            }
            Self::Bankroll(bankroll) => {
                1u8.write(writer);
                bankroll.write(writer);
            }
            Self::GameGrant(granted) => {
                2u8.write(writer);
                granted.write(writer);
            }
            Self::Multipliers(table) => {
                3u8.write(writer);
                table.write(writer);
            }
            Self::LightningMode(mode) => {
                4u8.write(writer);
                mode.write(writer);
            }
            Self::PlayRequest(request) => {
                5u8.write(writer);
                request.write(writer);
            }
            Self::PendingPlay(id) => {
                6u8.write(writer);
                id.write(writer);
            }
            Self::RequestSequence(sequence) => {
                7u8.write(writer);
                sequence.write(writer);
            }
            Self::Wallet(balance) => {
                8u8.write(writer);
                balance.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = match u8::read(reader)? {
            0 => Self::Account(Account::read(reader)?),
            1 => Self::Bankroll(Bankroll::read(reader)?),
            2 => Self::GameGrant(bool::read(reader)?),
            3 => Self::Multipliers(MultiplierTable::read(reader)?),
            4 => Self::LightningMode(LightningMode::read(reader)?),
            5 => Self::PlayRequest(PlayRequest::read(reader)?),
            6 => Self::PendingPlay(Digest::read(reader)?),
            7 => Self::RequestSequence(u64::read(reader)?),
            8 => Self::Wallet(u64::read(reader)?),
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(account) => account.encode_size(),
                Self::Bankroll(_) => Bankroll::SIZE,
                Self::GameGrant(_) => bool::SIZE,
                Self::Multipliers(table) => table.encode_size(),
                Self::LightningMode(_) => LightningMode::SIZE,
                Self::PlayRequest(request) => request.encode_size(),
                Self::PendingPlay(_) => Digest::SIZE,
                Self::RequestSequence(_) | Self::Wallet(_) => u64::SIZE,
            }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    // Settlement events (tags 0-3)
    PlayAccepted {
        id: RequestId,
        player: PublicKey,
        wager: u64,
        asset: Asset,
        rows: u8,
        risk: u8,
        num_bets: u32,
        stop_gain: u64,
        stop_loss: u64,
        lightning: bool,
    },
    RandomnessRequested {
        id: RequestId,
        num_words: u32,
    },
    PlayOutcome {
        id: RequestId,
        player: PublicKey,
        total_wager: u64,
        total_payout: u64,
        asset: Asset,
        paths: Vec<u16>,
        lightning: Vec<bool>,
        rows: u8,
        risk: u8,
        payouts: Vec<u64>,
        games_played: u32,
    },
    PlayRefunded {
        id: RequestId,
        player: PublicKey,
        asset: Asset,
        amount: u64,
    },

    // Administration events (tags 4-6)
    MultipliersUpdated {
        risk: u8,
        rows: u8,
        values: Vec<u32>,
    },
    LightningModeUpdated {
        mode: LightningMode,
    },
    GameGrantUpdated {
        granted: bool,
    },

    // Funds events (tags 7-8)
    BankrollFunded {
        funder: PublicKey,
        asset: Asset,
        amount: u64,
        balance: u64,
    },
    Deposited {
        player: PublicKey,
        asset: Asset,
        amount: u64,
        balance: u64,
    },

    // Error event (tag 9)
    PlinkoRejected {
        caller: PublicKey,
        request: Option<RequestId>,
        error_code: u8,
        message: String,
    },
}

impl Write for Event {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::PlayAccepted {
                id,
                player,
                wager,
                asset,
                rows,
                risk,
                num_bets,
                stop_gain,
                stop_loss,
                lightning,
            } => {
                0u8.write(writer);
                id.write(writer);
                player.write(writer);
                wager.write(writer);
                asset.write(writer);
                rows.write(writer);
                risk.write(writer);
                num_bets.write(writer);
                stop_gain.write(writer);
                stop_loss.write(writer);
                lightning.write(writer);
            }
            Self::RandomnessRequested { id, num_words } => {
                1u8.write(writer);
                id.write(writer);
                num_words.write(writer);
            }
            Self::PlayOutcome {
                id,
                player,
                total_wager,
                total_payout,
                asset,
                paths,
                lightning,
                rows,
                risk,
                payouts,
                games_played,
            } => {
                2u8.write(writer);
                id.write(writer);
                player.write(writer);
                total_wager.write(writer);
                total_payout.write(writer);
                asset.write(writer);
                paths.write(writer);
                lightning.write(writer);
                rows.write(writer);
                risk.write(writer);
                payouts.write(writer);
                games_played.write(writer);
            }
            Self::PlayRefunded {
                id,
                player,
                asset,
                amount,
            } => {
                3u8.write(writer);
                id.write(writer);
                player.write(writer);
                asset.write(writer);
                amount.write(writer);
            }
            Self::MultipliersUpdated { risk, rows, values } => {
                4u8.write(writer);
                risk.write(writer);
                rows.write(writer);
                values.write(writer);
            }
            Self::LightningModeUpdated { mode } => {
                5u8.write(writer);
                mode.write(writer);
            }
            Self::GameGrantUpdated { granted } => {
                6u8.write(writer);
                granted.write(writer);
            }
            Self::BankrollFunded {
                funder,
                asset,
                amount,
                balance,
            } => {
                7u8.write(writer);
                funder.write(writer);
                asset.write(writer);
                amount.write(writer);
                balance.write(writer);
            }
            Self::Deposited {
                player,
                asset,
                amount,
                balance,
            } => {
                8u8.write(writer);
                player.write(writer);
                asset.write(writer);
                amount.write(writer);
                balance.write(writer);
            }
            Self::PlinkoRejected {
                caller,
                request,
                error_code,
                message,
            } => {
                9u8.write(writer);
                caller.write(writer);
                request.write(writer);
                error_code.write(writer);
                write_string(message, writer);
            }
        }
    }
}

impl Read for Event {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let event = match u8::read(reader)? {
            0 => Self::PlayAccepted {
                id: Digest::read(reader)?,
                player: PublicKey::read(reader)?,
                wager: u64::read(reader)?,
                asset: Asset::read(reader)?,
                rows: u8::read(reader)?,
                risk: u8::read(reader)?,
                num_bets: u32::read(reader)?,
                stop_gain: u64::read(reader)?,
                stop_loss: u64::read(reader)?,
                lightning: bool::read(reader)?,
            },
            1 => Self::RandomnessRequested {
                id: Digest::read(reader)?,
                num_words: u32::read(reader)?,
            },
            2 => Self::PlayOutcome {
                id: Digest::read(reader)?,
                player: PublicKey::read(reader)?,
                total_wager: u64::read(reader)?,
                total_payout: u64::read(reader)?,
                asset: Asset::read(reader)?,
                paths: Vec::<u16>::read_range(reader, 0..=MAX_BETS as usize)?,
                lightning: Vec::<bool>::read_range(reader, 0..=MAX_BETS as usize)?,
                rows: u8::read(reader)?,
                risk: u8::read(reader)?,
                payouts: Vec::<u64>::read_range(reader, 0..=MAX_BETS as usize)?,
                games_played: u32::read(reader)?,
            },
            3 => Self::PlayRefunded {
                id: Digest::read(reader)?,
                player: PublicKey::read(reader)?,
                asset: Asset::read(reader)?,
                amount: u64::read(reader)?,
            },
            4 => Self::MultipliersUpdated {
                risk: u8::read(reader)?,
                rows: u8::read(reader)?,
                values: Vec::<u32>::read_range(reader, 0..=MAX_BUCKETS)?,
            },
            5 => Self::LightningModeUpdated {
                mode: LightningMode::read(reader)?,
            },
            6 => Self::GameGrantUpdated {
                granted: bool::read(reader)?,
            },
            7 => Self::BankrollFunded {
                funder: PublicKey::read(reader)?,
                asset: Asset::read(reader)?,
                amount: u64::read(reader)?,
                balance: u64::read(reader)?,
            },
            8 => Self::Deposited {
                player: PublicKey::read(reader)?,
                asset: Asset::read(reader)?,
                amount: u64::read(reader)?,
                balance: u64::read(reader)?,
            },
            9 => Self::PlinkoRejected {
                caller: PublicKey::read(reader)?,
                request: Option::<Digest>::read(reader)?,
                error_code: u8::read(reader)?,
                message: read_string(reader, MAX_ERROR_MESSAGE_LENGTH)?,
            },
            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(event)
    }
}

impl EncodeSize for Event {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::PlayAccepted { asset, .. } => {
                    Digest::SIZE
                        + PublicKey::SIZE
                        + u64::SIZE
                        + asset.encode_size()
                        + u8::SIZE * 2
                        + u32::SIZE
                        + u64::SIZE * 2
                        + bool::SIZE
                }
                Self::RandomnessRequested { .. } => Digest::SIZE + u32::SIZE,
                Self::PlayOutcome {
                    asset,
                    paths,
                    lightning,
                    payouts,
                    ..
                } => {
                    Digest::SIZE
                        + PublicKey::SIZE
                        + u64::SIZE * 2
                        + asset.encode_size()
                        + paths.encode_size()
                        + lightning.encode_size()
                        + u8::SIZE * 2
                        + payouts.encode_size()
                        + u32::SIZE
                }
                Self::PlayRefunded { asset, .. } => {
                    Digest::SIZE + PublicKey::SIZE + asset.encode_size() + u64::SIZE
                }
                Self::MultipliersUpdated { values, .. } => u8::SIZE * 2 + values.encode_size(),
                Self::LightningModeUpdated { .. } => LightningMode::SIZE,
                Self::GameGrantUpdated { .. } => bool::SIZE,
                Self::BankrollFunded { asset, .. } | Self::Deposited { asset, .. } => {
                    PublicKey::SIZE + asset.encode_size() + u64::SIZE * 2
                }
                Self::PlinkoRejected {
                    request, message, ..
                } => {
                    PublicKey::SIZE
                        + request.encode_size()
                        + u8::SIZE
                        + string_encode_size(message)
                }
            }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::large_enum_variant)]
pub enum Output {
    Event(Event),
    Transaction(Transaction),
}

impl Write for Output {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Event(event) => {
                0u8.write(writer);
                event.write(writer);
            }
            Self::Transaction(transaction) => {
                1u8.write(writer);
                transaction.write(writer);
            }
        }
    }
}

impl Read for Output {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Self::Event(Event::read(reader)?)),
            1 => Ok(Self::Transaction(Transaction::read(reader)?)),
            _ => Err(Error::InvalidEnum(kind)),
        }
    }
}

impl EncodeSize for Output {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Event(event) => event.encode_size(),
                Self::Transaction(transaction) => transaction.encode_size(),
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plinko::{PlayStatus, NATIVE_UNIT, TOKEN_ADDRESS_LEN};
    use commonware_math::algebra::Random;
    use rand::{rngs::StdRng, SeedableRng};

    fn private_key(seed: u64) -> ed25519::PrivateKey {
        let mut rng = StdRng::seed_from_u64(seed);
        ed25519::PrivateKey::random(&mut rng)
    }

    fn roundtrip<T: Write + EncodeSize + Read<Cfg = ()> + PartialEq + Debug>(value: &T) {
        let encoded = value.encode();
        assert_eq!(encoded.len(), value.encode_size());
        let decoded = T::read(&mut &encoded[..]).expect("decode");
        assert_eq!(&decoded, value);
    }

    #[test]
    fn test_transaction_sign_verify() {
        let private = private_key(1);
        let tx = Transaction::sign(
            &private,
            3,
            Instruction::Play {
                wager: NATIVE_UNIT / 20,
                asset: Asset::Native,
                rows: 16,
                risk: 1,
                num_bets: 13,
                stop_gain: 1_000 * NATIVE_UNIT,
                stop_loss: 1_000 * NATIVE_UNIT,
            },
        );
        assert!(tx.verify());
        roundtrip(&tx);

        let mut tampered = tx.clone();
        tampered.nonce = 4;
        assert!(!tampered.verify());
        assert_ne!(tampered.digest(), tx.digest());
    }

    #[test]
    fn test_instruction_codec() {
        let id = Sha256::hash(b"id");
        for instruction in [
            Instruction::Fulfill {
                id,
                words: vec![RandomWord([7; 32]), RandomWord([9; 32])],
            },
            Instruction::Refund { id },
            Instruction::SetMultipliers {
                risk: 2,
                rows: 8,
                values: vec![1; 9],
            },
            Instruction::SetLightningMode {
                active: true,
                fee: 5,
            },
            Instruction::SetGameGrant { granted: true },
            Instruction::FundBankroll {
                asset: Asset::Token([1; TOKEN_ADDRESS_LEN]),
                amount: 10,
            },
            Instruction::Deposit {
                asset: Asset::Native,
                amount: 10,
            },
        ] {
            roundtrip(&instruction);
        }
    }

    #[test]
    fn test_fulfill_rejects_too_many_words() {
        let words = vec![RandomWord([0; 32]); MAX_BETS as usize + 1];
        let encoded = Instruction::Fulfill {
            id: Sha256::hash(b"id"),
            words,
        }
        .encode();
        assert!(Instruction::read(&mut &encoded[..]).is_err());
    }

    #[test]
    fn test_unknown_tags_rejected() {
        assert!(matches!(
            Instruction::read(&mut [42u8].as_slice()),
            Err(Error::InvalidEnum(42))
        ));
        assert!(matches!(
            Key::read(&mut [42u8].as_slice()),
            Err(Error::InvalidEnum(42))
        ));
        assert!(matches!(
            Value::read(&mut [42u8].as_slice()),
            Err(Error::InvalidEnum(42))
        ));
        assert!(matches!(
            Event::read(&mut [42u8].as_slice()),
            Err(Error::InvalidEnum(42))
        ));
    }

    #[test]
    fn test_state_codec() {
        let player = private_key(2).public_key();
        let id = Sha256::hash(b"play");
        roundtrip(&Key::Wallet(player.clone(), Asset::Native));
        roundtrip(&Key::PlayRequest(id));
        roundtrip(&Key::GameGrant);
        roundtrip(&Value::Multipliers(MultiplierTable::standard()));
        roundtrip(&Value::PlayRequest(PlayRequest {
            id,
            player,
            asset: Asset::Native,
            wager: 1,
            rows: 8,
            risk: 0,
            num_bets: 1,
            stop_gain: 0,
            stop_loss: 0,
            lightning: false,
            lightning_fee: 0,
            escrow: 1,
            reserved: 1,
            created: 0,
            status: PlayStatus::Fulfilled,
        }));
    }

    #[test]
    fn test_event_codec() {
        let player = private_key(3).public_key();
        let id = Sha256::hash(b"event");
        roundtrip(&Event::PlayOutcome {
            id,
            player: player.clone(),
            total_wager: 100,
            total_payout: 250,
            asset: Asset::Native,
            paths: vec![0xcf6d, 0x135c],
            lightning: vec![false, false],
            rows: 16,
            risk: 1,
            payouts: vec![200, 50],
            games_played: 2,
        });
        roundtrip(&Event::PlinkoRejected {
            caller: player,
            request: Some(id),
            error_code: 4,
            message: "wager above limit".to_string(),
        });
        roundtrip(&Output::Event(Event::GameGrantUpdated { granted: false }));
    }
}
