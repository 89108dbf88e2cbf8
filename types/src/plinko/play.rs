use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use commonware_cryptography::{ed25519::PublicKey, sha256::Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Asset, DEFAULT_LIGHTNING_FEE, WORD_SIZE};

/// Correlation id linking a randomness request to its fulfillment.
pub type RequestId = Digest;

/// One 256-bit word of oracle randomness, big-endian.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RandomWord(pub [u8; WORD_SIZE]);

impl RandomWord {
    pub fn as_bytes(&self) -> &[u8; WORD_SIZE] {
        &self.0
    }

    /// Low 16 bits of the word read as a big-endian integer.
    pub fn low_u16(&self) -> u16 {
        u16::from_be_bytes([self.0[WORD_SIZE - 2], self.0[WORD_SIZE - 1]])
    }
}

impl From<[u8; WORD_SIZE]> for RandomWord {
    fn from(bytes: [u8; WORD_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for RandomWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RandomWord({})", commonware_utils::hex(&self.0))
    }
}

impl Write for RandomWord {
    fn write(&self, writer: &mut impl BufMut) {
        writer.put_slice(&self.0);
    }
}

impl Read for RandomWord {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        if reader.remaining() < WORD_SIZE {
            return Err(Error::EndOfBuffer);
        }
        let mut word = [0u8; WORD_SIZE];
        reader.copy_to_slice(&mut word);
        Ok(Self(word))
    }
}

impl FixedSize for RandomWord {
    const SIZE: usize = WORD_SIZE;
}

/// Global lightning mode toggle and its per-play fee (native units).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightningMode {
    pub active: bool,
    pub fee: u64,
}

impl Default for LightningMode {
    fn default() -> Self {
        Self {
            active: false,
            fee: DEFAULT_LIGHTNING_FEE,
        }
    }
}

impl LightningMode {
    /// Fee charged to a play accepted under this configuration.
    pub fn charge(&self) -> u64 {
        if self.active {
            self.fee
        } else {
            0
        }
    }
}

impl Write for LightningMode {
    fn write(&self, writer: &mut impl BufMut) {
        self.active.write(writer);
        self.fee.write(writer);
    }
}

impl Read for LightningMode {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            active: bool::read(reader)?,
            fee: u64::read(reader)?,
        })
    }
}

impl FixedSize for LightningMode {
    const SIZE: usize = bool::SIZE + u64::SIZE;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PlayStatus {
    Pending = 0,
    Fulfilled = 1,
}

impl Write for PlayStatus {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for PlayStatus {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Fulfilled),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for PlayStatus {
    const SIZE: usize = u8::SIZE;
}

/// A player's multi-bet play, alive from acceptance until its randomness arrives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayRequest {
    pub id: RequestId,
    pub player: PublicKey,
    pub asset: Asset,
    /// Stake per ball.
    pub wager: u64,
    pub rows: u8,
    pub risk: u8,
    pub num_bets: u32,
    /// Net profit at which the sequence stops early (0 disables).
    pub stop_gain: u64,
    /// Net loss at which the sequence stops early (0 disables).
    pub stop_loss: u64,
    pub lightning: bool,
    pub lightning_fee: u64,
    /// `wager * num_bets`, held outside the player's wallet until settlement.
    pub escrow: u64,
    /// Worst-case payout reserved against the bankroll.
    pub reserved: u64,
    /// View the request was accepted in.
    pub created: u64,
    pub status: PlayStatus,
}

impl PlayRequest {
    pub fn is_pending(&self) -> bool {
        self.status == PlayStatus::Pending
    }
}

impl Write for PlayRequest {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.player.write(writer);
        self.asset.write(writer);
        self.wager.write(writer);
        self.rows.write(writer);
        self.risk.write(writer);
        self.num_bets.write(writer);
        self.stop_gain.write(writer);
        self.stop_loss.write(writer);
        self.lightning.write(writer);
        self.lightning_fee.write(writer);
        self.escrow.write(writer);
        self.reserved.write(writer);
        self.created.write(writer);
        self.status.write(writer);
    }
}

impl Read for PlayRequest {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: Digest::read(reader)?,
            player: PublicKey::read(reader)?,
            asset: Asset::read(reader)?,
            wager: u64::read(reader)?,
            rows: u8::read(reader)?,
            risk: u8::read(reader)?,
            num_bets: u32::read(reader)?,
            stop_gain: u64::read(reader)?,
            stop_loss: u64::read(reader)?,
            lightning: bool::read(reader)?,
            lightning_fee: u64::read(reader)?,
            escrow: u64::read(reader)?,
            reserved: u64::read(reader)?,
            created: u64::read(reader)?,
            status: PlayStatus::read(reader)?,
        })
    }
}

impl EncodeSize for PlayRequest {
    fn encode_size(&self) -> usize {
        Digest::SIZE
            + PublicKey::SIZE
            + self.asset.encode_size()
            + u64::SIZE
            + u8::SIZE
            + u8::SIZE
            + u32::SIZE
            + u64::SIZE * 2
            + bool::SIZE
            + u64::SIZE * 4
            + PlayStatus::SIZE
    }
}
