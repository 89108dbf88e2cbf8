use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};

/// Liquidity backing payouts for a single asset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bankroll {
    pub balance: u64,
    /// Worst-case payouts of plays still awaiting randomness.
    pub reserved: u64,
}

impl Bankroll {
    /// Balance not already promised to pending plays.
    pub fn available(&self) -> u64 {
        self.balance.saturating_sub(self.reserved)
    }
}

impl Write for Bankroll {
    fn write(&self, writer: &mut impl BufMut) {
        self.balance.write(writer);
        self.reserved.write(writer);
    }
}

impl Read for Bankroll {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            balance: u64::read(reader)?,
            reserved: u64::read(reader)?,
        })
    }
}

impl FixedSize for Bankroll {
    const SIZE: usize = u64::SIZE * 2;
}
