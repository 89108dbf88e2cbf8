use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use std::fmt;

/// Length of a token contract address.
pub const TOKEN_ADDRESS_LEN: usize = 20;

/// Currency a play is wagered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Asset {
    /// The chain's native currency.
    Native,
    /// A fungible token identified by its contract address.
    Token([u8; TOKEN_ADDRESS_LEN]),
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Token(address) => write!(f, "token:{}", commonware_utils::hex(address)),
        }
    }
}

impl Write for Asset {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Native => 0u8.write(writer),
            Self::Token(address) => {
                1u8.write(writer);
                writer.put_slice(address);
            }
        }
    }
}

impl Read for Asset {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Native),
            1 => {
                if reader.remaining() < TOKEN_ADDRESS_LEN {
                    return Err(Error::EndOfBuffer);
                }
                let mut address = [0u8; TOKEN_ADDRESS_LEN];
                reader.copy_to_slice(&mut address);
                Ok(Self::Token(address))
            }
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl EncodeSize for Asset {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Native => 0,
                Self::Token(_) => TOKEN_ADDRESS_LEN,
            }
    }
}
