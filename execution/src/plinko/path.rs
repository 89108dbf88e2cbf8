//! Ball-drop path derivation.
//!
//! A random word is read as a big-endian 256-bit integer. Bit `r` of that integer is the
//! decision at row `r` (1 = right). The bucket a ball lands in is the number of right turns,
//! so it is always within `[0, rows]`. Only the low 16 bits are ever consumed.

use plinko_types::plinko::{RandomWord, MAX_ROWS};

/// The decisions a single ball made on its way down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Path {
    /// Bit `r` set when the ball went right at row `r`.
    pub bits: u16,
    pub rows: u8,
    /// Terminal bucket index (`0..=rows`).
    pub bucket: u8,
}

impl Path {
    /// Decision at each row, top to bottom.
    pub fn decisions(&self) -> Vec<bool> {
        (0..self.rows).map(|r| self.bits & (1 << r) != 0).collect()
    }
}

fn row_mask(rows: u8) -> u16 {
    let rows = rows.min(MAX_ROWS);
    if rows >= 16 {
        u16::MAX
    } else {
        (1u16 << rows) - 1
    }
}

/// Derives the path of one ball from one random word.
pub fn drop_ball(word: &RandomWord, rows: u8) -> Path {
    let bits = word.low_u16() & row_mask(rows);
    Path {
        bits,
        rows: rows.min(MAX_ROWS),
        bucket: bits.count_ones() as u8,
    }
}
