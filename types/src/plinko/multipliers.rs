use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadRangeExt, Write};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use super::{MAX_BUCKETS, MAX_ROWS, MIN_ROWS, RISK_TIERS, ROW_COUNTS};

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum TableError {
    #[error("row count out of range (got={got}, min={min}, max={max})", min = MIN_ROWS, max = MAX_ROWS)]
    InvalidRows { got: u8 },
    #[error("risk tier out of range (got={got}, tiers={tiers})", tiers = RISK_TIERS)]
    InvalidRisk { got: u8 },
    #[error("multiplier row has wrong length (rows={rows}, expected={expected}, got={got})")]
    InvalidLength { rows: u8, expected: usize, got: usize },
    #[error("table shape mismatch (risk tiers={risks}, row counts={rows})")]
    InvalidShape { risks: usize, rows: usize },
}

/// Payout multipliers (basis points) for every risk tier and row count.
///
/// Slots are indexed `[risk][rows - MIN_ROWS]`. A configured slot always holds exactly
/// `rows + 1` entries; an unconfigured slot is empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Vec<u32>>>", into = "Vec<Vec<Vec<u32>>>")]
pub struct MultiplierTable {
    slots: Vec<Vec<Vec<u32>>>,
}

impl Default for MultiplierTable {
    fn default() -> Self {
        Self::new()
    }
}

fn slot_index(risk: u8, rows: u8) -> Result<(usize, usize), TableError> {
    if !(MIN_ROWS..=MAX_ROWS).contains(&rows) {
        return Err(TableError::InvalidRows { got: rows });
    }
    if risk >= RISK_TIERS {
        return Err(TableError::InvalidRisk { got: risk });
    }
    Ok((risk as usize, (rows - MIN_ROWS) as usize))
}

impl MultiplierTable {
    /// Creates a table with every slot unconfigured.
    pub fn new() -> Self {
        Self {
            slots: vec![vec![Vec::new(); ROW_COUNTS]; RISK_TIERS as usize],
        }
    }

    /// The low/medium/high tables shipped with the game.
    pub fn standard() -> Self {
        let tiers = [STANDARD_LOW, STANDARD_MEDIUM, STANDARD_HIGH];
        Self {
            slots: tiers
                .iter()
                .map(|tier| tier.iter().map(|row| row.to_vec()).collect())
                .collect(),
        }
    }

    /// Replaces the multipliers for one `(risk, rows)` slot.
    pub fn set(&mut self, risk: u8, rows: u8, values: Vec<u32>) -> Result<(), TableError> {
        let (r, i) = slot_index(risk, rows)?;
        let expected = rows as usize + 1;
        if values.len() != expected {
            return Err(TableError::InvalidLength {
                rows,
                expected,
                got: values.len(),
            });
        }
        self.slots[r][i] = values;
        Ok(())
    }

    /// Returns the configured multipliers for a slot, or `None` when out of range or empty.
    pub fn get(&self, risk: u8, rows: u8) -> Option<&[u32]> {
        let (r, i) = slot_index(risk, rows).ok()?;
        let slot = &self.slots[r][i];
        if slot.is_empty() {
            return None;
        }
        Some(slot)
    }

    pub fn is_configured(&self, risk: u8, rows: u8) -> bool {
        self.get(risk, rows).is_some()
    }

    /// Largest multiplier in a slot (the worst case for the bankroll).
    pub fn max_multiplier(&self, risk: u8, rows: u8) -> Option<u32> {
        self.get(risk, rows)?.iter().copied().max()
    }

    /// Multiplier for the bucket a ball landed in.
    pub fn multiplier(&self, risk: u8, rows: u8, bucket: u8) -> Option<u32> {
        self.get(risk, rows)?.get(bucket as usize).copied()
    }

    /// Full table as `[risk][rows - 8][bucket]`.
    #[cfg(test)]
    pub(crate) fn tiers(&self) -> &[Vec<Vec<u32>>] {
        &self.slots
    }

    /// Whether a configured slot mirrors around its center bucket.
    pub fn is_symmetric(&self, risk: u8, rows: u8) -> bool {
        match self.get(risk, rows) {
            Some(values) => values.iter().eq(values.iter().rev()),
            None => false,
        }
    }
}

impl TryFrom<Vec<Vec<Vec<u32>>>> for MultiplierTable {
    type Error = TableError;

    fn try_from(slots: Vec<Vec<Vec<u32>>>) -> Result<Self, Self::Error> {
        if slots.len() != RISK_TIERS as usize || slots.iter().any(|tier| tier.len() != ROW_COUNTS)
        {
            return Err(TableError::InvalidShape {
                risks: slots.len(),
                rows: slots.first().map(Vec::len).unwrap_or_default(),
            });
        }
        let mut table = Self::new();
        for (risk, tier) in slots.into_iter().enumerate() {
            for (offset, values) in tier.into_iter().enumerate() {
                if values.is_empty() {
                    continue;
                }
                table.set(risk as u8, MIN_ROWS + offset as u8, values)?;
            }
        }
        Ok(table)
    }
}

impl From<MultiplierTable> for Vec<Vec<Vec<u32>>> {
    fn from(table: MultiplierTable) -> Self {
        table.slots
    }
}

impl Write for MultiplierTable {
    fn write(&self, writer: &mut impl BufMut) {
        for tier in &self.slots {
            for values in tier {
                values.write(writer);
            }
        }
    }
}

impl Read for MultiplierTable {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let mut table = Self::new();
        for risk in 0..RISK_TIERS {
            for rows in MIN_ROWS..=MAX_ROWS {
                let values = Vec::<u32>::read_range(reader, 0..=MAX_BUCKETS)?;
                if values.is_empty() {
                    continue;
                }
                table
                    .set(risk, rows, values)
                    .map_err(|_| Error::Invalid("MultiplierTable", "wrong row length"))?;
            }
        }
        Ok(table)
    }
}

impl EncodeSize for MultiplierTable {
    fn encode_size(&self) -> usize {
        self.slots
            .iter()
            .flat_map(|tier| tier.iter())
            .map(|values| values.encode_size())
            .sum()
    }
}

const STANDARD_LOW: [&[u32]; ROW_COUNTS] = [
    &[2050, 400, 90, 60, 40, 60, 90, 400, 2050],
    &[4500, 800, 90, 60, 40, 40, 60, 90, 800, 4500],
    &[4700, 800, 200, 90, 60, 40, 60, 90, 200, 800, 4700],
    &[6500, 1700, 400, 90, 60, 40, 40, 60, 90, 400, 1700, 6500],
    &[7000, 1600, 300, 200, 90, 60, 40, 60, 90, 200, 300, 1600, 7000],
    &[8000, 1700, 600, 400, 90, 60, 40, 40, 60, 90, 400, 600, 1700, 8000],
    &[10000, 4500, 900, 300, 110, 90, 60, 40, 60, 90, 110, 300, 900, 4500, 10000],
    &[11000, 4500, 1300, 900, 110, 90, 60, 40, 40, 60, 90, 110, 900, 1300, 4500, 11000],
    &[12000, 2800, 2400, 800, 200, 90, 90, 60, 40, 60, 90, 90, 200, 800, 2400, 2800, 12000],
];

const STANDARD_MEDIUM: [&[u32]; ROW_COUNTS] = [
    &[5000, 400, 50, 40, 20, 40, 50, 400, 5000],
    &[6600, 1200, 50, 40, 20, 20, 40, 50, 1200, 6600],
    &[9500, 1000, 200, 90, 40, 20, 40, 90, 200, 1000, 9500],
    &[15000, 2000, 500, 60, 50, 20, 20, 50, 60, 500, 2000, 15000],
    &[17500, 3500, 400, 200, 60, 40, 20, 40, 60, 200, 400, 3500, 17500],
    &[25000, 4400, 700, 400, 90, 40, 20, 20, 40, 90, 400, 700, 4400, 25000],
    &[39000, 5500, 1500, 400, 90, 80, 40, 20, 40, 80, 90, 400, 1500, 5500, 39000],
    &[50000, 6000, 2200, 800, 200, 90, 40, 20, 20, 40, 90, 200, 800, 2200, 6000, 50000],
    &[52000, 8000, 1500, 1000, 300, 200, 50, 30, 20, 30, 50, 200, 300, 1000, 1500, 8000, 52000],
];

const STANDARD_HIGH: [&[u32]; ROW_COUNTS] = [
    &[10000, 60, 20, 20, 10, 20, 20, 60, 10000],
    &[14300, 500, 70, 30, 10, 10, 30, 70, 500, 14300],
    &[17000, 1500, 200, 30, 20, 10, 20, 30, 200, 1500, 17000],
    &[29000, 1500, 200, 80, 50, 30, 30, 50, 80, 200, 1500, 29000],
    &[38000, 2000, 400, 200, 80, 30, 10, 30, 80, 200, 400, 2000, 38000],
    &[50000, 6800, 700, 200, 90, 40, 20, 20, 40, 90, 200, 700, 6800, 50000],
    &[77000, 6500, 1300, 300, 200, 50, 30, 10, 30, 50, 200, 300, 1300, 6500, 77000],
    &[80000, 20000, 5000, 500, 80, 50, 30, 10, 10, 30, 50, 80, 500, 5000, 20000, 80000],
    &[100000, 28000, 3000, 1500, 150, 60, 50, 40, 10, 40, 50, 60, 150, 1500, 3000, 28000, 100000],
];
