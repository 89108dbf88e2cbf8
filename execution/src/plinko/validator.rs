use crate::error::PlinkoError;
use plinko_types::plinko::{
    Asset, MultiplierTable, MAX_BETS, MAX_ROWS, MIN_BETS, MIN_ROWS, MULTIPLIER_SCALE, RISK_TIERS,
};

/// Parameters of a play as submitted by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayParams {
    pub wager: u64,
    pub asset: Asset,
    pub rows: u8,
    pub risk: u8,
    pub num_bets: u32,
    pub stop_gain: u64,
    pub stop_loss: u64,
}

/// Worst case a validated play can cost the bankroll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exposure {
    pub max_multiplier: u32,
    /// `wager * max_multiplier * num_bets / MULTIPLIER_SCALE`
    pub worst_case: u64,
    /// `available * max_exposure_bps / MULTIPLIER_SCALE`
    pub limit: u64,
}

/// Checks a play against bounds, the multiplier table and the bankroll's allowed exposure.
///
/// Pure: callers must run it in the same transaction that reserves the exposure.
pub fn validate_play(
    params: &PlayParams,
    table: &MultiplierTable,
    available: u64,
    max_exposure_bps: u16,
) -> Result<Exposure, PlinkoError> {
    if !(MIN_ROWS..=MAX_ROWS).contains(&params.rows) {
        return Err(PlinkoError::InvalidNumRows(params.rows));
    }
    if params.risk >= RISK_TIERS {
        return Err(PlinkoError::InvalidRisk(params.risk));
    }
    if !(MIN_BETS..=MAX_BETS).contains(&params.num_bets) {
        return Err(PlinkoError::InvalidNumBets(params.num_bets));
    }
    if params.wager == 0 {
        return Err(PlinkoError::InvalidWager);
    }
    let max_multiplier = table.max_multiplier(params.risk, params.rows).ok_or(
        PlinkoError::MultipliersNotConfigured {
            risk: params.risk,
            rows: params.rows,
        },
    )?;

    let worst_case = params.wager as u128 * max_multiplier as u128 * params.num_bets as u128
        / MULTIPLIER_SCALE as u128;
    let limit = available as u128 * max_exposure_bps as u128 / MULTIPLIER_SCALE as u128;
    if worst_case > limit {
        let per_wager = max_multiplier as u128 * params.num_bets as u128;
        let max_wager = if per_wager == 0 {
            u64::MAX
        } else {
            u64::try_from(limit * MULTIPLIER_SCALE as u128 / per_wager).unwrap_or(u64::MAX)
        };
        return Err(PlinkoError::WagerAboveLimit {
            wager: params.wager,
            max_wager,
        });
    }

    Ok(Exposure {
        max_multiplier,
        worst_case: u64::try_from(worst_case).map_err(|_| PlinkoError::ArithmeticOverflow)?,
        limit: u64::try_from(limit).map_err(|_| PlinkoError::ArithmeticOverflow)?,
    })
}
