use plinko_types::plinko::*;
use thiserror::Error;

/// Named conditions a plinko transaction can be rejected with.
///
/// Every variant except [`PlinkoError::State`] reverts the transaction's writes and surfaces
/// as a `PlinkoRejected` event. `State` is a storage failure and aborts the whole block.
#[derive(Debug, Error)]
pub enum PlinkoError {
    #[error("row count {0} outside {min}..={max}", min = MIN_ROWS, max = MAX_ROWS)]
    InvalidNumRows(u8),
    #[error("risk tier {0} outside 0..{tiers}", tiers = RISK_TIERS)]
    InvalidRisk(u8),
    #[error("bet count {0} outside {min}..={max}", min = MIN_BETS, max = MAX_BETS)]
    InvalidNumBets(u32),
    #[error("wager {wager} above limit {max_wager}")]
    WagerAboveLimit { wager: u64, max_wager: u64 },
    #[error("wager must be positive")]
    InvalidWager,
    #[error("no multipliers configured for risk {risk} rows {rows}")]
    MultipliersNotConfigured { risk: u8, rows: u8 },
    #[error("invalid multipliers: {0}")]
    InvalidMultipliers(#[from] TableError),
    #[error("caller lacks the {0} capability")]
    Unauthorized(&'static str),
    #[error("request not found")]
    RequestNotFound,
    #[error("request not pending")]
    RequestNotPending,
    #[error("expected {expected} random words, got {got}")]
    WordCountMismatch { expected: u32, got: u32 },
    #[error("player already has a play awaiting randomness")]
    AwaitingRandomness,
    #[error("insufficient funds (needed={needed}, available={available})")]
    InsufficientFunds { needed: u64, available: u64 },
    #[error("insufficient bankroll (needed={needed}, available={available})")]
    InsufficientBankroll { needed: u64, available: u64 },
    #[error("game not authorized on bankroll")]
    GameNotAuthorized,
    #[error("refund available at view {available_at}")]
    RefundTooEarly { available_at: u64 },
    #[error("invalid amount")]
    InvalidAmount,
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
    #[error(transparent)]
    State(#[from] anyhow::Error),
}

impl PlinkoError {
    /// Stable code carried by `PlinkoRejected`. `None` for storage failures.
    pub fn code(&self) -> Option<u8> {
        Some(match self {
            Self::InvalidNumRows(_) => ERROR_INVALID_NUM_ROWS,
            Self::InvalidRisk(_) => ERROR_INVALID_RISK,
            Self::InvalidNumBets(_) => ERROR_INVALID_NUM_BETS,
            Self::WagerAboveLimit { .. } => ERROR_WAGER_ABOVE_LIMIT,
            Self::InvalidWager => ERROR_INVALID_WAGER,
            Self::MultipliersNotConfigured { .. } => ERROR_MULTIPLIERS_NOT_CONFIGURED,
            Self::InvalidMultipliers(_) => ERROR_INVALID_MULTIPLIERS,
            Self::Unauthorized(_) => ERROR_UNAUTHORIZED,
            Self::RequestNotFound => ERROR_REQUEST_NOT_FOUND,
            Self::RequestNotPending => ERROR_REQUEST_NOT_PENDING,
            Self::WordCountMismatch { .. } => ERROR_WORD_COUNT_MISMATCH,
            Self::AwaitingRandomness => ERROR_AWAITING_RANDOMNESS,
            Self::InsufficientFunds { .. } => ERROR_INSUFFICIENT_FUNDS,
            Self::InsufficientBankroll { .. } => ERROR_INSUFFICIENT_BANKROLL,
            Self::GameNotAuthorized => ERROR_GAME_NOT_AUTHORIZED,
            Self::RefundTooEarly { .. } => ERROR_REFUND_TOO_EARLY,
            Self::InvalidAmount => ERROR_INVALID_AMOUNT,
            Self::ArithmeticOverflow => ERROR_ARITHMETIC_OVERFLOW,
            Self::State(_) => return None,
        })
    }
}
