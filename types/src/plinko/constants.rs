/// Smallest supported peg board.
pub const MIN_ROWS: u8 = 8;

/// Largest supported peg board.
pub const MAX_ROWS: u8 = 16;

/// Number of distinct row counts (8..=16).
pub const ROW_COUNTS: usize = (MAX_ROWS - MIN_ROWS + 1) as usize;

/// Number of risk tiers (low, medium, high).
pub const RISK_TIERS: u8 = 3;

/// Bounds on the number of balls dropped by a single play.
pub const MIN_BETS: u32 = 1;
pub const MAX_BETS: u32 = 100;

/// Multipliers are stored in basis points (10_000 = 1.0x).
pub const MULTIPLIER_SCALE: u64 = 10_000;

/// Longest multiplier row (`MAX_ROWS + 1` buckets).
pub const MAX_BUCKETS: usize = MAX_ROWS as usize + 1;

/// Size of one oracle random word in bytes (256 bits).
pub const WORD_SIZE: usize = 32;

/// Native currency uses 9 decimals.
pub const NATIVE_UNIT: u64 = 1_000_000_000;

/// Lightning mode fee charged per play when the mode is active (0.01 native).
pub const DEFAULT_LIGHTNING_FEE: u64 = NATIVE_UNIT / 100;

/// Share of a bankroll's available balance a single play may put at risk (10%).
pub const DEFAULT_MAX_EXPOSURE_BPS: u16 = 1_000;

/// Views a player must wait before reclaiming a request the oracle never answered.
pub const DEFAULT_REFUND_DELAY_VIEWS: u64 = 200;

/// Largest amount a single faucet deposit may mint.
pub const DEFAULT_FAUCET_CAP: u64 = 1_000 * NATIVE_UNIT;

/// Maximum length of a rejection message carried in events.
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 256;

/// Error codes for PlinkoRejected events
pub const ERROR_INVALID_NUM_ROWS: u8 = 1;
pub const ERROR_INVALID_RISK: u8 = 2;
pub const ERROR_INVALID_NUM_BETS: u8 = 3;
pub const ERROR_WAGER_ABOVE_LIMIT: u8 = 4;
pub const ERROR_INVALID_WAGER: u8 = 5;
pub const ERROR_MULTIPLIERS_NOT_CONFIGURED: u8 = 6;
pub const ERROR_INVALID_MULTIPLIERS: u8 = 7;
pub const ERROR_UNAUTHORIZED: u8 = 8;
pub const ERROR_REQUEST_NOT_FOUND: u8 = 9;
pub const ERROR_REQUEST_NOT_PENDING: u8 = 10;
pub const ERROR_WORD_COUNT_MISMATCH: u8 = 11;
pub const ERROR_AWAITING_RANDOMNESS: u8 = 12;
pub const ERROR_INSUFFICIENT_FUNDS: u8 = 13;
pub const ERROR_INSUFFICIENT_BANKROLL: u8 = 14;
pub const ERROR_GAME_NOT_AUTHORIZED: u8 = 15;
pub const ERROR_REFUND_TOO_EARLY: u8 = 16;
pub const ERROR_INVALID_AMOUNT: u8 = 17;
pub const ERROR_ARITHMETIC_OVERFLOW: u8 = 18;
