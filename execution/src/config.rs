//! Engine configuration.
//!
//! [`Config`] is the serialized form (YAML, keys as hex). [`Config::validate`] turns it into an
//! [`EngineConfig`] the [`crate::Layer`] consults for capabilities and risk limits.

use commonware_codec::DecodeExt;
use commonware_cryptography::ed25519::PublicKey;
use commonware_utils::{from_hex_formatted, hex};
use plinko_types::{
    execution::{Key, Value},
    plinko::{
        LightningMode, MultiplierTable, DEFAULT_FAUCET_CAP, DEFAULT_MAX_EXPOSURE_BPS,
        DEFAULT_REFUND_DELAY_VIEWS, MULTIPLIER_SCALE,
    },
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("{field} must be hex: {value}")]
    InvalidHex { field: &'static str, value: String },
    #[error("{field} is invalid: {value}")]
    InvalidDecode {
        field: &'static str,
        value: String,
        #[source]
        source: commonware_codec::Error,
    },
    #[error("{field} out of range (got={value}, min={min}, max={max})")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

/// Capabilities checked at the start of privileged instructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Configures multipliers, lightning mode and the bankroll's game grant.
    Admin,
    /// Delivers randomness for pending plays.
    Oracle,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Oracle => "oracle",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Serialized engine configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    pub admin: String,
    pub oracle: String,
    #[serde(default = "default_max_exposure_bps")]
    pub max_exposure_bps: u16,
    #[serde(default = "default_refund_delay_views")]
    pub refund_delay_views: u64,
    #[serde(default = "default_faucet_cap")]
    pub faucet_cap: u64,
    /// Table installed at genesis. Defaults to the standard tables.
    #[serde(default)]
    pub multipliers: Option<MultiplierTable>,
    #[serde(default)]
    pub lightning: Option<LightningMode>,
    /// Whether the bankroll grants the game capability at genesis.
    #[serde(default = "default_game_granted")]
    pub game_granted: bool,
}

fn default_max_exposure_bps() -> u16 {
    DEFAULT_MAX_EXPOSURE_BPS
}

fn default_refund_delay_views() -> u64 {
    DEFAULT_REFUND_DELAY_VIEWS
}

fn default_faucet_cap() -> u64 {
    DEFAULT_FAUCET_CAP
}

fn default_game_granted() -> bool {
    true
}

fn decode_public_key(field: &'static str, value: &str) -> Result<PublicKey, ConfigError> {
    let bytes = from_hex_formatted(value).ok_or_else(|| ConfigError::InvalidHex {
        field,
        value: value.to_string(),
    })?;
    PublicKey::decode(bytes.as_ref()).map_err(|source| ConfigError::InvalidDecode {
        field,
        value: value.to_string(),
        source,
    })
}

fn ensure_range(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl Config {
    /// Builds a config with defaults for everything but the two capability holders.
    pub fn new(admin: &PublicKey, oracle: &PublicKey) -> Self {
        Self {
            admin: hex(admin.as_ref()),
            oracle: hex(oracle.as_ref()),
            max_exposure_bps: default_max_exposure_bps(),
            refund_delay_views: default_refund_delay_views(),
            faucet_cap: default_faucet_cap(),
            multipliers: None,
            lightning: None,
            game_granted: default_game_granted(),
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn validate(self) -> Result<EngineConfig, ConfigError> {
        let admin = decode_public_key("admin", &self.admin)?;
        let oracle = decode_public_key("oracle", &self.oracle)?;
        ensure_range(
            "max_exposure_bps",
            self.max_exposure_bps as u64,
            1,
            MULTIPLIER_SCALE,
        )?;
        ensure_range("faucet_cap", self.faucet_cap, 1, u64::MAX)?;

        Ok(EngineConfig {
            admin,
            oracle,
            max_exposure_bps: self.max_exposure_bps,
            refund_delay_views: self.refund_delay_views,
            faucet_cap: self.faucet_cap,
            multipliers: self.multipliers.unwrap_or_else(MultiplierTable::standard),
            lightning: self.lightning.unwrap_or_default(),
            game_granted: self.game_granted,
        })
    }
}

/// Validated configuration consulted by the execution layer.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub admin: PublicKey,
    pub oracle: PublicKey,
    /// Fraction of a bankroll's available balance one play may put at risk.
    pub max_exposure_bps: u16,
    pub refund_delay_views: u64,
    pub faucet_cap: u64,
    pub multipliers: MultiplierTable,
    pub lightning: LightningMode,
    pub game_granted: bool,
}

impl EngineConfig {
    pub fn has_capability(&self, caller: &PublicKey, role: Role) -> bool {
        match role {
            Role::Admin => caller == &self.admin,
            Role::Oracle => caller == &self.oracle,
        }
    }

    /// State written before the first block.
    pub fn genesis(&self) -> Vec<(Key, Value)> {
        vec![
            (
                Key::Multipliers,
                Value::Multipliers(self.multipliers.clone()),
            ),
            (Key::LightningMode, Value::LightningMode(self.lightning)),
            (Key::GameGrant, Value::GameGrant(self.game_granted)),
        ]
    }
}
