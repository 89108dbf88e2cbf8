//! Offline driver for the plinko settlement engine.
//!
//! [`Simulator`] owns an in-memory state, funds a bankroll, and repeatedly plays rounds: every
//! player submits a `Play` in one block and the reference oracle fulfills all accepted requests
//! in the next. The resulting [`Report`] compares the realized house edge with the edge implied
//! by the multiplier table.

use anyhow::{Context as _, Result};
use commonware_cryptography::{ed25519::PrivateKey, Signer};
use plinko_execution::{
    mocks::{create_account_keypair, execute_block, genesis_state},
    nonce, query, Config, ConfigError, EngineConfig, Memory, ReferenceOracle,
};
use plinko_types::{
    execution::{Event, Instruction, Output, Transaction},
    plinko::{
        Asset, MultiplierTable, RandomWord, RequestId, MAX_BETS, MAX_ROWS, MIN_BETS, MIN_ROWS,
        MULTIPLIER_SCALE, NATIVE_UNIT, RISK_TIERS,
    },
};
use rand::{rngs::StdRng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

const ADMIN_OFFSET: u64 = 0;
const ORACLE_OFFSET: u64 = 1;
const PROVIDER_OFFSET: u64 = 2;
const PLAYER_OFFSET: u64 = 1_000;

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("invalid simulator config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid engine config: {0}")]
    Engine(#[from] ConfigError),
    #[error("{field} must be in {min}..={max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

/// Simulation parameters, usually loaded from YAML.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Rounds to play; every player plays once per round.
    #[serde(default = "default_rounds")]
    pub rounds: u64,
    #[serde(default = "default_players")]
    pub players: u64,
    #[serde(default = "default_wager")]
    pub wager: u64,
    #[serde(default = "default_rows")]
    pub rows: u8,
    #[serde(default = "default_risk")]
    pub risk: u8,
    #[serde(default = "default_num_bets")]
    pub num_bets: u32,
    #[serde(default)]
    pub stop_gain: u64,
    #[serde(default)]
    pub stop_loss: u64,
    /// Initial native bankroll.
    #[serde(default = "default_bankroll")]
    pub bankroll: u64,
    #[serde(default)]
    pub lightning: bool,
    /// Seeds participant keys and the oracle secret.
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub max_exposure_bps: Option<u16>,
    #[serde(default)]
    pub multipliers: Option<MultiplierTable>,
}

fn default_rounds() -> u64 {
    100
}

fn default_players() -> u64 {
    4
}

fn default_wager() -> u64 {
    NATIVE_UNIT / 20
}

fn default_rows() -> u8 {
    16
}

fn default_risk() -> u8 {
    1
}

fn default_num_bets() -> u32 {
    13
}

fn default_bankroll() -> u64 {
    10_000 * NATIVE_UNIT
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            players: default_players(),
            wager: default_wager(),
            rows: default_rows(),
            risk: default_risk(),
            num_bets: default_num_bets(),
            stop_gain: 0,
            stop_loss: 0,
            bankroll: default_bankroll(),
            lightning: false,
            seed: 0,
            max_exposure_bps: None,
            multipliers: None,
        }
    }
}

fn ensure_range(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), SimulatorError> {
    if value < min || value > max {
        return Err(SimulatorError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl SimulatorConfig {
    pub fn from_yaml(contents: &str) -> Result<Self, SimulatorError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Checks the play shape and builds the engine configuration for the simulated operators.
    pub fn engine(&self) -> Result<EngineConfig, SimulatorError> {
        ensure_range("players", self.players, 1, u32::MAX as u64)?;
        ensure_range("rows", self.rows as u64, MIN_ROWS as u64, MAX_ROWS as u64)?;
        ensure_range("risk", self.risk as u64, 0, RISK_TIERS as u64 - 1)?;
        ensure_range("num_bets", self.num_bets as u64, MIN_BETS as u64, MAX_BETS as u64)?;
        ensure_range("wager", self.wager, 1, u64::MAX)?;

        let (_, admin) = create_account_keypair(self.seed.wrapping_add(ADMIN_OFFSET));
        let (_, oracle) = create_account_keypair(self.seed.wrapping_add(ORACLE_OFFSET));
        let mut config = Config::new(&admin, &oracle);
        if let Some(bps) = self.max_exposure_bps {
            config.max_exposure_bps = bps;
        }
        config.multipliers = self.multipliers.clone();
        Ok(config.validate()?)
    }
}

/// Outcome of a simulation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Report {
    pub plays_settled: u64,
    pub plays_rejected: u64,
    pub balls: u64,
    pub total_wagered: u64,
    pub total_paid: u64,
    pub fees_collected: u64,
    pub bankroll_start: u64,
    pub bankroll_end: u64,
    /// Landing count per bucket.
    pub buckets: Vec<u64>,
    /// `(wagered - paid) / wagered` over every ball played.
    pub house_edge: f64,
    /// Edge implied by the binomial bucket distribution of the configured slot.
    pub expected_house_edge: f64,
}

impl Report {
    /// Bankroll change over the run, fees included.
    pub fn drift(&self) -> i128 {
        self.bankroll_end as i128 - self.bankroll_start as i128
    }
}

/// Expected return of one ball in a slot, as a fraction of the wager.
pub fn expected_return(multipliers: &[u32]) -> f64 {
    let rows = multipliers.len().saturating_sub(1) as u32;
    let total = 2f64.powi(rows as i32);
    let mut ways = 1f64;
    let mut sum = 0f64;
    for (k, multiplier) in multipliers.iter().enumerate() {
        sum += ways / total * *multiplier as f64 / MULTIPLIER_SCALE as f64;
        // C(rows, k + 1) from C(rows, k)
        ways = ways * (rows as f64 - k as f64) / (k as f64 + 1.0);
    }
    sum
}

pub struct Simulator {
    config: SimulatorConfig,
    engine: EngineConfig,
    state: Memory,
    admin: PrivateKey,
    oracle_signer: PrivateKey,
    oracle: ReferenceOracle,
    players: Vec<PrivateKey>,
    view: u64,
    minted: u128,
}

impl Simulator {
    pub async fn new(config: SimulatorConfig) -> Result<Self> {
        let engine = config.engine()?;
        let state = genesis_state(&engine).await?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut secret = [0u8; 32];
        rng.fill_bytes(&mut secret);

        let (admin, _) = create_account_keypair(config.seed.wrapping_add(ADMIN_OFFSET));
        let (oracle_signer, _) = create_account_keypair(config.seed.wrapping_add(ORACLE_OFFSET));
        let players = (0..config.players)
            .map(|i| create_account_keypair(config.seed.wrapping_add(PLAYER_OFFSET + i)).0)
            .collect();

        let mut simulator = Self {
            config,
            engine,
            state,
            admin,
            oracle_signer,
            oracle: ReferenceOracle::new(secret),
            players,
            view: 1,
            minted: 0,
        };
        simulator.bootstrap().await?;
        Ok(simulator)
    }

    async fn sign(&self, signer: &PrivateKey, instruction: Instruction) -> Result<Transaction> {
        let next = nonce(&self.state, &signer.public_key()).await?;
        Ok(Transaction::sign(signer, next, instruction))
    }

    async fn block(&mut self, transactions: Vec<Transaction>) -> Result<Vec<Event>> {
        let outputs = execute_block(&mut self.state, &self.engine, self.view, transactions)
            .await
            .with_context(|| format!("block at view {} failed", self.view))?;
        self.view += 1;
        Ok(outputs
            .into_iter()
            .filter_map(|output| match output {
                Output::Event(event) => Some(event),
                Output::Transaction(_) => None,
            })
            .collect())
    }

    /// Tops up `signer` through the faucet until its wallet holds `target`.
    async fn top_up(&mut self, signer: &PrivateKey, target: u64) -> Result<()> {
        let public = signer.public_key();
        let mut transactions = Vec::new();
        let mut next = nonce(&self.state, &public).await?;
        let mut balance = query::wallet_balance(&self.state, &public, &Asset::Native).await?;
        while balance < target {
            let amount = (target - balance).min(self.engine.faucet_cap);
            transactions.push(Transaction::sign(
                signer,
                next,
                Instruction::Deposit {
                    asset: Asset::Native,
                    amount,
                },
            ));
            next += 1;
            balance += amount;
        }
        if !transactions.is_empty() {
            for event in self.block(transactions).await? {
                if let Event::Deposited { amount, .. } = event {
                    self.minted += amount as u128;
                }
            }
        }
        Ok(())
    }

    async fn bootstrap(&mut self) -> Result<()> {
        let (provider, _) =
            create_account_keypair(self.config.seed.wrapping_add(PROVIDER_OFFSET));
        self.top_up(&provider, self.config.bankroll).await?;
        let fund = self
            .sign(
                &provider,
                Instruction::FundBankroll {
                    asset: Asset::Native,
                    amount: self.config.bankroll,
                },
            )
            .await?;
        let mut transactions = vec![fund];
        if self.config.lightning {
            let fee = self.engine.lightning.fee;
            let admin = self.admin.clone();
            transactions.push(
                self.sign(&admin, Instruction::SetLightningMode { active: true, fee })
                    .await?,
            );
        }
        for event in self.block(transactions).await? {
            if let Event::PlinkoRejected { message, .. } = event {
                anyhow::bail!("bootstrap rejected: {message}");
            }
        }
        info!(
            bankroll = self.config.bankroll,
            players = self.players.len(),
            lightning = self.config.lightning,
            "simulation bootstrapped"
        );
        Ok(())
    }

    fn play(&self) -> Instruction {
        Instruction::Play {
            wager: self.config.wager,
            asset: Asset::Native,
            rows: self.config.rows,
            risk: self.config.risk,
            num_bets: self.config.num_bets,
            stop_gain: self.config.stop_gain,
            stop_loss: self.config.stop_loss,
        }
    }

    pub async fn run(&mut self) -> Result<Report> {
        let table = query::get_multipliers(&self.state).await?;
        let slot = table
            .get(self.config.risk, self.config.rows)
            .context("multipliers not configured for simulated slot")?
            .to_vec();

        let bankroll_start = query::bankroll(&self.state, &Asset::Native).await?.balance;
        let mut report = Report {
            bankroll_start,
            buckets: vec![0; slot.len()],
            expected_house_edge: 1.0 - expected_return(&slot),
            ..Report::default()
        };

        let escrow = self
            .config
            .wager
            .saturating_mul(self.config.num_bets as u64)
            .saturating_add(self.engine.lightning.fee);
        let fee = query::lightning_mode(&self.state).await?.fee;
        let players = self.players.clone();
        for round in 0..self.config.rounds {
            for player in &players {
                self.top_up(player, escrow).await?;
            }

            let mut plays = Vec::with_capacity(players.len());
            for player in &players {
                plays.push(self.sign(player, self.play()).await?);
            }
            let mut requests: Vec<(RequestId, u32)> = Vec::new();
            for event in self.block(plays).await? {
                match event {
                    Event::PlayAccepted {
                        lightning: true, ..
                    } => report.fees_collected += fee,
                    Event::RandomnessRequested { id, num_words } => requests.push((id, num_words)),
                    Event::PlinkoRejected { message, .. } => {
                        report.plays_rejected += 1;
                        debug!(round, reason = %message, "play rejected");
                    }
                    _ => {}
                }
            }

            let mut fulfillments = Vec::with_capacity(requests.len());
            let oracle_signer = self.oracle_signer.clone();
            let mut next = nonce(&self.state, &oracle_signer.public_key()).await?;
            for (id, num_words) in requests {
                let words: Vec<RandomWord> = self.oracle.words(&id, num_words);
                fulfillments.push(Transaction::sign(
                    &oracle_signer,
                    next,
                    Instruction::Fulfill { id, words },
                ));
                next += 1;
            }
            for event in self.block(fulfillments).await? {
                match event {
                    Event::PlayOutcome {
                        total_wager,
                        total_payout,
                        paths,
                        games_played,
                        ..
                    } => {
                        report.plays_settled += 1;
                        report.balls += games_played as u64;
                        report.total_wagered += total_wager;
                        report.total_paid += total_payout;
                        for path in paths {
                            if let Some(count) = report.buckets.get_mut(path.count_ones() as usize)
                            {
                                *count += 1;
                            }
                        }
                    }
                    Event::PlinkoRejected { message, .. } => {
                        warn!(round, reason = %message, "fulfillment rejected");
                    }
                    _ => {}
                }
            }
        }

        report.bankroll_end = query::bankroll(&self.state, &Asset::Native).await?.balance;
        if report.total_wagered > 0 {
            report.house_edge = (report.total_wagered as f64 - report.total_paid as f64)
                / report.total_wagered as f64;
        }
        info!(
            plays = report.plays_settled,
            balls = report.balls,
            house_edge = report.house_edge,
            expected = report.expected_house_edge,
            drift = report.drift() as i64,
            "simulation finished"
        );
        Ok(report)
    }

    /// Total issued through the faucet so far.
    pub fn minted(&self) -> u128 {
        self.minted
    }

    /// Sum of every player wallet plus the bankroll balance.
    pub async fn total_value(&self) -> Result<u128> {
        let mut total = query::bankroll(&self.state, &Asset::Native).await?.balance as u128;
        for player in &self.players {
            total += query::wallet_balance(&self.state, &player.public_key(), &Asset::Native)
                .await? as u128;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_runtime::{deterministic::Runner, Runner as _};

    fn small() -> SimulatorConfig {
        SimulatorConfig {
            rounds: 5,
            players: 3,
            bankroll: 100 * NATIVE_UNIT,
            ..SimulatorConfig::default()
        }
    }

    #[test]
    fn test_yaml_defaults() {
        let config = SimulatorConfig::from_yaml("rounds: 7\nlightning: true\n").unwrap();
        assert_eq!(config.rounds, 7);
        assert!(config.lightning);
        assert_eq!(config.rows, 16);
        assert_eq!(config.risk, 1);
        assert_eq!(config.num_bets, 13);
        assert_eq!(config.wager, NATIVE_UNIT / 20);
        assert!(config.engine().is_ok());
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(matches!(
            SimulatorConfig::from_yaml("rouns: 7\n"),
            Err(SimulatorError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_bad_shape() {
        for yaml in ["rows: 20\n", "risk: 3\n", "num_bets: 0\n", "wager: 0\n", "players: 0\n"] {
            let config = SimulatorConfig::from_yaml(yaml).unwrap();
            assert!(matches!(
                config.engine(),
                Err(SimulatorError::OutOfRange { .. })
            ));
        }
        let config = SimulatorConfig::from_yaml("max_exposure_bps: 0\n").unwrap();
        assert!(matches!(config.engine(), Err(SimulatorError::Engine(_))));
    }

    #[test]
    fn test_expected_return() {
        // Flat 1x pays back exactly the wager.
        assert!((expected_return(&[10_000; 9]) - 1.0).abs() < 1e-12);
        // Every standard slot keeps an edge for the house.
        let table = MultiplierTable::standard();
        for risk in 0..RISK_TIERS {
            for rows in MIN_ROWS..=MAX_ROWS {
                let rtp = expected_return(table.get(risk, rows).unwrap());
                assert!(rtp > 0.0 && rtp < 1.0, "risk {risk} rows {rows}: {rtp}");
            }
        }
    }

    #[test]
    fn test_run_conserves_value() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut simulator = Simulator::new(small()).await.unwrap();
            let report = simulator.run().await.unwrap();

            assert_eq!(report.plays_settled, 15);
            assert_eq!(report.plays_rejected, 0);
            assert_eq!(report.balls, 15 * 13);
            assert_eq!(report.buckets.iter().sum::<u64>(), report.balls);
            assert_eq!(
                report.drift(),
                report.total_wagered as i128 - report.total_paid as i128
            );

            // Funds only move between wallets and the bankroll; the faucet is the sole source.
            assert_eq!(simulator.total_value().await.unwrap(), simulator.minted());
            let bankroll = query::bankroll(&simulator.state, &Asset::Native)
                .await
                .unwrap();
            assert_eq!(bankroll.reserved, 0);
            assert_eq!(bankroll.balance, report.bankroll_end);
        });
    }

    #[test]
    fn test_run_is_deterministic() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let first = Simulator::new(small()).await.unwrap().run().await.unwrap();
            let second = Simulator::new(small()).await.unwrap().run().await.unwrap();
            assert_eq!(first, second);

            let other = Simulator::new(SimulatorConfig { seed: 1, ..small() })
                .await
                .unwrap()
                .run()
                .await
                .unwrap();
            assert_ne!(first.buckets, other.buckets);
        });
    }

    #[test]
    fn test_fees_counted_without_settlement() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let config = SimulatorConfig {
                rounds: 1,
                lightning: true,
                ..small()
            };
            let mut simulator = Simulator::new(config).await.unwrap();
            // Fulfillments from a key without the oracle role are all rejected.
            simulator.oracle_signer = create_account_keypair(u64::MAX).0;
            let report = simulator.run().await.unwrap();

            assert_eq!(report.plays_settled, 0);
            assert_eq!(report.plays_rejected, 0);
            assert_eq!(report.fees_collected, 3 * simulator.engine.lightning.fee);
            assert_eq!(report.drift(), report.fees_collected as i128);
        });
    }

    #[test]
    fn test_lightning_fees_reach_bankroll() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let config = SimulatorConfig {
                lightning: true,
                ..small()
            };
            let mut simulator = Simulator::new(config).await.unwrap();
            let report = simulator.run().await.unwrap();
            assert_eq!(report.fees_collected, 15 * simulator.engine.lightning.fee);
            assert_eq!(
                report.drift(),
                report.total_wagered as i128 - report.total_paid as i128
                    + report.fees_collected as i128
            );
        });
    }
}
