use anyhow::{Context, Result};
use clap::Parser;
use plinko_simulator::{Simulator, SimulatorConfig};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(about = "Plays simulated rounds against the plinko settlement engine.")]
struct Args {
    /// YAML simulation config (defaults apply when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the number of rounds in the config.
    #[arg(long)]
    rounds: Option<u64>,

    /// Overrides the seed in the config.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the report as JSON instead of a summary.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn build_config(args: &Args) -> Result<SimulatorConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read config file {}", path.display()))?;
            SimulatorConfig::from_yaml(&contents).context("Could not parse config file")?
        }
        None => SimulatorConfig::default(),
    };
    if let Some(rounds) = args.rounds {
        config.rounds = rounds;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.engine().context("invalid simulation parameters")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse args
    let args = Args::parse();

    // Create logger
    let level = Level::from_str(&args.log_level).context("Invalid log level")?;
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = build_config(&args)?;
    info!(
        rounds = config.rounds,
        players = config.players,
        wager = config.wager,
        rows = config.rows,
        risk = config.risk,
        num_bets = config.num_bets,
        "starting simulation"
    );

    let mut simulator = Simulator::new(config).await?;
    let report = simulator.run().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("plays settled:   {}", report.plays_settled);
        println!("plays rejected:  {}", report.plays_rejected);
        println!("balls dropped:   {}", report.balls);
        println!("total wagered:   {}", report.total_wagered);
        println!("total paid:      {}", report.total_paid);
        println!("house edge:      {:.4}%", report.house_edge * 100.0);
        println!("expected edge:   {:.4}%", report.expected_house_edge * 100.0);
        println!("bankroll drift:  {}", report.drift());
        println!("buckets:         {:?}", report.buckets);
    }
    Ok(())
}
