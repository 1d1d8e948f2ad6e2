//! Loads a checkpoint and scores it against a fixed baseline opponent over
//! a match of alternating-color games.

use chessrl::agent::Agent;
use chessrl::checkpoint;
use chessrl::eval::{self, Baseline};
use chessrl::nn::{Network, OptimizerKind, OptimizerState};
use chessrl::{config::TrainingConfig, encoding, seed::SeedManager};
use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chessrl-evaluate", about = "Evaluate a checkpointed agent against a baseline opponent")]
struct Args {
    /// Checkpoint directory written by chessrl-train.
    #[arg(short, long)]
    checkpoint_dir: PathBuf,

    /// Cycle to load; defaults to the latest checkpoint in the directory.
    #[arg(long)]
    cycle: Option<u64>,

    /// Path to a JSON `TrainingConfig`, used for hidden-layer sizes, seed,
    /// evaluation game count and baseline depth. Built-in defaults if omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the baseline opponent for this run.
    #[arg(long, value_enum)]
    baseline: Option<BaselineArg>,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum BaselineArg {
    Random,
    Minimax,
    Heuristic,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config: TrainingConfig = match &args.config {
        Some(path) => serde_json::from_slice(&fs::read(path)?)?,
        None => TrainingConfig::default(),
    };

    chessrl::logging::init_logging(None)?;

    let cycle = match args.cycle {
        Some(cycle) => cycle,
        None => checkpoint::latest_cycle(&args.checkpoint_dir)?.ok_or("no checkpoint found in the given directory")?,
    };

    let seed_manager = match config.seed {
        Some(seed) => SeedManager::new(seed),
        None => SeedManager::from_entropy(),
    };
    let mut rng = seed_manager.sub_rng(chessrl::seed::StreamId::NetworkInit);
    let online = Network::new(encoding::STATE_SIZE, &config.agent.hidden_layers, encoding::ACTION_SPACE_SIZE, &mut rng);
    let target = Network::new(encoding::STATE_SIZE, &config.agent.hidden_layers, encoding::ACTION_SPACE_SIZE, &mut rng);
    let optimizer = OptimizerState::new(OptimizerKind::default(), online.layer_shapes());
    let placeholder = Agent::new(online, target, optimizer, config.agent.clone());

    let loaded = checkpoint::load(&args.checkpoint_dir, cycle, placeholder.online.architecture())?;
    log::info!("loaded checkpoint at cycle {}", loaded.cycle);

    let baseline = match args.baseline {
        Some(BaselineArg::Random) => Baseline::RandomLegal,
        Some(BaselineArg::Minimax) => Baseline::Minimax { depth: config.baseline_depth },
        Some(BaselineArg::Heuristic) => Baseline::Heuristic,
        None => config.evaluation_baseline(),
    };

    let report = eval::run_evaluation(&loaded.agent, baseline, config.evaluation_games, config.cycles.max_steps_per_game, &seed_manager);

    println!(
        "games={} win_rate={:.3} draw_rate={:.3} loss_rate={:.3} avg_game_length={:.1}",
        report.games_played, report.win_rate, report.draw_rate, report.loss_rate, report.average_game_length
    );

    Ok(())
}
