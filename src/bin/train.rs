//! Runs the self-play training loop from a JSON config file, checkpointing
//! periodically and resuming from the latest checkpoint if one exists.

use chessrl::agent::Agent;
use chessrl::checkpoint;
use chessrl::nn::{Network, OptimizerKind, OptimizerState};
use chessrl::replay::ReplayBuffer;
use chessrl::selfplay::{self, SelfPlayLoop};
use chessrl::{config::TrainingConfig, encoding, seed::SeedManager};
use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "chessrl-train", about = "Self-play DQN training loop for chess")]
struct Args {
    /// Path to a JSON `TrainingConfig`. Built-in defaults if omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config: TrainingConfig = match &args.config {
        Some(path) => serde_json::from_slice(&fs::read(path)?)?,
        None => TrainingConfig::default(),
    };
    config.validate()?;

    chessrl::logging::init_logging(Some(&config.checkpoint_directory))?;

    let seed_manager = match config.seed {
        Some(seed) => SeedManager::new(seed),
        None => SeedManager::from_entropy(),
    };
    let checkpoint_dir = PathBuf::from(&config.checkpoint_directory);

    let mut init_rng = seed_manager.sub_rng(chessrl::seed::StreamId::NetworkInit);
    let online = Network::new(encoding::STATE_SIZE, &config.agent.hidden_layers, encoding::ACTION_SPACE_SIZE, &mut init_rng);
    let target = Network::new(encoding::STATE_SIZE, &config.agent.hidden_layers, encoding::ACTION_SPACE_SIZE, &mut init_rng);
    let optimizer = OptimizerState::new(OptimizerKind::default(), online.layer_shapes());

    let mut agent = Agent::new(online, target, optimizer, config.agent.clone());
    let mut buffer = ReplayBuffer::new(config.max_experience_buffer);

    if let Some(latest) = checkpoint::latest_cycle(&checkpoint_dir)? {
        let architecture = agent.online.architecture().clone();
        let loaded = checkpoint::load(&checkpoint_dir, latest, &architecture)?;
        log::info!("resuming from checkpoint at cycle {latest}");
        agent = loaded.agent;
    }

    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = Arc::clone(&cancelled);
        ctrlc::set_handler(move || {
            log::warn!("interrupt received, stopping at the next cycle boundary");
            cancelled.store(true, Ordering::SeqCst);
        })?;
    }

    let loop_driver = SelfPlayLoop::new(config.cycles.clone());
    let master_seed = seed_manager.master_seed();

    let result = selfplay::run(
        &loop_driver,
        &mut agent,
        &mut buffer,
        &seed_manager,
        config.max_cycles,
        {
            let cancelled = Arc::clone(&cancelled);
            move || cancelled.load(Ordering::SeqCst)
        },
        |metrics, agent| {
            log::info!(
                "cycle {}: games={} w/d/l={}/{}/{} avg_len={:.1} loss={:.4} eps={:.3} buffer={}",
                metrics.cycle,
                metrics.games_played,
                metrics.white_wins,
                metrics.draws,
                metrics.black_wins,
                metrics.average_game_length,
                metrics.mean_loss,
                metrics.epsilon,
                metrics.buffer_size,
            );
            if loop_driver.should_checkpoint(metrics.cycle) {
                checkpoint::save(&checkpoint_dir, metrics.cycle, agent, master_seed)?;
                log::info!("checkpoint written at cycle {}", metrics.cycle);
            }
            Ok(())
        },
    );

    match result {
        Ok(()) => log::info!("training run complete"),
        Err(chessrl::CoreError::Cancelled) => log::info!("training run stopped by interrupt"),
        Err(err) => {
            if err.is_fatal() {
                log::error!("training run failed (fatal): {err}");
            } else {
                log::warn!("training run stopped on non-fatal error: {err}");
            }
            return Err(err.into());
        }
    }
    Ok(())
}
