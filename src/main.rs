use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use walker_agent::{run_random_episodes, WalkerConfig, WalkerError, FIXED_TIME_STEP};

/// Run headless walker episodes with a random policy and report rewards.
#[derive(Debug, Parser)]
#[command(name = "walker_agent", version)]
struct Args {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of episodes, run in parallel
    #[arg(long, default_value_t = 4)]
    episodes: u64,

    /// Seed of the first episode; later episodes use consecutive seeds
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Physics ticks per episode (overrides the config)
    #[arg(long)]
    max_steps: Option<usize>,

    /// Reset parameter override, e.g. --set chest_mass=12
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,
}

fn main() -> Result<(), WalkerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => WalkerConfig::from_json_file(path)?,
        None => WalkerConfig::default(),
    };
    if let Some(max_steps) = args.max_steps {
        config.max_steps = max_steps;
    }
    for assignment in &args.overrides {
        config.reset_parameters.apply_override(assignment)?;
    }

    println!(
        "Running {} walker episodes of {} steps ({:.1} s simulated each)...",
        args.episodes,
        config.max_steps,
        config.max_steps as f32 * FIXED_TIME_STEP
    );

    let start_time = Instant::now();
    let seeds: Vec<u64> = (0..args.episodes).map(|i| args.seed + i).collect();
    let results = run_random_episodes(&config, &seeds);

    let mut total_steps = 0usize;
    for (seed, result) in seeds.iter().zip(&results) {
        match result {
            Ok(summary) => {
                total_steps += summary.steps;
                println!(
                    "seed {:>4}: steps={:>5} reward={:+.3} target={} hips=({:+.2}, {:+.2}, {:+.2})",
                    seed,
                    summary.steps,
                    summary.cumulative_reward,
                    summary.touched_target,
                    summary.hips_position.x,
                    summary.hips_position.y,
                    summary.hips_position.z,
                );
            }
            Err(err) => println!("seed {:>4}: failed: {}", seed, err),
        }
    }

    let duration = start_time.elapsed();
    println!("Total time: {:.2} seconds", duration.as_secs_f64());
    println!(
        "Steps per second: {:.2}",
        total_steps as f64 / duration.as_secs_f64().max(1e-9)
    );

    if let Some(Err(err)) = results.into_iter().find(|r| r.is_err()) {
        return Err(err);
    }
    Ok(())
}
