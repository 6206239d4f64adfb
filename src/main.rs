use anyhow::Result;
use clap::Parser;
use kinship_lib::model::config::{AppConfig, DEFAULT_CONFIG_PATH};
use kinship_lib::World;
use kinship_data::ContagionStats;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of agents to spawn (overrides world.initial_population)
    #[arg(short, long)]
    agents: Option<usize>,

    /// Seed for placement and contagion rolls
    #[arg(short, long)]
    seed: Option<u64>,

    /// Simulation steps to run
    #[arg(long, default_value_t = 600)]
    steps: u64,

    /// Seconds of simulated time per step
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// Square world extent used for placement (overrides world.width/height)
    #[arg(long)]
    spread: Option<f64>,

    /// Print the final census as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    kinship_lib::init_logging();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }
    if let Some(spread) = args.spread {
        config.world.width = spread;
        config.world.height = spread;
    }
    let population = args.agents.unwrap_or(config.world.initial_population);
    let config_path = args
        .config
        .as_ref()
        .map_or_else(|| DEFAULT_CONFIG_PATH.to_string(), |p| p.display().to_string());

    tracing::info!(
        population,
        steps = args.steps,
        dt = args.dt,
        config = %config_path,
        "starting headless run"
    );

    let mut world = World::new(population, config)?;
    let mut totals = ContagionStats::default();
    let mut runs = 0u64;
    for _ in 0..args.steps {
        if let Some(stats) = world.update(args.dt) {
            runs += 1;
            totals.merge(&stats);
            tracing::info!(
                run = runs,
                time = world.time(),
                candidates = stats.candidates,
                applied = stats.applied,
                reset_to_neutral = stats.reset_to_neutral,
                "contagion pass"
            );
        }
    }

    let census = world.emotion_census();
    if args.json {
        let report = serde_json::json!({
            "time": world.time(),
            "runs": runs,
            "totals": totals,
            "census": census,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} pipeline runs over {:.2}s, {} contagion events applied",
            runs,
            world.time(),
            totals.applied
        );
        for (emotion, count) in &census {
            println!("{:>10}: {count}", emotion.to_string());
        }
    }

    Ok(())
}
