//! neurodrive - CLI entry point.

use clap::{Parser, Subcommand};
use neurodrive::snapshot::{BrainStore, SnapshotError};
use neurodrive::{benchmark, Config, World};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "neurodrive")]
#[command(version)]
#[command(about = "Lane-driving simulator with hill-climbing neuroevolution")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Stop after this many completed generations
        #[arg(short, long, default_value = "50")]
        generations: u32,

        /// Hard cap on simulation ticks
        #[arg(long, default_value = "2000000")]
        max_ticks: u64,

        /// Best-brain file to seed from and save to
        #[arg(short, long, default_value = "best_brain.json")]
        brain: PathBuf,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Inspect a saved brain file
    Inspect {
        /// Brain file
        brain: PathBuf,
    },

    /// Discard a saved brain so the next run starts from scratch
    Discard {
        /// Brain file
        #[arg(short, long, default_value = "best_brain.json")]
        brain: PathBuf,
    },

    /// Run performance benchmark
    Bench {
        /// Number of ticks
        #[arg(short, long, default_value = "5000")]
        ticks: u64,

        /// Cohort size
        #[arg(short, long, default_value = "250")]
        cohort: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            generations,
            max_ticks,
            brain,
            seed,
            quiet,
        } => run_simulation(config, generations, max_ticks, brain, seed, quiet),

        Commands::Init { output } => generate_config(output),

        Commands::Inspect { brain } => inspect_brain(brain),

        Commands::Discard { brain } => {
            BrainStore::new(&brain).discard()?;
            println!("Discarded {:?}", brain);
            Ok(())
        }

        Commands::Bench { ticks, cohort } => run_benchmark(ticks, cohort),
    }
}

fn run_simulation(
    config_path: PathBuf,
    generations: u32,
    max_ticks: u64,
    brain_path: PathBuf,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let config = if config_path.exists() {
        println!("Loading config from: {:?}", config_path);
        Config::from_file(&config_path)?
    } else {
        println!("Using default configuration");
        Config::default()
    };

    let store = BrainStore::new(&brain_path);
    let seed = seed.unwrap_or_else(rand::random);
    println!("Using seed: {}", seed);

    // A malformed or mismatched stored brain falls back to a fresh cohort
    // instead of killing the run.
    let mut world = match load_seed_brain(&store) {
        Some(snapshot) => match World::new_with_brain(config.clone(), seed, snapshot) {
            Ok(world) => {
                println!("Seeded cohort from {:?}", store.path());
                world
            }
            Err(SnapshotError::DimensionMismatch(msg)) => {
                log::warn!("stored brain does not fit the configured topology ({msg}); starting fresh");
                World::new_with_seed(config.clone(), seed)
            }
            Err(e) => return Err(e.into()),
        },
        None => World::new_with_seed(config.clone(), seed),
    };

    // First generation bootstraps the store so later runs always have a seed.
    if store.load().ok().flatten().is_none() {
        if let Some(snapshot) = world.best_snapshot() {
            store.save(&snapshot)?;
        }
    }

    println!("Starting simulation");
    println!("  Cohort: {}", config.car.cohort_size);
    println!("  Traffic: {}", config.traffic.count);
    println!("  Topology: {:?}", config.topology());
    println!("  Generations: {}", generations);
    println!();

    let start = Instant::now();
    let stats_interval = config.logging.stats_interval;
    let target = world.generation + generations;
    let mut last_generation = world.generation;

    for _ in 0..max_ticks {
        if world.generation >= target {
            break;
        }
        world.step();

        if !quiet && world.time % stats_interval == 0 {
            println!("{}", world.stats.summary());
        }

        // Persist the best brain at every generation boundary.
        if world.generation != last_generation {
            last_generation = world.generation;
            if let Some(snapshot) = world.best_snapshot() {
                store.save(&snapshot)?;
            }
        }
    }

    let elapsed = start.elapsed();

    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Ticks: {}", world.time);
    println!("Speed: {:.1} ticks/s", world.time as f64 / elapsed.as_secs_f64());
    println!("Generations: {}", world.generation);
    println!("Best passed: {}/{}", world.best_car().max_passes, world.traffic.len());

    if let Some(snapshot) = world.best_snapshot() {
        store.save(&snapshot)?;
        println!("Best brain: {:?}", store.path());
    }

    let stats_path = "stats_history.json";
    world.stats_history.save(stats_path)?;
    println!("Stats history: {:?}", stats_path);

    Ok(())
}

fn load_seed_brain(store: &BrainStore) -> Option<neurodrive::snapshot::NetworkSnapshot> {
    match store.load() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::warn!("could not load stored brain ({e}); starting fresh");
            None
        }
    }
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn inspect_brain(brain_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Brain Analysis ===");
    println!("File: {:?}", brain_path);
    println!();

    let store = BrainStore::new(&brain_path);
    let Some(snapshot) = store.load()? else {
        println!("No brain saved yet.");
        return Ok(());
    };

    println!("Levels: {}", snapshot.levels.len());
    let mut parameters = 0;
    for (idx, level) in snapshot.levels.iter().enumerate() {
        let inputs = level.weights.len();
        let outputs = level.biases.len();
        parameters += inputs * outputs + outputs;
        println!("  level {}: {} -> {}", idx, inputs, outputs);
    }
    println!("Parameters: {}", parameters);

    let extremes = snapshot
        .levels
        .iter()
        .flat_map(|l| l.weights.iter().flatten().chain(l.biases.iter()))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    println!("Parameter range: [{:.3}, {:.3}]", extremes.0, extremes.1);

    Ok(())
}

fn run_benchmark(ticks: u64, cohort: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== neurodrive Benchmark ===");
    println!("Ticks: {}", ticks);
    println!("Cohort: {}", cohort);
    println!();

    let result = benchmark(ticks, cohort);
    println!("{}", result);

    Ok(())
}
