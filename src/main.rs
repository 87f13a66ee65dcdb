use clap::Parser;
use murmur::prelude::*;
use murmur::scenario::DEFAULT_AGENTS;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

/// Tick limit for runs that neither pass `--ticks` nor script a quit.
const DEFAULT_TICKS: u64 = 1_000;

/// Headless flocking simulation
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Preset to run
    #[arg(short, long, value_enum, default_value_t = Scenario::Plain)]
    scenario: Scenario,

    /// Number of followers
    #[arg(short, long, default_value_t = DEFAULT_AGENTS)]
    agents: u32,

    /// Stop after this many ticks
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Seed for the initial population
    #[arg(long)]
    seed: Option<u64>,

    /// JSON configuration replacing the preset's
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Scheduled command, e.g. `120:left`, `40:accel:0.2,0` or `900:quit`
    #[arg(long = "command", value_name = "TICK:KIND[:ARGS]")]
    commands: Vec<String>,

    /// Log flock statistics every K ticks (0 disables)
    #[arg(long, value_name = "K", default_value_t = 100)]
    report_every: u64,

    /// Minimum wall time per tick in milliseconds
    #[arg(long, value_name = "D", default_value_t = 0)]
    delay_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    murmur::logging::init(args.verbose);

    let config = match &args.config {
        Some(path) => {
            log::info!("loading configuration from {}", path.display());
            FlockConfig::from_path(path)?
        }
        None => args.scenario.config(),
    };

    let mut simulation = args.scenario.simulation_with(config, args.agents);
    if let Some(seed) = args.seed {
        simulation = simulation.with_seed(seed);
    }
    let mut flock = simulation.build()?;

    let mut script = Script::parse(args.commands.iter().map(String::as_str))?;
    let limit = match args.ticks {
        Some(ticks) => Some(ticks),
        None if script.quits() => None,
        None => Some(DEFAULT_TICKS),
    };

    log::info!(
        "running {} with {} agents, {} scheduled commands, limit {}",
        args.scenario.name(),
        flock.agents().len(),
        script.len(),
        limit.map_or_else(|| "none".to_string(), |t| t.to_string())
    );

    let mut time = Time::paced(Duration::from_millis(args.delay_ms));
    let report_every = (args.report_every > 0).then_some(args.report_every);
    let mut ran = 0;

    // run in report-sized chunks so every report sees the whole flock
    while flock.state() != FlockState::Stopped {
        let remaining = limit.map(|limit| limit - ran);
        if remaining == Some(0) {
            break;
        }
        let chunk = match (report_every, remaining) {
            (Some(every), Some(remaining)) => Some(every.min(remaining)),
            (every, remaining) => every.or(remaining),
        };

        ran += flock.run(
            |tick: u64| script.poll(tick),
            |_: u64, _: &[DrawRecord]| {
                time.update();
                time.pace();
            },
            chunk,
        )?;

        if let Some(every) = report_every {
            if flock.tick() % every == 0 && flock.state() == FlockState::Running {
                log::info!("tick {}: {}", flock.tick(), flock.stats());
            }
        }
    }

    log::info!(
        "finished after {} ticks in {:.2}s ({:.1} ticks/s), state {:?}",
        ran,
        time.elapsed(),
        time.average_tps(),
        flock.state()
    );
    log::info!("final: {}", flock.stats());
    Ok(())
}
