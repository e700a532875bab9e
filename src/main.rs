use clap::Parser;
use env_logger::{Builder, Env};
use log::{info, warn};
use rssi_localization::{
    ConfigurationManager, OutputFormat, ReportWriter, Scenario, Simulation, SimulationConfig, StepReport,
};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "rssi-sim", about = "Step-driven RSSI localization and direction-finding simulator")]
struct Args {
    /// Built-in scenario: outdoor, indoor or octonode
    #[arg(short, long, default_value = "octonode")]
    preset: Scenario,

    /// JSON configuration file, used instead of the preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of steps
    #[arg(long)]
    steps: Option<u64>,

    /// Override the measurement RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Report format: text, json or csv
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Print one line per step in text mode
    #[arg(long)]
    compact: bool,

    /// Pretty-print JSON reports
    #[arg(long)]
    pretty: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn load_config(args: &Args) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let base = match &args.config {
        Some(path) => SimulationConfig::load_from_file(path)?,
        None => args.preset.config(),
    };

    let mut manager = ConfigurationManager::new(base)?;
    if let Some(steps) = args.steps {
        let old = manager.set_max_steps(steps)?;
        info!("max_steps {} -> {}", old, steps);
    }
    if let Some(seed) = args.seed {
        let old = manager.set_rng_seed(seed);
        info!("rng_seed {} -> {}", old, seed);
    }
    Ok(manager.into_config())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();

    let config = load_config(&args)?;
    if args.dump_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    let mut simulation = Simulation::configure(config)?;
    let mut writer = ReportWriter::new(args.format);
    if args.compact {
        writer = writer.with_compact_text();
    }
    if args.pretty {
        writer = writer.with_pretty_json();
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut clamped = 0usize;

    while !simulation.is_finished() {
        let output = simulation.step_next()?;
        clamped += output.clamped_count();
        let report = StepReport::new(&output, simulation.anchors(), simulation.estimator())?;
        writeln!(out, "{}", writer.render(&report, simulation.anchors())?)?;
    }

    if clamped > 0 {
        warn!("{} measurements were altered by the negative-distance policy", clamped);
    }
    info!("{} steps simulated", simulation.steps_recorded());
    Ok(())
}
