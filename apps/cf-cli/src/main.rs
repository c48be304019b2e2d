use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use cf_elements::ChamberKind;
use cf_engine::{EngineError, EngineResult, NetworkEngine, load_engine};

#[derive(Parser)]
#[command(name = "cf-cli")]
#[command(about = "CardioFlow CLI - lumped-parameter circulation simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a definition file
    Validate {
        /// Path to the definition (YAML or JSON)
        definition: PathBuf,
    },
    /// List the chambers, vessels and models of a definition
    Inspect {
        /// Path to the definition (YAML or JSON)
        definition: PathBuf,
    },
    /// Run a simulation and print or export watched values
    Run {
        /// Path to the definition (YAML or JSON)
        definition: PathBuf,
        /// Simulated time in seconds
        #[arg(long, default_value_t = 10.0)]
        seconds: f64,
        /// Watched value as LABEL=component.field (repeatable)
        #[arg(short, long = "watch", value_name = "LABEL=PATH")]
        watch: Vec<String>,
        /// Sample interval in seconds
        #[arg(long)]
        interval: Option<f64>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> EngineResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { definition } => cmd_validate(&definition),
        Commands::Inspect { definition } => cmd_inspect(&definition),
        Commands::Run {
            definition,
            seconds,
            watch,
            interval,
            output,
        } => cmd_run(&definition, seconds, &watch, interval, output.as_deref()),
    }
}

fn cmd_validate(path: &Path) -> EngineResult<()> {
    println!("Validating definition: {}", path.display());
    let definition = cf_project::load(path)?;
    println!("✓ Definition '{}' is valid", definition.name);
    println!("  Components: {}", definition.components.len());
    println!("  Models: {}", definition.models.len());
    Ok(())
}

fn cmd_inspect(path: &Path) -> EngineResult<()> {
    let engine = load_engine(path)?;
    let network = engine.network();

    println!("Model: {}", engine.name());
    if !engine.description().is_empty() {
        println!("  {}", engine.description());
    }
    if let Some(weight) = engine.weight() {
        println!("  Weight: {weight} kg");
    }
    println!("  Step size: {} s", engine.dt());

    println!("\nChambers:");
    for chamber in network.chambers() {
        let kind = match chamber.kind() {
            ChamberKind::Compliance => "compliance",
            ChamberKind::TimeVaryingElastance => "time_varying_elastance",
        };
        println!(
            "  {:<8} {:<24} vol {:>8.2}  enabled {}",
            chamber.name(),
            kind,
            chamber.vol(),
            chamber.is_enabled
        );
    }

    println!("\nVessels:");
    for vessel in network.vessels() {
        let from = &network.chambers()[vessel.from().index()];
        let to = &network.chambers()[vessel.to().index()];
        println!(
            "  {:<8} {:?} {} -> {}  enabled {}",
            vessel.name(),
            vessel.kind(),
            from.name(),
            to.name(),
            vessel.is_enabled
        );
    }

    println!("\nModels (step order):");
    for (order, model) in network.models().iter().enumerate() {
        println!(
            "  {}. {} [{}]  enabled {}",
            order + 1,
            model.name(),
            model.kind(),
            model.is_enabled()
        );
    }
    Ok(())
}

fn cmd_run(
    path: &Path,
    seconds: f64,
    watch: &[String],
    interval: Option<f64>,
    output: Option<&Path>,
) -> EngineResult<()> {
    let mut engine = load_engine(path)?;
    for entry in watch {
        let (label, property) = parse_watch(entry)?;
        engine.watch(label, property)?;
    }
    if let Some(interval) = interval {
        engine.set_sample_interval(interval)?;
    }

    println!("Running '{}' for {seconds:.3} s (dt = {} s)", engine.name(), engine.dt());
    let steps = engine.advance(seconds)?;
    print_summary(&engine, steps);

    if watch.is_empty() {
        return Ok(());
    }

    let csv = engine.datacollector().to_csv();
    if let Some(path) = output {
        std::fs::write(path, csv).map_err(cf_project::ProjectError::from)?;
        println!(
            "✓ Exported {} samples to {}",
            engine.datacollector().samples().len(),
            path.display()
        );
    } else {
        print!("{csv}");
    }
    Ok(())
}

fn parse_watch(entry: &str) -> EngineResult<(&str, &str)> {
    match entry.split_once('=') {
        Some((label, path)) if !label.is_empty() => Ok((label, path)),
        // bare path: label it with itself
        None => Ok((entry, entry)),
        _ => Err(EngineError::InvalidArg {
            what: format!("watch entry '{entry}' must be LABEL=component.field"),
        }),
    }
}

fn print_summary(engine: &NetworkEngine, steps: u64) {
    let perf = engine.perf();
    println!("✓ Simulation completed");
    println!("  Steps: {steps}");
    println!("  Model clock: {:.3} s", engine.clock());
    println!(
        "  Wall time: {:.3} s ({:.4} ms/step)",
        perf.last_wall_s,
        perf.last_average_step_ms()
    );
    println!("  Total volume: {:.2}", engine.total_volume());
}
