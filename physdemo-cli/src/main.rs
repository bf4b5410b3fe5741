mod app;
mod history;
mod render;

use clap::{Parser, Subcommand};
use physdemo_core::{
    Domain, Effect, ParameterUpdate, ScenarioConfig, SimulationKind, SimulationRunner, Snapshot,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "physdemo")]
#[command(about = "Physics demos: projectiles, springs, collisions, pulleys and spinning bodies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Step a demo without a window and print its snapshots
    Run {
        /// projectile, sho, collision, atwood or rotation
        #[arg(required_unless_present = "config")]
        kind: Option<SimulationKind>,
        /// Scenario file to run instead of a bare kind
        #[arg(long, short, conflicts_with = "kind")]
        config: Option<PathBuf>,
        /// Override a parameter, e.g. --set mass1=2.5
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<ParameterUpdate>,
        /// Number of ticks to run (stops early once a configured duration ends)
        #[arg(long, default_value_t = 200)]
        ticks: u64,
        /// Print every Nth snapshot
        #[arg(long, default_value_t = 10)]
        every: u64,
    },
    /// List the parameters of a simulation kind
    Params {
        kind: SimulationKind,
    },
    /// Open the interactive viewer
    View {
        /// Scenario file to open directly; reloaded when it changes
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Run {
            kind,
            config,
            set,
            ticks,
            every,
        } => run_demo(kind, config.as_deref(), &set, ticks, every),
        Commands::Params { kind } => {
            print_params(kind);
            Ok(())
        }
        Commands::View { config } => app::run(config),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr so `run` output stays a clean table.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

fn run_demo(
    kind: Option<SimulationKind>,
    config_path: Option<&Path>,
    overrides: &[ParameterUpdate],
    ticks: u64,
    every: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match (config_path, kind) {
        (Some(path), _) => ScenarioConfig::load(path)?,
        (None, Some(kind)) => ScenarioConfig::new(kind),
        (None, None) => return Err("either a kind or --config is required".into()),
    };
    for update in overrides {
        config.parameters.insert(update.name.clone(), update.value);
    }

    let mut runner = SimulationRunner::from_config(config)?;
    let every = every.max(1);

    print_header(&runner.snapshot());
    print_row(&runner.snapshot());
    for _ in 0..ticks {
        let snap = runner.tick()?;
        if snap.step % every == 0 || !snap.events.is_empty() {
            print_row(&snap);
        }
        for warning in &snap.warnings {
            eprintln!("warning at t={:.4}: {}", snap.time, warning);
        }
        if runner.is_finished() {
            break;
        }
    }

    runner.dispose();
    Ok(())
}

fn print_header(snap: &Snapshot) {
    print!("{:>6} {:>9} {:>12} {:>12} {:>12}", "step", "t", "kinetic", "potential", "total");
    for q in &snap.quantities {
        print!(" {:>14}", q.name);
    }
    println!("  events");
}

fn print_row(snap: &Snapshot) {
    print!(
        "{:>6} {:>9.4} {:>12.5} {:>12.5} {:>12.5}",
        snap.step,
        snap.time,
        snap.energy.kinetic,
        snap.energy.potential,
        snap.energy.total()
    );
    for q in &snap.quantities {
        print!(" {:>14.5}", q.value);
    }
    let events: Vec<&str> = snap.events.iter().map(|e| e.label()).collect();
    println!("  {}", events.join(","));
}

fn print_params(kind: SimulationKind) {
    println!("{} ({})", kind.title(), kind);
    println!("{}", kind.description());
    println!();
    println!("{:<18} {:>10} {:<8} {:<22} {}", "name", "default", "unit", "domain", "applies");
    for spec in kind.specs() {
        let domain = match spec.domain {
            Domain::Positive => "> 0".to_string(),
            Domain::NonNegative => ">= 0".to_string(),
            Domain::Range { min, max } => format!("[{min}, {max}]"),
            Domain::Flag => "0 or 1".to_string(),
            Domain::Choice(options) => options.join("/"),
        };
        let applies = match spec.effect {
            Effect::Live => "live",
            Effect::Initial => "on reset",
        };
        println!(
            "{:<18} {:>10} {:<8} {:<22} {}",
            spec.name, spec.default, spec.unit, domain, applies
        );
    }
}
