//! Command-line front end: run movement scripts and generate them from
//! images.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glam::IVec2;
use tracing::info;
use tracing_subscriber::EnvFilter;

use turtle_script::{
    Budget, DebugObserver, Interpreter, NoopObserver, Observer, PngExporter, SummaryObserver,
    Turtle, TurtleConfig,
};

#[derive(Parser)]
#[command(
    name = "turtle-script",
    version,
    about = "Resource-bounded turtle interpreter for a line-oriented movement language"
)]
struct Cli {
    /// Log level filter; the RUST_LOG environment variable wins when set.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script against a configured turtle.
    Run(RunArgs),
    /// Generate a script that repaints the lit pixels of an image.
    Generate(GenerateArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Script file to run.
    script: PathBuf,

    /// Battery budget, spent by every operation. Unlimited when absent.
    #[arg(long)]
    battery: Option<u64>,

    /// Fuel budget, spent by moves. Unlimited when absent.
    #[arg(long)]
    fuel: Option<u64>,

    /// Paint budget, spent by painting cells. Unlimited when absent.
    #[arg(long)]
    paint: Option<u64>,

    /// Starting x coordinate.
    #[arg(long, default_value_t = 0)]
    start_x: i32,

    /// Starting y coordinate.
    #[arg(long, default_value_t = 0)]
    start_y: i32,

    /// Repainting an already-painted cell costs no paint.
    #[arg(long)]
    no_repaint_cost: bool,

    /// What to report while the script runs.
    #[arg(long, value_enum, default_value_t = ObserverKind::Summary)]
    observer: ObserverKind,

    /// Render the final field to this PNG instead of textual observation.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Write the final turtle state to this file as JSON.
    #[arg(long)]
    state_out: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ObserverKind {
    /// Narrate every line and command, then dump the turtle state.
    Debug,
    /// Report the painted-cell count at the end.
    Summary,
    /// No output.
    Quiet,
}

#[derive(Args)]
struct GenerateArgs {
    /// Source image.
    image: PathBuf,

    /// Script file to write.
    script: PathBuf,

    /// Keep pixels whose luma is strictly above this value.
    #[arg(long, default_value_t = 0)]
    threshold: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Generate(args) => generate(args),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = TurtleConfig {
        start: IVec2::new(args.start_x, args.start_y),
        battery: budget(args.battery),
        fuel: budget(args.fuel),
        paint: budget(args.paint),
        repaint_consumes_paint: !args.no_repaint_cost,
    };

    let turtle = if let Some(path) = &args.image {
        let (turtle, exporter) = run_script(&args.script, config, PngExporter::new(path))?;
        if let Some(Err(err)) = exporter.save_result() {
            bail!("saving {} failed: {err}", path.display());
        }
        turtle
    } else {
        let observer: Box<dyn Observer> = match args.observer {
            ObserverKind::Debug => Box::new(DebugObserver::stdout()),
            ObserverKind::Summary => Box::new(SummaryObserver::stdout()),
            ObserverKind::Quiet => Box::new(NoopObserver),
        };
        let (turtle, _) = run_script(&args.script, config, observer)?;
        turtle
    };

    if let Some(path) = &args.state_out {
        let state = serde_json::to_string_pretty(&turtle)?;
        fs::write(path, state).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

/// Streams the script through an interpreter and hands back the final
/// state. A halt is not a command-line failure: the script just stopped
/// early, and the final state was still observed.
fn run_script<O: Observer>(
    path: &Path,
    config: TurtleConfig,
    observer: O,
) -> anyhow::Result<(Turtle, O)> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut interpreter = Interpreter::new(config).with_observer(observer);
    if let Err(err) = interpreter.run_reader(BufReader::new(file)) {
        if !err.is_halt() {
            return Err(err).with_context(|| format!("running {}", path.display()));
        }
    }
    Ok(interpreter.into_parts())
}

fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let img = image::open(&args.image)
        .with_context(|| format!("opening {}", args.image.display()))?
        .to_rgba8();
    let (script, budget) = turtle_script::generate(&img, args.threshold);
    fs::write(&args.script, script).with_context(|| format!("writing {}", args.script.display()))?;
    info!(
        script = %args.script.display(),
        battery = budget.battery,
        fuel = budget.fuel,
        paint = budget.paint,
        "script written"
    );
    Ok(())
}

fn budget(limit: Option<u64>) -> Budget {
    limit.map(Budget::Finite).unwrap_or(Budget::Unlimited)
}
