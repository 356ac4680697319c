use clap::{Args, Parser, Subcommand};
use gv_app::{AppResult, RunOverrides, RunRequest, config_service, run_service};
use gv_project::EngineConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gv-cli")]
#[command(about = "Galin vane engine stroke simulator", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate an engine configuration file
    Validate {
        /// Path to the engine YAML file
        config_path: PathBuf,
    },
    /// Run one stroke from rest and print the derived engine quantities
    Summary {
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Run a sequence of strokes and write telemetry
    Run {
        #[command(flatten)]
        engine: EngineArgs,
        /// Telemetry CSV output path
        #[arg(long, default_value = "data/tmp.csv")]
        telemetry: PathBuf,
        /// Shaft position CSV output path
        #[arg(long, default_value = "data/first_stroke.csv")]
        positions: PathBuf,
        /// Number of strokes (overrides the configuration)
        #[arg(long)]
        strokes: Option<usize>,
        /// Shaft (1 or 2) whose vane leads the first stroke
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2))]
        leading_vane: Option<u8>,
        /// Common starting speed in rad/s; inferred from a stroke from rest if omitted
        #[arg(long)]
        initial_speed: Option<f64>,
    },
    /// Write the reference engine configuration to a new file
    InitConfig {
        /// Output path
        path: PathBuf,
        /// Engine name stored in the file
        #[arg(long, default_value = "galin-40deg")]
        name: String,
    },
}

/// Engine selection shared by `summary` and `run`.
#[derive(Args, Debug, Clone, Default)]
struct EngineArgs {
    /// Engine YAML file; the reference engine is used if omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Vane angular width in degrees
    #[arg(long)]
    vane_angle: Option<f64>,
    /// Combined chamber volume in m^3
    #[arg(long)]
    chamber_volume: Option<f64>,
    /// Working chamber width at ignition in degrees
    #[arg(long)]
    compression_angle: Option<f64>,
}

impl EngineArgs {
    fn resolve(&self) -> AppResult<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => config_service::load_config(path)?,
            None => EngineConfig::reference("reference"),
        };
        if let Some(v) = self.vane_angle {
            config.geometry.vane_angle_deg = v;
        }
        if let Some(v) = self.chamber_volume {
            config.geometry.chamber_volume_m3 = v;
        }
        if let Some(v) = self.compression_angle {
            config.geometry.initial_compression_angle_deg = v;
        }
        Ok(config)
    }
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Summary { engine } => cmd_summary(&engine),
        Commands::Run {
            engine,
            telemetry,
            positions,
            strokes,
            leading_vane,
            initial_speed,
        } => cmd_run(
            &engine,
            &telemetry,
            &positions,
            RunOverrides {
                strokes,
                leading_vane,
                initial_speed_rad_s: initial_speed,
            },
        ),
        Commands::InitConfig { path, name } => cmd_init_config(&path, &name),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = config_service::load_config(config_path)?;
    println!(
        "✓ Configuration '{}' is valid ({} strokes, leading vane {})",
        config.name, config.run.strokes, config.run.leading_vane
    );
    Ok(())
}

fn cmd_summary(engine: &EngineArgs) -> AppResult<()> {
    let config = engine.resolve()?;
    let report = run_service::summarize(&config)?;
    println!("{report}");
    Ok(())
}

fn cmd_run(
    engine: &EngineArgs,
    telemetry: &Path,
    positions: &Path,
    overrides: RunOverrides,
) -> AppResult<()> {
    let config = engine.resolve()?;
    let response = run_service::run(&RunRequest {
        config: &config,
        telemetry_path: Some(telemetry),
        positions_path: Some(positions),
        overrides,
    })?;

    if let Some(reference) = &response.reference {
        println!("{reference}");
        println!();
    }
    println!(
        "Running {} strokes from {:.3} rad/s, leading vane {:?}",
        response.strokes.len(),
        response.initial_speed_rad_s,
        response.leading_vane
    );
    for (i, stroke) in response.strokes.iter().enumerate() {
        println!(
            "  stroke {}: {:?}, {:.4} ms, bisector {:.2} deg{}",
            i,
            stroke.direction,
            stroke.duration_s * 1e3,
            stroke.bisector_angle_rad.to_degrees(),
            if stroke.is_converged() {
                ""
            } else {
                " (iteration ceiling)"
            }
        );
    }
    println!("✓ Total simulated time: {:.4} ms", response.total_time_s() * 1e3);
    println!(
        "  {} telemetry records -> {}",
        response.records_written,
        telemetry.display()
    );
    println!(
        "  {} position samples -> {}",
        response.positions_written,
        positions.display()
    );
    Ok(())
}

fn cmd_init_config(path: &Path, name: &str) -> AppResult<()> {
    config_service::init_config(path, name)?;
    println!("✓ Wrote reference configuration to {}", path.display());
    Ok(())
}
