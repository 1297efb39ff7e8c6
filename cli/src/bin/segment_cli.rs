use clap::{Parser, Subcommand};
use cli::{CliError, JobConfig, load_raster, save_raster};
use color_eyre::eyre::{Result, bail, eyre};
use segment::{ProcessingMode, RasterImage, SegmentationEngine};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{error, info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every job of a configuration file
    Process {
        /// Path to the TOML or JSON configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Apply a single mode to one image
    Apply {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// Where to write the result; format follows the extension
        #[arg(short, long)]
        output: PathBuf,
        /// Mode as JSON (`{"type": "ptile", "params": {"p": 0.2}}`) or a bare mode name
        #[arg(short, long)]
        mode: String,
    },
    /// List available modes with their parameters
    Modes,
    /// Print the JSON schema of processing modes
    Schema {
        /// Print the schema of the whole configuration file instead
        #[arg(long)]
        config: bool,
    },
    /// Generate a configuration with one job per mode at default parameters
    Skeleton {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// Output directory for results
        #[arg(short, long)]
        output_dir: PathBuf,
        /// Path to save the generated configuration (.toml or .json)
        #[arg(short, long)]
        config_output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Process { config } => {
            process_config(config).await?;
        }
        Commands::Apply { input, output, mode } => {
            apply_mode(input, output, mode)?;
        }
        Commands::Modes => {
            list_modes();
        }
        Commands::Schema { config } => {
            let schema = if *config {
                serde_json::to_string_pretty(&schemars::schema_for!(JobConfig))?
            } else {
                serde_json::to_string_pretty(&ProcessingMode::schema())?
            };
            println!("{schema}");
        }
        Commands::Skeleton { input, output_dir, config_output } => {
            let config = JobConfig::skeleton(input, output_dir);
            config.to_file(config_output)?;
            info!("Generated skeleton configuration with {} jobs", config.jobs.len());
            info!("Configuration saved to: {:?}", config_output);
        }
    }

    Ok(())
}

async fn process_config(config_path: &Path) -> Result<()> {
    let config = JobConfig::from_file(config_path)?;
    info!("Input image: {} ({} jobs)", config.input, config.jobs.len());

    let image = Arc::new(load_raster(&config.input)?);
    let engine = Arc::new(SegmentationEngine::new());
    std::fs::create_dir_all(&config.output_dir)?;

    let mut handles = Vec::new();
    for job in config.jobs {
        let Some(mode) = job.mode.clone() else {
            warn!(
                "No mode found for job '{}': {}",
                job.name,
                job.description.clone().unwrap_or_default()
            );
            continue;
        };

        let output = job.output_path(&config.output_dir);
        info!("Processing job '{}' ({}) -> {:?}", job.name, mode, output);

        let image = Arc::clone(&image);
        let engine = Arc::clone(&engine);
        let handle = tokio::task::spawn_blocking(move || run_job(&engine, &image, &mode, &output));
        handles.push((job, handle));
    }

    let mut failed = 0usize;
    for (job, handle) in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!("Job '{}' failed: {}", job.name, err);
                failed += 1;
            }
            Err(err) => {
                error!("Job '{}' panicked: {}", job.name, err);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} job(s) failed");
    }
    info!("Processing completed");
    Ok(())
}

fn run_job(
    engine: &SegmentationEngine,
    image: &RasterImage,
    mode: &ProcessingMode,
    output: &Path,
) -> Result<(), CliError> {
    let result = engine.process(image, mode)?;
    save_raster(&result, output)
}

fn apply_mode(input: &Path, output: &Path, mode: &str) -> Result<()> {
    let mode = parse_mode(mode)?;
    let image = load_raster(input)?;
    info!("Applying '{}' to {:?}", mode, input);

    let result = SegmentationEngine::new().process(&image, &mode)?;
    save_raster(&result, output)?;
    info!("Result saved to: {:?}", output);
    Ok(())
}

/// Accept full JSON or a bare mode name with default parameters
fn parse_mode(raw: &str) -> Result<ProcessingMode> {
    let raw = raw.trim();
    if raw.starts_with('{') {
        return Ok(serde_json::from_str(raw)?);
    }

    ProcessingMode::iter()
        .find(|mode| mode.to_string() == raw)
        .ok_or_else(|| {
            eyre!(
                "Unknown mode '{}'. Available modes: {}",
                raw,
                ProcessingMode::mode_names().join(", ")
            )
        })
}

fn list_modes() {
    for mode in ProcessingMode::iter() {
        println!("{mode}: {}", mode.description());
        for (name, description, required) in mode.parameters_info() {
            let marker = if required { "required" } else { "optional" };
            println!("    {name} ({marker}): {description}");
        }
    }
}
