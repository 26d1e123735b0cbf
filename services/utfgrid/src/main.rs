//! UTFGrid command line tool.
//!
//! Rasterizes GeoJSON polygons into UTFGrid JSON and looks up attributes in
//! existing grids.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use grid_common::GridError;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use utfgrid::config::{RenderConfig, RenderOverrides};
use utfgrid::job;

#[derive(Parser, Debug)]
#[command(name = "utfgrid")]
#[command(about = "Rasterize vector features into UTFGrid interaction grids")]
struct Cli {
    /// Log level or filter directives (e.g. "info,renderer=debug")
    #[arg(long, default_value = "info", env = "UTFGRID_LOG_LEVEL", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "UTFGRID_LOG_JSON", global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a GeoJSON file into a UTFGrid
    Render {
        /// YAML job file; flags below override its values
        #[arg(short, long, env = "UTFGRID_CONFIG")]
        config: Option<PathBuf>,

        /// Input GeoJSON file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Extent as "minx,miny,maxx,maxy"
        #[arg(short, long, allow_hyphen_values = true)]
        bbox: Option<String>,

        /// Request width in pixels [default: 256]
        #[arg(long)]
        width: Option<u32>,

        /// Request height in pixels [default: 256]
        #[arg(long)]
        height: Option<u32>,

        /// Pixels per grid cell [default: 4]
        #[arg(short, long)]
        resolution: Option<u32>,

        /// Comma-separated attributes to extract
        #[arg(short, long, value_delimiter = ',')]
        fields: Option<Vec<String>>,

        /// Attribute holding the feature id [default: id]
        #[arg(long)]
        id_field: Option<String>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON indentation, 0 for compact [default: 4]
        #[arg(long)]
        indent: Option<usize>,

        /// Search scan lines in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Print the attributes at a cell of a UTFGrid JSON file
    Resolve {
        /// UTFGrid JSON file
        input: PathBuf,

        /// Cell row (pixel row with --resolution)
        row: u32,

        /// Cell column (pixel column with --resolution)
        col: u32,

        /// Treat row/col as source pixels of a grid rendered at this resolution
        #[arg(short, long)]
        resolution: Option<u32>,
    },
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.log_level, cli.log_json) {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Command failed");
            let code = e
                .downcast_ref::<GridError>()
                .map_or(1, GridError::exit_code);
            ExitCode::from(code as u8)
        }
    }
}

/// Filter from RUST_LOG when it holds valid directives, else from `--log-level`.
fn log_filter(rust_log: Option<String>, log_level: &str) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(log_level))
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let filter = log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), log_level);

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Render {
            config,
            input,
            bbox,
            width,
            height,
            resolution,
            fields,
            id_field,
            output,
            indent,
            parallel,
        } => {
            let base = match &config {
                Some(path) => RenderConfig::from_file(path)
                    .with_context(|| format!("Failed to load job file {}", path.display()))?,
                None => RenderConfig::default(),
            };
            let config = base.merge(RenderOverrides {
                input,
                bbox,
                width,
                height,
                resolution,
                fields,
                id_field,
                output,
                indent,
                parallel,
            });

            info!(
                input = ?config.input,
                bbox = ?config.bbox,
                width = config.width,
                height = config.height,
                resolution = config.resolution,
                fields = ?config.fields,
                "Starting render"
            );

            let rendered = job::render(&config)?;
            job::write_output(&config, &rendered.utfgrid)?;

            info!(
                rows = rendered.utfgrid.height(),
                keys = rendered.utfgrid.keys.len(),
                features = rendered.features,
                elapsed_ms = rendered.elapsed_ms,
                "Render completed"
            );
        }

        Commands::Resolve {
            input,
            row,
            col,
            resolution,
        } => {
            let utfgrid = job::read_utfgrid(&input)
                .with_context(|| format!("Failed to read UTFGrid {}", input.display()))?;
            let record = job::resolve(&utfgrid, row, col, resolution)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}
