//! IBE correction batch tool.
//!
//! Computes the inverse barometer correction for altimetry files from a
//! precomputed `(time, lat, lon)` cube and either writes it to side-car
//! files or applies it to the heights in place.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cube_sampler::TimeWindow;
use ibe_common::Epoch;
use netcdf_io::{silence_hdf5_errors, ColumnIndices, LoadMode, VariableNames};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ibecor::{load_shared_cube, CorrectionApplier, FormatKind, IbeConfig, OutputMode};

#[derive(Parser, Debug)]
#[command(name = "ibecor")]
#[command(about = "Computes and applies the inverse barometer correction")]
struct Args {
    /// Input files; a single argument is expanded as a glob pattern
    #[arg(required = true)]
    files: Vec<String>,

    /// Variable names of x, y, t and height in structured files
    #[arg(short = 'v', long = "vnames", num_args = 4, value_names = ["X", "Y", "T", "H"])]
    vnames: Option<Vec<String>>,

    /// Zero-based columns of x, y, t and height in delimited files
    #[arg(short = 'c', long = "cols", num_args = 4, value_names = ["X", "Y", "T", "H"])]
    cols: Option<Vec<usize>>,

    /// Reference epoch of the input times (seconds since Y M D h m s)
    #[arg(short = 'e', long = "epoch", num_args = 6, value_names = ["Y", "M", "D", "h", "m", "s"])]
    epoch: Option<Vec<i32>>,

    /// Apply the correction to the heights instead of writing a separate file
    #[arg(short = 'a', long = "apply")]
    apply: bool,

    /// Correction cube file
    #[arg(long)]
    cube: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input format: structured or delimited
    #[arg(long)]
    format: Option<FormatKind>,

    /// Field separator for delimited input (default: whitespace)
    #[arg(long)]
    delimiter: Option<char>,

    /// First year of a cube time subset
    #[arg(long, requires = "subset_end")]
    subset_start: Option<i32>,

    /// Last year of a cube time subset
    #[arg(long, requires = "subset_start")]
    subset_end: Option<i32>,

    /// Read the whole cube into memory up front
    #[arg(long)]
    resident: bool,

    /// Projection code of the input x/y (3031, CATS2008, 3976, PSNorth, 4326)
    #[arg(long)]
    projection: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    /// Layer command-line values over `config`.
    fn apply_to(&self, config: &mut IbeConfig) -> Result<()> {
        if let Some(cube) = &self.cube {
            config.cube_file = cube.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = Some(delimiter);
        }
        if let Some([x, y, t, z]) = self.vnames.as_deref() {
            config.variables = VariableNames {
                x: x.clone(),
                y: y.clone(),
                t: t.clone(),
                z: z.clone(),
            };
        }
        if let Some(&[x, y, t, z]) = self.cols.as_deref() {
            config.columns = ColumnIndices { x, y, t, z };
        }
        if let Some(&[year, month, day, hour, minute, second]) = self.epoch.as_deref() {
            config.epoch = Epoch::new(year, month, day, hour, minute, second)?;
        }
        if self.apply {
            config.mode = OutputMode::Apply;
        }
        if let (Some(first), Some(last)) = (self.subset_start, self.subset_end) {
            config.subset.time = Some(TimeWindow::from_years(first, last)?);
        }
        if self.resident {
            config.load_mode = LoadMode::Resident;
        }
        if let Some(projection) = &self.projection {
            config.projection = projection.clone();
        }
        Ok(())
    }
}

/// Expand a single argument as a glob pattern; several arguments are taken
/// literally.
fn expand_inputs(files: &[String]) -> Result<Vec<PathBuf>> {
    match files {
        [pattern] => {
            let mut paths = glob::glob(pattern)
                .with_context(|| format!("invalid glob pattern '{}'", pattern))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            paths.sort();
            Ok(paths)
        }
        _ => Ok(files.iter().map(PathBuf::from).collect()),
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;
    silence_hdf5_errors();

    let mut config = match &args.config {
        Some(path) => IbeConfig::from_yaml(path)?,
        None => IbeConfig::default(),
    };
    config.apply_env()?;
    args.apply_to(&mut config)?;
    config.validate()?;

    let files = expand_inputs(&args.files)?;
    if files.is_empty() {
        bail!("no input files match {:?}", args.files);
    }

    info!(
        files = files.len(),
        cube = %config.cube_file.display(),
        mode = ?config.mode,
        format = %config.format,
        epoch = %config.epoch,
        projection = %config.projection,
        "Starting IBE correction"
    );

    let cube = load_shared_cube(&config)?;
    let applier = CorrectionApplier::new(cube, &config)?;
    let reports = applier.run(&files)?;

    info!(files = reports.len(), "IBE correction complete");
    Ok(())
}
