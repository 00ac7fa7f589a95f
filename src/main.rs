//! Windkessel - left-heart circulation simulator
//!
//! Runs one fixed-length simulation and writes the time series as CSV.
//!
//! # Usage
//!
//! ```bash
//! windkessel --steps 10000 > results.csv
//! RUST_LOG=debug windkessel --forcing-file q_lv.txt > results.csv
//! ```

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use windkessel_core::{
    error::Result,
    forcing::{self, SampledForcing},
    output::write_csv,
    CircuitModel, Parameters, Simulator, SimulatorConfig, State, DEFAULT_FORCING_AMPLITUDE,
    DEFAULT_FORCING_ANGULAR_FREQUENCY, DEFAULT_STEP_COUNT,
};

const REFERENCE: Parameters = Parameters::reference();

/// Left-heart Windkessel circuit simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of time steps
    #[arg(short = 'n', long, default_value_t = DEFAULT_STEP_COUNT)]
    steps: usize,

    /// Time step size
    #[arg(long, default_value_t = REFERENCE.dt)]
    dt: f64,

    /// Mitral valve resistance
    #[arg(long, default_value_t = REFERENCE.r_mv)]
    r_mv: f64,

    /// Aortic valve resistance
    #[arg(long, default_value_t = REFERENCE.r_av)]
    r_av: f64,

    /// Systemic vascular resistance
    #[arg(long, default_value_t = REFERENCE.r_sys)]
    r_sys: f64,

    /// Aortic compliance
    #[arg(long, default_value_t = REFERENCE.c_aor)]
    c_aor: f64,

    /// Left atrial compliance
    #[arg(long, default_value_t = REFERENCE.c_la)]
    c_la: f64,

    /// Peak ventricular outflow of the cosine drive
    #[arg(long, default_value_t = DEFAULT_FORCING_AMPLITUDE)]
    amplitude: f64,

    /// Angular frequency of the cosine drive (rad/s)
    #[arg(long, default_value_t = DEFAULT_FORCING_ANGULAR_FREQUENCY)]
    angular_frequency: f64,

    /// Two-column (time, flow) table used instead of the cosine drive
    #[arg(long, value_name = "PATH")]
    forcing_file: Option<PathBuf>,

    /// Log the system condition number on every step (trace level)
    #[arg(long)]
    trace_condition: bool,

    /// Log progress every N steps (debug level, 0 disables)
    #[arg(long, default_value_t = 0)]
    progress_interval: usize,
}

fn main() -> Result<()> {
    // Stdout carries the CSV, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let params = Parameters {
        r_mv: args.r_mv,
        r_av: args.r_av,
        r_sys: args.r_sys,
        c_aor: args.c_aor,
        c_la: args.c_la,
        dt: args.dt,
    };

    // Validates and factors once
    let model = CircuitModel::new(params)?;
    info!(
        condition_number = model.condition_number(),
        "circuit model ready"
    );

    let config = SimulatorConfig::new()
        .with_condition_trace(args.trace_condition)
        .with_progress_interval(args.progress_interval);
    let simulator = Simulator::with_config(model, config);
    let initial = State::reference_initial();

    let result = match &args.forcing_file {
        Some(path) => {
            let table = SampledForcing::load(path)?;
            let (start, end) = table.time_span();
            info!(samples = table.len(), start, end, "loaded forcing table");
            simulator.run(args.steps, |t| table.at(t), initial)
        }
        None => simulator.run(
            args.steps,
            forcing::cosine(args.amplitude, args.angular_frequency),
            initial,
        ),
    };

    let mut stdout = io::stdout().lock();
    match result {
        Ok(series) => write_csv(&series, &mut stdout),
        Err(err) => {
            // Keep what completed for diagnosis
            write_csv(&err.partial, &mut stdout)?;
            Err(err.into())
        }
    }
}
