//! # Windkessel Core
//!
//! A lumped-parameter simulator for the closed left-heart circulation loop.
//!
//! This library provides:
//! - An electrical-circuit analogy of the loop: valve and vascular
//!   resistances as resistors, atrial and aortic compliance as capacitors
//! - An implicit (backward Euler) discretization solved as one linear
//!   system per time step
//! - A fixed-horizon time-marching driver that records every step
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`circuit`] - Physical parameters and the carried-forward state vector
//! - [`solver`] - System assembly, LU factorization and the time-marching loop
//! - [`forcing`] - Ventricular outflow drives (closed form or sampled table)
//! - [`output`] - CSV export of a run
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! windkessel --steps 10000 > results.csv
//! windkessel --forcing-file q_lv.txt --dt 5e-4 > results.csv
//! ```
//!
//! ### Library
//!
//! ```no_run
//! use windkessel_core::{forcing, CircuitModel, Parameters, Simulator, State};
//!
//! let model = CircuitModel::new(Parameters::reference())?;
//! let sim = Simulator::new(model);
//! let series = sim.run(10_000, forcing::cosine(1000.0, 1.0), State::reference_initial())?;
//! println!("final aortic pressure: {}", series.final_state().unwrap().p_aor);
//! # Ok::<(), windkessel_core::WindkesselError>(())
//! ```
//!
//! ## Simulation Method
//!
//! For each time step of size dt:
//!
//! 1. Evaluate the ventricular outflow at `t = i * dt`
//! 2. Build the right-hand side from the outflow and the previous atrial and
//!    aortic pressures scaled by `C/dt`
//! 3. Solve `Ax = b` with the LU factors computed when the model was built
//!
//! The previous state is the only memory between steps.

pub mod circuit;
pub mod error;
pub mod forcing;
pub mod output;
pub mod solver;

// Re-export main types for convenience
pub use circuit::{Parameters, State, StateVar};
pub use error::{Result, WindkesselError};
pub use solver::{CircuitModel, RunError, Simulator, SimulatorConfig, TimeSeries};

/// Number of steps in the reference run.
pub const DEFAULT_STEP_COUNT: usize = 10_000;

/// Peak ventricular outflow of the reference cosine drive.
pub const DEFAULT_FORCING_AMPLITUDE: f64 = 1000.0;

/// Angular frequency of the reference cosine drive (rad/s).
pub const DEFAULT_FORCING_ANGULAR_FREQUENCY: f64 = 1.0;
