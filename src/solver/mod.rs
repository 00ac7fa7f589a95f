//! Numerical engine for the lumped circuit.
//!
//! ## Backward Euler on a fixed topology
//!
//! Each step solves a linear system `Ax = b` where:
//! - x holds the three branch flows and the three node pressures
//! - A encodes one KCL row at the ventricle, three resistor (Ohm) rows,
//!   and one KCL row with a discretized capacitor at each compliance node
//! - b holds the ventricular forcing and the compliance history terms
//!   `C/dt * P_prev`
//!
//! ```text
//! [ KCL_LV          ] [ Q ]   [ Q_LV           ]
//! [ Ohm (3 rows)    ] [   ] = [ 0              ]
//! [ KCL + C/dt (2)  ] [ P ]   [ C/dt * P_prev  ]
//! ```
//!
//! A only depends on the parameters, so it is LU-factored once per model
//! and every step is a forward/back substitution.

mod lu;
mod model;
mod simulator;

pub use lu::{LuFactors, SystemMatrix, SystemVector};
pub use model::{condition_number, CircuitModel};
pub use simulator::{OutputRow, RunError, Sample, Simulator, SimulatorConfig, TimeSeries};

/// Relative pivot magnitude below which the system is treated as singular.
pub const SINGULAR_PIVOT_TOLERANCE: f64 = 1e-13;

/// Condition number above which model construction logs a warning.
pub const ILL_CONDITIONED_THRESHOLD: f64 = 1e12;
