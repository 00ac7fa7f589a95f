//! Error types for the Windkessel simulator.
//!
//! This module provides a unified error type [`WindkesselError`] that covers
//! parameter validation, the per-step linear solve, forcing data loading,
//! and result output.

use thiserror::Error;

/// Result type alias using [`WindkesselError`].
pub type Result<T> = std::result::Result<T, WindkesselError>;

/// Unified error type for all Windkessel operations.
#[derive(Error, Debug)]
pub enum WindkesselError {
    // ============ Configuration Errors ============
    /// A circuit parameter is non-positive or non-finite
    #[error("Invalid parameter '{param}' = {value}: {message}")]
    InvalidParameter {
        param: &'static str,
        value: f64,
        message: String,
    },

    /// Invalid simulation setting (step count, forcing setup, ...)
    #[error("Invalid simulation parameter: {message}")]
    InvalidSimulationParam { message: String },

    // ============ Simulation Errors ============
    /// The system matrix is numerically singular or the solve produced garbage
    #[error("Singular system: {message}")]
    SingularSystem { message: String },

    /// A forcing value or carried-forward state entry is NaN or infinite
    #[error("Non-finite input '{quantity}' (value: {value})")]
    NonFiniteInput { quantity: &'static str, value: f64 },

    /// A run was aborted part-way through
    #[error("Simulation aborted at step {step} (t = {time:.6} s): {source}")]
    Aborted {
        step: usize,
        time: f64,
        #[source]
        source: Box<WindkesselError>,
    },

    // ============ I/O Errors ============
    /// Error reading a forcing data file
    #[error("Failed to read forcing file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed forcing table
    #[error("Forcing data error at line {line}: {message}")]
    ForcingData { line: usize, message: String },

    /// Error writing simulation results
    #[error("Output error: {message}")]
    OutputError { message: String },
}

impl WindkesselError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(param: &'static str, value: f64, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param,
            value,
            message: message.into(),
        }
    }

    /// Create a singular system error
    pub fn singular(message: impl Into<String>) -> Self {
        Self::SingularSystem {
            message: message.into(),
        }
    }

    /// Create a forcing data error
    pub fn forcing_data(line: usize, message: impl Into<String>) -> Self {
        Self::ForcingData {
            line,
            message: message.into(),
        }
    }
}
