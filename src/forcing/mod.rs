//! Left-ventricular outflow drives.
//!
//! The simulator accepts any `FnMut(f64) -> f64` as the forcing. This module
//! provides the two drives used in practice: a closed-form cosine and an
//! interpolated table of measured `(time, flow)` samples.
//!
//! # Table format
//!
//! ```text
//! # time   flow
//! 0.000    0.0
//! 0.010    12.5
//! 0.020,   31.0
//! ```
//!
//! One sample per line, two numeric columns separated by whitespace and/or a
//! comma. Blank lines and lines starting with `#` are skipped. Times must be
//! strictly increasing.

use std::path::Path;

use crate::error::{Result, WindkesselError};

/// `amplitude * cos(angular_frequency * t)`.
pub fn cosine(amplitude: f64, angular_frequency: f64) -> impl Fn(f64) -> f64 + Copy {
    move |t| amplitude * (angular_frequency * t).cos()
}

/// A pre-loaded table of flow samples, linearly interpolated in time.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledForcing {
    times: Vec<f64>,
    flows: Vec<f64>,
}

impl SampledForcing {
    /// Build a table from matching time and flow columns.
    pub fn new(times: Vec<f64>, flows: Vec<f64>) -> Result<Self> {
        if times.is_empty() {
            return Err(WindkesselError::InvalidSimulationParam {
                message: "forcing table is empty".to_string(),
            });
        }
        if times.len() != flows.len() {
            return Err(WindkesselError::InvalidSimulationParam {
                message: format!(
                    "forcing table has {} times but {} flows",
                    times.len(),
                    flows.len()
                ),
            });
        }
        if let Some(i) = times
            .iter()
            .chain(flows.iter())
            .position(|v| !v.is_finite())
        {
            return Err(WindkesselError::InvalidSimulationParam {
                message: format!("forcing table entry {} is not finite", i % times.len()),
            });
        }
        if let Some(i) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(WindkesselError::InvalidSimulationParam {
                message: format!(
                    "forcing times must be strictly increasing (t[{}] = {}, t[{}] = {})",
                    i,
                    times[i],
                    i + 1,
                    times[i + 1]
                ),
            });
        }
        Ok(Self { times, flows })
    }

    /// Parse a two-column table.
    pub fn parse(input: &str) -> Result<Self> {
        let mut times = Vec::new();
        let mut flows = Vec::new();

        for (idx, raw) in input.lines().enumerate() {
            let line = idx + 1;
            let text = raw.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = text
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|f| !f.is_empty())
                .collect();
            if fields.len() != 2 {
                return Err(WindkesselError::forcing_data(
                    line,
                    format!("expected 2 columns, found {}", fields.len()),
                ));
            }

            let time = parse_number(fields[0], line)?;
            let flow = parse_number(fields[1], line)?;
            if let Some(&last) = times.last() {
                if time <= last {
                    return Err(WindkesselError::forcing_data(
                        line,
                        format!("time {} does not follow {}", time, last),
                    ));
                }
            }
            times.push(time);
            flows.push(flow);
        }

        if times.is_empty() {
            return Err(WindkesselError::forcing_data(0, "no samples found"));
        }

        Self::new(times, flows)
    }

    /// Read and parse a table file.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| WindkesselError::FileReadError {
                path: path.display().to_string(),
                source: e,
            })?;
        Self::parse(&content)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// First and last sample times.
    pub fn time_span(&self) -> (f64, f64) {
        (self.times[0], self.times[self.times.len() - 1])
    }

    /// Flow at time `t`.
    ///
    /// Linear between samples; held at the end values outside the table.
    pub fn at(&self, t: f64) -> f64 {
        let last = self.times.len() - 1;
        if t <= self.times[0] {
            return self.flows[0];
        }
        if t >= self.times[last] {
            return self.flows[last];
        }

        // First sample strictly after t; 1..=last given the checks above
        let hi = self.times.partition_point(|&x| x <= t);
        let lo = hi - 1;
        let span = self.times[hi] - self.times[lo];
        let w = (t - self.times[lo]) / span;
        self.flows[lo] + w * (self.flows[hi] - self.flows[lo])
    }
}

fn parse_number(field: &str, line: usize) -> Result<f64> {
    let value: f64 = field
        .parse()
        .map_err(|_| WindkesselError::forcing_data(line, format!("invalid number '{}'", field)))?;
    if !value.is_finite() {
        return Err(WindkesselError::forcing_data(
            line,
            format!("value '{}' is not finite", field),
        ));
    }
    Ok(value)
}
