//! Main simulator interface.

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::circuit::State;
use crate::error::WindkesselError;

use super::model::CircuitModel;

/// Configuration for the simulator.
#[derive(Debug, Clone, Default)]
pub struct SimulatorConfig {
    /// Emit the condition number at trace level on every step.
    pub trace_condition: bool,
    /// Log progress every this many steps (0 disables).
    pub progress_interval: usize,
}

impl SimulatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the per-step condition-number trace.
    pub fn with_condition_trace(mut self, enabled: bool) -> Self {
        self.trace_condition = enabled;
        self
    }

    /// Set the progress logging interval in steps.
    pub fn with_progress_interval(mut self, steps: usize) -> Self {
        self.progress_interval = steps;
        self
    }
}

/// One completed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Time at which the forcing was evaluated
    pub time: f64,
    /// State solved at this step
    pub state: State,
    /// Ventricular outflow applied at this step
    pub forcing: f64,
}

impl Sample {
    /// The quantities handed to plotting/output consumers.
    pub fn output_row(&self) -> OutputRow {
        OutputRow {
            time: self.time,
            p_lv: self.state.p_lv,
            p_aor: self.state.p_aor,
            p_la: self.state.p_la,
            q_lv: self.forcing,
            q_sys: self.state.q_sys,
            q_av: self.state.q_av,
        }
    }
}

/// `(time, P_LV, P_AOR, P_LA, Q_LV, Q_sys, Q_AV)` for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputRow {
    pub time: f64,
    pub p_lv: f64,
    pub p_aor: f64,
    pub p_la: f64,
    pub q_lv: f64,
    pub q_sys: f64,
    pub q_av: f64,
}

/// Append-only record of a run, in step order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    samples: Vec<Sample>,
}

impl TimeSeries {
    /// Create an empty series with room for `steps` samples.
    pub fn with_capacity(steps: usize) -> Self {
        Self {
            samples: Vec::with_capacity(steps),
        }
    }

    fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All samples in step order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Most recent sample.
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// State after the most recent step.
    pub fn final_state(&self) -> Option<State> {
        self.last().map(|s| s.state)
    }

    /// Output tuples for every step, in order.
    pub fn output_rows(&self) -> impl Iterator<Item = OutputRow> + '_ {
        self.samples.iter().map(Sample::output_row)
    }

    /// Consume the series, returning its samples.
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// A run that stopped before completing all steps.
///
/// `partial` holds every step that completed; the failed step is not in it.
#[derive(Error, Debug)]
#[error("Simulation aborted at step {step} (t = {time:.6} s): {source}")]
pub struct RunError {
    /// Index of the step that failed
    pub step: usize,
    /// Time of the step that failed
    pub time: f64,
    /// What went wrong
    #[source]
    pub source: WindkesselError,
    /// Samples from the steps before the failure
    pub partial: TimeSeries,
}

impl From<RunError> for WindkesselError {
    fn from(e: RunError) -> Self {
        WindkesselError::Aborted {
            step: e.step,
            time: e.time,
            source: Box::new(e.source),
        }
    }
}

/// Drives a [`CircuitModel`] across a fixed number of steps.
#[derive(Debug, Clone)]
pub struct Simulator {
    model: CircuitModel,
    config: SimulatorConfig,
}

impl Simulator {
    /// Create a new simulator with default configuration.
    pub fn new(model: CircuitModel) -> Self {
        Self::with_config(model, SimulatorConfig::default())
    }

    /// Create a new simulator with custom configuration.
    pub fn with_config(model: CircuitModel, config: SimulatorConfig) -> Self {
        Self { model, config }
    }

    /// The underlying circuit model.
    pub fn model(&self) -> &CircuitModel {
        &self.model
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Time step size.
    pub fn dt(&self) -> f64 {
        self.model.dt()
    }

    /// Run exactly `step_count` steps starting from `initial`.
    ///
    /// Step `i` evaluates `forcing` at `t = i * dt`, advances the state
    /// produced by step `i - 1` and records `(t, state, forcing)`. The first
    /// failing step aborts the run; the returned [`RunError`] carries the
    /// samples recorded before it.
    pub fn run<F>(
        &self,
        step_count: usize,
        mut forcing: F,
        initial: State,
    ) -> Result<TimeSeries, RunError>
    where
        F: FnMut(f64) -> f64,
    {
        let dt = self.dt();
        let mut series = TimeSeries::with_capacity(step_count);
        let mut state = initial;

        info!(step_count, dt, "starting simulation");

        for step in 0..step_count {
            let time = step as f64 * dt;
            let q_lv = forcing(time);

            state = match self.model.advance(q_lv, state) {
                Ok(next) => next,
                Err(source) => {
                    warn!(step, time, error = %source, "simulation aborted");
                    return Err(RunError {
                        step,
                        time,
                        source,
                        partial: series,
                    });
                }
            };

            if self.config.trace_condition {
                trace!(
                    step,
                    time,
                    condition_number = self.model.condition_number(),
                    "step solved"
                );
            }

            series.push(Sample {
                time,
                state,
                forcing: q_lv,
            });

            if self.config.progress_interval > 0 && (step + 1) % self.config.progress_interval == 0
            {
                debug!(
                    step = step + 1,
                    time,
                    p_lv = state.p_lv,
                    p_aor = state.p_aor,
                    p_la = state.p_la,
                    "progress"
                );
            }
        }

        info!(steps = series.len(), "simulation finished");
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Parameters;
    use crate::forcing;
    use approx::assert_abs_diff_eq;

    fn reference_simulator() -> Simulator {
        Simulator::new(CircuitModel::new(Parameters::reference()).unwrap())
    }

    #[test]
    fn test_reference_scenario() {
        let sim = reference_simulator();
        let series = sim
            .run(10_000, forcing::cosine(1000.0, 1.0), State::reference_initial())
            .unwrap();

        assert_eq!(series.len(), 10_000);
        for (i, sample) in series.iter().enumerate() {
            assert_abs_diff_eq!(sample.time, i as f64 * 1e-3, epsilon = 1e-12);
            assert!(sample.state.is_finite(), "non-finite state at step {}", i);
            assert!(sample.forcing.is_finite());
        }
        for pair in series.samples().windows(2) {
            assert!(pair[1].time > pair[0].time);
            assert_abs_diff_eq!(pair[1].time - pair[0].time, 1e-3, epsilon = 1e-9);
        }

        let first = series.samples()[0];
        assert_eq!(first.time, 0.0);
        assert_eq!(first.forcing, 1000.0);
    }

    #[test]
    fn test_step_count_is_exact() {
        let sim = reference_simulator();
        for n in [0, 1, 7, 250] {
            let series = sim.run(n, |_| 0.0, State::reference_initial()).unwrap();
            assert_eq!(series.len(), n);
        }
        assert!(sim
            .run(0, |_| 0.0, State::reference_initial())
            .unwrap()
            .final_state()
            .is_none());
    }

    #[test]
    fn test_each_step_consumes_previous_state() {
        let sim = reference_simulator();
        let initial = State::reference_initial();
        let drive = |t: f64| 300.0 * (5.0 * t).sin() + 50.0;
        let series = sim.run(50, drive, initial).unwrap();

        let mut previous = initial;
        for sample in &series {
            let expected = sim.model().advance(drive(sample.time), previous).unwrap();
            assert_eq!(sample.state, expected);
            assert_eq!(sample.forcing, drive(sample.time));
            previous = sample.state;
        }
    }

    #[test]
    fn test_forcing_evaluated_in_step_order() {
        let sim = reference_simulator();
        let mut seen = Vec::new();
        let series = sim
            .run(
                20,
                |t| {
                    seen.push(t);
                    0.0
                },
                State::at_rest(50.0),
            )
            .unwrap();
        let times: Vec<f64> = series.iter().map(|s| s.time).collect();
        assert_eq!(seen, times);
    }

    #[test]
    fn test_abort_keeps_partial_series() {
        let sim = reference_simulator();
        let dt = sim.dt();
        let result = sim.run(
            100,
            |t| if t >= 5.0 * dt - 1e-12 { f64::NAN } else { 10.0 },
            State::reference_initial(),
        );

        let err = result.unwrap_err();
        assert_eq!(err.step, 5);
        assert_eq!(err.partial.len(), 5);
        assert!(err.partial.iter().all(|s| s.state.is_finite()));
        assert!(matches!(
            err.source,
            WindkesselError::NonFiniteInput {
                quantity: "forcing",
                ..
            }
        ));

        let wrapped: WindkesselError = err.into();
        assert!(matches!(wrapped, WindkesselError::Aborted { step: 5, .. }));
    }

    #[test]
    fn test_output_rows_follow_samples() {
        let model = CircuitModel::new(Parameters::reference()).unwrap();
        let sim = Simulator::with_config(
            model,
            SimulatorConfig::new()
                .with_condition_trace(true)
                .with_progress_interval(2),
        );
        let series = sim.run(3, |_| 75.0, State::reference_initial()).unwrap();

        for (row, sample) in series.output_rows().zip(series.iter()) {
            assert_eq!(row.time, sample.time);
            assert_eq!(row.p_lv, sample.state.p_lv);
            assert_eq!(row.p_aor, sample.state.p_aor);
            assert_eq!(row.p_la, sample.state.p_la);
            assert_eq!(row.q_lv, 75.0);
            assert_eq!(row.q_sys, sample.state.q_sys);
            assert_eq!(row.q_av, sample.state.q_av);
        }
        assert_eq!(series.output_rows().count(), 3);
    }
}
