//! Assembly and per-step solution of the discretized loop equations.

use nalgebra::Matrix6;
use tracing::{debug, warn};

use crate::circuit::{Parameters, State, StateVar, STATE_LEN};
use crate::error::{Result, WindkesselError};

use super::lu::{multiply, LuFactors, SystemMatrix, SystemVector};
use super::ILL_CONDITIONED_THRESHOLD;

// Equation rows.
const ROW_VENTRICLE: usize = 0;
const ROW_MITRAL: usize = 1;
const ROW_AORTIC_VALVE: usize = 2;
const ROW_SYSTEMIC: usize = 3;
const ROW_ATRIUM: usize = 4;
const ROW_AORTA: usize = 5;

/// The lumped left-heart circuit, discretized with backward Euler.
///
/// Unknowns are laid out in [`StateVar`] order. The six rows are:
///
/// ```text
/// ventricle  KCL      Q_AV - Q_MV                          = Q_LV
/// mitral     Ohm      Q_MV  - (P_LA  - P_LV ) / R_MV       = 0
/// aortic     Ohm      Q_AV  - (P_LV  - P_AOR) / R_AV       = 0
/// systemic   Ohm      Q_sys - (P_AOR - P_LA ) / R_sys      = 0
/// atrium     KCL+C    C_LA /dt * P_LA  - Q_sys + Q_MV      = C_LA /dt * P_LA'
/// aorta      KCL+C    C_AOR/dt * P_AOR - Q_AV  + Q_sys     = C_AOR/dt * P_AOR'
/// ```
///
/// where primed pressures come from the previous step. The matrix depends
/// only on the parameters, so it is assembled and factored once; each call
/// to [`CircuitModel::advance`] only rebuilds the right-hand side.
#[derive(Debug, Clone)]
pub struct CircuitModel {
    params: Parameters,
    matrix: SystemMatrix,
    factors: LuFactors,
    condition_number: f64,
}

impl CircuitModel {
    /// Validate `params`, assemble the system and factor it.
    pub fn new(params: Parameters) -> Result<Self> {
        params.validate()?;

        let matrix = assemble(&params);
        let condition_number = condition_number(&matrix);
        debug!(?params, condition_number, "assembled windkessel system");
        if condition_number > ILL_CONDITIONED_THRESHOLD {
            warn!(condition_number, "windkessel system is ill-conditioned");
        }

        let factors = LuFactors::factor(&matrix)?;

        Ok(Self {
            params,
            matrix,
            factors,
            condition_number,
        })
    }

    /// Parameters the model was built from.
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Time step size.
    pub fn dt(&self) -> f64 {
        self.params.dt
    }

    /// The assembled coefficient matrix.
    pub fn matrix(&self) -> &SystemMatrix {
        &self.matrix
    }

    /// 2-norm condition number of the coefficient matrix.
    pub fn condition_number(&self) -> f64 {
        self.condition_number
    }

    /// Right-hand side for one step.
    ///
    /// Only the two compliance nodes carry memory; the resistor rows are
    /// algebraic.
    pub fn rhs(&self, forcing: f64, previous: &State) -> SystemVector {
        let mut b = [0.0; STATE_LEN];
        b[ROW_VENTRICLE] = forcing;
        b[ROW_ATRIUM] = self.params.c_la / self.params.dt * previous.p_la;
        b[ROW_AORTA] = self.params.c_aor / self.params.dt * previous.p_aor;
        b
    }

    /// Solve one time step.
    ///
    /// `forcing` is the net left-ventricular outflow over the step and
    /// `previous` the state produced by the prior step (or the initial
    /// guess). Returns a fresh state; neither input is retained.
    pub fn advance(&self, forcing: f64, previous: State) -> Result<State> {
        if !forcing.is_finite() {
            return Err(WindkesselError::NonFiniteInput {
                quantity: "forcing",
                value: forcing,
            });
        }
        if let Some((var, value)) = previous.first_non_finite() {
            return Err(WindkesselError::NonFiniteInput {
                quantity: var.symbol(),
                value,
            });
        }

        let b = self.rhs(forcing, &previous);
        let next = State::from_array(self.factors.solve(&b));

        if let Some((var, value)) = next.first_non_finite() {
            return Err(WindkesselError::singular(format!(
                "solution for {} is {}",
                var, value
            )));
        }

        Ok(next)
    }

    /// `A·x - b` for a candidate `next` state.
    pub fn residual(&self, forcing: f64, previous: &State, next: &State) -> SystemVector {
        let b = self.rhs(forcing, previous);
        let mut r = multiply(&self.matrix, &next.to_array());
        for (ri, bi) in r.iter_mut().zip(b.iter()) {
            *ri -= bi;
        }
        r
    }
}

/// Resistor branch: `Q - (P_up - P_down) / R = 0`.
fn stamp_resistor(
    a: &mut SystemMatrix,
    row: usize,
    flow: StateVar,
    upstream: StateVar,
    downstream: StateVar,
    resistance: f64,
) {
    let g = 1.0 / resistance;
    a[row][flow.index()] += 1.0;
    a[row][upstream.index()] -= g;
    a[row][downstream.index()] += g;
}

/// Compliance node: `C/dt * P - inflow + outflow = C/dt * P_prev`.
fn stamp_compliance_node(
    a: &mut SystemMatrix,
    row: usize,
    pressure: StateVar,
    inflow: StateVar,
    outflow: StateVar,
    c_over_dt: f64,
) {
    a[row][pressure.index()] += c_over_dt;
    a[row][inflow.index()] -= 1.0;
    a[row][outflow.index()] += 1.0;
}

fn assemble(params: &Parameters) -> SystemMatrix {
    use StateVar::*;

    let mut a = [[0.0; STATE_LEN]; STATE_LEN];

    // Ventricle has no compliance: what leaves through the aortic valve
    // minus what enters through the mitral valve is the prescribed outflow.
    a[ROW_VENTRICLE][AorticValveFlow.index()] = 1.0;
    a[ROW_VENTRICLE][MitralFlow.index()] = -1.0;

    stamp_resistor(
        &mut a,
        ROW_MITRAL,
        MitralFlow,
        AtrialPressure,
        VentricularPressure,
        params.r_mv,
    );
    stamp_resistor(
        &mut a,
        ROW_AORTIC_VALVE,
        AorticValveFlow,
        VentricularPressure,
        AorticPressure,
        params.r_av,
    );
    stamp_resistor(
        &mut a,
        ROW_SYSTEMIC,
        SystemicFlow,
        AorticPressure,
        AtrialPressure,
        params.r_sys,
    );

    stamp_compliance_node(
        &mut a,
        ROW_ATRIUM,
        AtrialPressure,
        SystemicFlow,
        MitralFlow,
        params.c_la / params.dt,
    );
    stamp_compliance_node(
        &mut a,
        ROW_AORTA,
        AorticPressure,
        AorticValveFlow,
        SystemicFlow,
        params.c_aor / params.dt,
    );

    a
}

/// Ratio of the largest to the smallest singular value of `a`.
///
/// Infinite when `a` is exactly singular or has non-finite entries.
pub fn condition_number(a: &SystemMatrix) -> f64 {
    if a.iter().flatten().any(|v| !v.is_finite()) {
        return f64::INFINITY;
    }
    let m = Matrix6::from_fn(|i, j| a[i][j]);
    let singular_values = m.singular_values();
    let smallest = singular_values.min();
    if smallest <= 0.0 {
        return f64::INFINITY;
    }
    singular_values.max() / smallest
}
