//! The six-quantity state vector carried from one time step to the next.

use std::fmt;

/// Number of unknowns solved per time step.
pub const STATE_LEN: usize = 6;

/// One of the six solved quantities.
///
/// The discriminant is the quantity's slot in the unknown vector of the
/// linear system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateVar {
    /// Mitral valve flow, atrium -> ventricle
    MitralFlow = 0,
    /// Aortic valve flow, ventricle -> aorta
    AorticValveFlow = 1,
    /// Systemic flow, aorta -> atrium
    SystemicFlow = 2,
    /// Left atrial pressure
    AtrialPressure = 3,
    /// Aortic pressure
    AorticPressure = 4,
    /// Left ventricular pressure
    VentricularPressure = 5,
}

impl StateVar {
    /// All quantities in unknown-vector order.
    pub const ALL: [StateVar; STATE_LEN] = [
        StateVar::MitralFlow,
        StateVar::AorticValveFlow,
        StateVar::SystemicFlow,
        StateVar::AtrialPressure,
        StateVar::AorticPressure,
        StateVar::VentricularPressure,
    ];

    /// Slot in the unknown vector.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short symbol used in logs and output headers.
    pub const fn symbol(self) -> &'static str {
        match self {
            StateVar::MitralFlow => "q_mv",
            StateVar::AorticValveFlow => "q_av",
            StateVar::SystemicFlow => "q_sys",
            StateVar::AtrialPressure => "p_la",
            StateVar::AorticPressure => "p_aor",
            StateVar::VentricularPressure => "p_lv",
        }
    }

    /// Whether this quantity is a pressure (as opposed to a flow).
    pub const fn is_pressure(self) -> bool {
        matches!(
            self,
            StateVar::AtrialPressure | StateVar::AorticPressure | StateVar::VentricularPressure
        )
    }
}

impl fmt::Display for StateVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Flows and pressures of the loop at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    pub q_mv: f64,
    pub q_av: f64,
    pub q_sys: f64,
    pub p_la: f64,
    pub p_aor: f64,
    pub p_lv: f64,
}

impl State {
    /// Starting guess used by the reference configuration.
    pub const fn reference_initial() -> Self {
        Self {
            q_mv: 10.0,
            q_av: 30.0,
            q_sys: 20.0,
            p_la: 10.0,
            p_aor: 100.0,
            p_lv: 100.0,
        }
    }

    /// A state with no flow anywhere and the same pressure at every node.
    pub const fn at_rest(pressure: f64) -> Self {
        Self {
            q_mv: 0.0,
            q_av: 0.0,
            q_sys: 0.0,
            p_la: pressure,
            p_aor: pressure,
            p_lv: pressure,
        }
    }

    /// Build a state from an unknown vector laid out in [`StateVar`] order.
    pub const fn from_array(x: [f64; STATE_LEN]) -> Self {
        Self {
            q_mv: x[0],
            q_av: x[1],
            q_sys: x[2],
            p_la: x[3],
            p_aor: x[4],
            p_lv: x[5],
        }
    }

    /// Flatten into an unknown vector laid out in [`StateVar`] order.
    pub const fn to_array(&self) -> [f64; STATE_LEN] {
        [self.q_mv, self.q_av, self.q_sys, self.p_la, self.p_aor, self.p_lv]
    }

    /// Read one quantity.
    pub fn get(&self, var: StateVar) -> f64 {
        self.to_array()[var.index()]
    }

    /// First quantity that is NaN or infinite, if any.
    pub fn first_non_finite(&self) -> Option<(StateVar, f64)> {
        StateVar::ALL
            .iter()
            .map(|&var| (var, self.get(var)))
            .find(|(_, value)| !value.is_finite())
    }

    /// Whether every quantity is finite.
    pub fn is_finite(&self) -> bool {
        self.first_non_finite().is_none()
    }
}

impl Default for State {
    fn default() -> Self {
        Self::reference_initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_follow_declaration_order() {
        for (i, var) in StateVar::ALL.iter().enumerate() {
            assert_eq!(var.index(), i);
        }
        let state = State::reference_initial();
        assert_eq!(state.get(StateVar::MitralFlow), 10.0);
        assert_eq!(state.get(StateVar::AorticValveFlow), 30.0);
        assert_eq!(state.get(StateVar::SystemicFlow), 20.0);
        assert_eq!(state.get(StateVar::AtrialPressure), 10.0);
        assert_eq!(state.get(StateVar::AorticPressure), 100.0);
        assert_eq!(state.get(StateVar::VentricularPressure), 100.0);
    }

    #[test]
    fn test_array_conversion_preserves_fields() {
        let state = State {
            q_mv: 1.0,
            q_av: 2.0,
            q_sys: 3.0,
            p_la: 4.0,
            p_aor: 5.0,
            p_lv: 6.0,
        };
        assert_eq!(state.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(State::from_array(state.to_array()), state);
    }

    #[test]
    fn test_non_finite_detection() {
        assert!(State::at_rest(80.0).is_finite());

        let state = State {
            p_aor: f64::NAN,
            ..State::reference_initial()
        };
        let (var, _) = state.first_non_finite().unwrap();
        assert_eq!(var, StateVar::AorticPressure);
        assert!(!state.is_finite());
    }

    #[test]
    fn test_pressure_classification() {
        let pressures: Vec<_> = StateVar::ALL.iter().filter(|v| v.is_pressure()).collect();
        assert_eq!(pressures.len(), 3);
        assert_eq!(StateVar::VentricularPressure.to_string(), "p_lv");
    }
}
