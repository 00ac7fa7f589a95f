//! Physical parameters of the lumped circuit.

use crate::error::{Result, WindkesselError};

/// Fixed physical parameters of the left-heart loop.
///
/// Resistances relate pressure drop to flow across a valve or vascular bed;
/// compliances relate stored volume to pressure at a chamber or vessel node.
/// All values must be expressed in one consistent pressure/flow/time unit
/// system. A `Parameters` value is never mutated once a model is built from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    /// Mitral valve resistance (atrium -> ventricle)
    pub r_mv: f64,
    /// Aortic valve resistance (ventricle -> aorta)
    pub r_av: f64,
    /// Systemic vascular resistance (aorta -> atrium)
    pub r_sys: f64,
    /// Aortic compliance
    pub c_aor: f64,
    /// Left atrial compliance
    pub c_la: f64,
    /// Time step size
    pub dt: f64,
}

impl Parameters {
    /// The reference configuration of the left-ventricle loop.
    pub const fn reference() -> Self {
        Self {
            r_mv: 0.375,
            r_av: 0.15,
            r_sys: 27.0,
            c_aor: 0.06,
            c_la: 0.015,
            dt: 1e-3,
        }
    }

    /// Set the time step size.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Named view of every parameter, in declaration order.
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("r_mv", self.r_mv),
            ("r_av", self.r_av),
            ("r_sys", self.r_sys),
            ("c_aor", self.c_aor),
            ("c_la", self.c_la),
            ("dt", self.dt),
        ]
    }

    /// Check that every resistance, compliance and the time step are finite
    /// and strictly positive.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.entries() {
            if !value.is_finite() {
                return Err(WindkesselError::invalid_parameter(
                    name,
                    value,
                    "must be a finite number",
                ));
            }
            if value <= 0.0 {
                return Err(WindkesselError::invalid_parameter(
                    name,
                    value,
                    "must be strictly positive",
                ));
            }
        }
        Ok(())
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_is_valid() {
        assert!(Parameters::reference().validate().is_ok());
        assert_eq!(Parameters::default(), Parameters::reference());
    }

    #[test]
    fn test_zero_systemic_resistance_rejected() {
        let params = Parameters {
            r_sys: 0.0,
            ..Parameters::reference()
        };
        match params.validate() {
            Err(WindkesselError::InvalidParameter { param, value, .. }) => {
                assert_eq!(param, "r_sys");
                assert_eq!(value, 0.0);
            }
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_time_step_rejected() {
        let params = Parameters::reference().with_dt(0.0);
        assert!(matches!(
            params.validate(),
            Err(WindkesselError::InvalidParameter { param: "dt", .. })
        ));
    }

    #[test]
    fn test_negative_and_nan_rejected() {
        let negative = Parameters {
            c_la: -0.015,
            ..Parameters::reference()
        };
        assert!(negative.validate().is_err());

        let nan = Parameters {
            r_av: f64::NAN,
            ..Parameters::reference()
        };
        assert!(matches!(
            nan.validate(),
            Err(WindkesselError::InvalidParameter { param: "r_av", .. })
        ));

        let infinite = Parameters {
            c_aor: f64::INFINITY,
            ..Parameters::reference()
        };
        assert!(infinite.validate().is_err());
    }
}
