//! Circuit description: fixed parameters and the carried-forward state.
//!
//! The loop has three nodes (left atrium, left ventricle, aorta) joined by
//! three resistors (mitral valve, aortic valve, systemic bed). The atrium and
//! the aorta each carry a compliance to the reference pressure; the ventricle
//! is driven by a prescribed net outflow.

mod params;
mod state;

pub use params::Parameters;
pub use state::{State, StateVar, STATE_LEN};
