//! Dense LU factorization for the fixed-size system.

use crate::circuit::STATE_LEN;
use crate::error::{Result, WindkesselError};

use super::SINGULAR_PIVOT_TOLERANCE;

/// Row-major coefficient matrix of the per-step system.
pub type SystemMatrix = [[f64; STATE_LEN]; STATE_LEN];

/// Vector of right-hand-side values or unknowns.
pub type SystemVector = [f64; STATE_LEN];

/// LU decomposition with partial pivoting, `P·A = L·U`.
///
/// `L` (unit diagonal, not stored) and `U` share one array. The
/// factorization is computed once and reused for every right-hand side.
#[derive(Debug, Clone)]
pub struct LuFactors {
    lu: SystemMatrix,
    pivots: [usize; STATE_LEN],
}

impl LuFactors {
    /// Factor `a`.
    ///
    /// A pivot smaller than [`SINGULAR_PIVOT_TOLERANCE`] times the largest
    /// entry of `a` is reported as [`WindkesselError::SingularSystem`].
    pub fn factor(a: &SystemMatrix) -> Result<Self> {
        let n = STATE_LEN;
        let mut lu = *a;
        let mut pivots = [0usize; STATE_LEN];
        for (i, p) in pivots.iter_mut().enumerate() {
            *p = i;
        }

        if a.iter().flatten().any(|v| !v.is_finite()) {
            return Err(WindkesselError::singular("matrix has non-finite entries"));
        }
        let scale = max_abs(a);
        if scale == 0.0 {
            return Err(WindkesselError::singular("matrix is identically zero"));
        }
        let threshold = SINGULAR_PIVOT_TOLERANCE * scale;

        for k in 0..n {
            // Find pivot
            let mut max_val = lu[k][k].abs();
            let mut max_row = k;

            for (i, row) in lu.iter().enumerate().skip(k + 1) {
                let val = row[k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if max_val <= threshold {
                return Err(WindkesselError::singular(format!(
                    "pivot {:.3e} in column {} is below tolerance {:.3e}",
                    max_val, k, threshold
                )));
            }

            if max_row != k {
                pivots.swap(k, max_row);
                lu.swap(k, max_row);
            }

            // Eliminate
            let pivot = lu[k][k];
            for i in (k + 1)..n {
                let factor = lu[i][k] / pivot;
                lu[i][k] = factor;
                for j in (k + 1)..n {
                    lu[i][j] -= factor * lu[k][j];
                }
            }
        }

        Ok(Self { lu, pivots })
    }

    /// Solve `A·x = b` using the stored factors.
    pub fn solve(&self, b: &SystemVector) -> SystemVector {
        let n = STATE_LEN;
        let mut x = [0.0; STATE_LEN];

        // Apply pivot permutation to b
        for i in 0..n {
            x[i] = b[self.pivots[i]];
        }

        // Forward substitution (L * y = Pb)
        for i in 0..n {
            for j in 0..i {
                x[i] -= self.lu[i][j] * x[j];
            }
        }

        // Back substitution (U * x = y)
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                x[i] -= self.lu[i][j] * x[j];
            }
            x[i] /= self.lu[i][i];
        }

        x
    }
}

/// `A·x`.
pub fn multiply(a: &SystemMatrix, x: &SystemVector) -> SystemVector {
    let mut out = [0.0; STATE_LEN];
    for (o, row) in out.iter_mut().zip(a.iter()) {
        *o = row.iter().zip(x.iter()).map(|(aij, xj)| aij * xj).sum();
    }
    out
}

fn max_abs(a: &SystemMatrix) -> f64 {
    a.iter().flatten().fold(0.0f64, |acc, v| acc.max(v.abs()))
}
