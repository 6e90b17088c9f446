//! Numerical options for building a [`TransformRestriction`].
//!
//! [`TransformRestriction`]: crate::constraints::TransformRestriction
use crate::constraints::errors::{ConstraintError, ConstraintResult};

/// Default eigenvalue threshold separating the null space from its complement.
pub const DEFAULT_EIGEN_SPLIT: f64 = 0.5;

/// Default minimum reciprocal condition number accepted by the offset and
/// projection solves.
pub const DEFAULT_SINGULAR_TOL: f64 = 1e-10;

/// Tuning knobs for the restriction transform.
///
/// - `eigen_split`: eigenvalues of the null-space projector below this value
///   are assigned to the constrained complement `L`, the rest to the
///   null-space basis. The projector is idempotent, so its spectrum sits at 0
///   and 1; any value strictly inside `(0, 1)` works, 0.5 is the most robust.
/// - `singular_tol`: minimum `σ_min / σ_max` for the `k_constr × k_constr`
///   offset system. Below this the constraints are reported as inconsistent.
///
/// Default: `eigen_split = 0.5`, `singular_tol = 1e-10`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestrictionOptions {
    pub eigen_split: f64,
    pub singular_tol: f64,
}

impl RestrictionOptions {
    /// Construct validated options.
    ///
    /// # Rules
    /// - `eigen_split` must be finite and strictly inside `(0, 1)`.
    /// - `singular_tol` must be finite and strictly positive.
    ///
    /// # Errors
    /// - [`ConstraintError::InvalidOption`] naming the offending field.
    pub fn new(eigen_split: f64, singular_tol: f64) -> ConstraintResult<Self> {
        if !eigen_split.is_finite() || eigen_split <= 0.0 || eigen_split >= 1.0 {
            return Err(ConstraintError::InvalidOption {
                name: "eigen_split",
                value: eigen_split,
                reason: "Eigenvalue split must lie strictly between 0 and 1.",
            });
        }
        if !singular_tol.is_finite() || singular_tol <= 0.0 {
            return Err(ConstraintError::InvalidOption {
                name: "singular_tol",
                value: singular_tol,
                reason: "Singularity tolerance must be finite and positive.",
            });
        }
        Ok(Self { eigen_split, singular_tol })
    }
}

impl Default for RestrictionOptions {
    fn default() -> Self {
        Self { eigen_split: DEFAULT_EIGEN_SPLIT, singular_tol: DEFAULT_SINGULAR_TOL }
    }
}
