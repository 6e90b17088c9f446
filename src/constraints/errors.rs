//! Errors for linear equality constraints and the constrained-fit pipeline.
//!
//! This module defines [`ConstraintError`], the error type shared by the
//! restriction transform, the closed-form projection, the reference models,
//! and the fit orchestrator. Numerical failures from the dense solvers are
//! carried as context rather than flattened into strings, so callers can
//! inspect the originating [`LinalgError`] through `source()`.
//!
//! ## Conventions
//! - **Indices are 0-based**; matrix indices are flattened row-major.
//! - Shape problems are reported as [`ConstraintError::DimensionMismatch`]
//!   before any arithmetic is attempted.
//! - Optimizer failures from iterative models are wrapped unchanged in
//!   [`ConstraintError::Optimization`].
use crate::{linalg::LinalgError, optimization::errors::OptError};

/// Crate-wide result alias for constraint operations.
pub type ConstraintResult<T> = Result<T, ConstraintError>;

/// Unified error type for constrained estimation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintError {
    // ---- Constraint structure ----
    /// Solving for the affine offset failed; `q` cannot be met given `R`.
    InconsistentConstraints { source: LinalgError },

    /// `R` does not have full row rank (homogeneous constraints only).
    RedundantConstraints { rank: usize, k_constr: usize },

    /// More constraint rows than parameters.
    TooManyConstraints { k_constr: usize, k_vars: usize },

    /// The constraint matrix has no columns.
    EmptyParameterSpace,

    // ---- Input validation ----
    /// An input has the wrong length or width.
    DimensionMismatch { what: &'static str, expected: usize, found: usize },

    /// An input contains NaN or ±inf.
    NonFiniteInput { what: &'static str, index: usize, value: f64 },

    /// Response data outside the model's support.
    InvalidEndog { index: usize, value: f64, reason: &'static str },

    /// A configuration value is out of range.
    InvalidOption { name: &'static str, value: f64, reason: &'static str },

    // ---- Numerical ----
    /// `R · W · Rᵀ` is singular in the closed-form projection.
    SingularProjection { source: LinalgError },

    /// Any other dense linear-algebra failure.
    Linalg(LinalgError),

    // ---- Model fitting ----
    /// Iterative fit failed inside the optimizer.
    Optimization(OptError),
}

impl std::error::Error for ConstraintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConstraintError::InconsistentConstraints { source }
            | ConstraintError::SingularProjection { source } => Some(source),
            ConstraintError::Linalg(err) => Some(err),
            ConstraintError::Optimization(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConstraintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Constraint structure ----
            ConstraintError::InconsistentConstraints { source } => {
                write!(f, "Possibly inconsistent constraints; solving for the offset failed: {source}")
            }
            ConstraintError::RedundantConstraints { rank, k_constr } => {
                write!(
                    f,
                    "Redundant constraints: constraint matrix has rank {rank} but {k_constr} rows"
                )
            }
            ConstraintError::TooManyConstraints { k_constr, k_vars } => {
                write!(f, "Too many constraints: {k_constr} rows for {k_vars} parameters")
            }
            ConstraintError::EmptyParameterSpace => {
                write!(f, "Constraint matrix must have at least one column")
            }

            // ---- Input validation ----
            ConstraintError::DimensionMismatch { what, expected, found } => {
                write!(f, "Dimension mismatch for {what}: expected {expected}, found {found}")
            }
            ConstraintError::NonFiniteInput { what, index, value } => {
                write!(f, "Non-finite value in {what} at index {index}: {value}")
            }
            ConstraintError::InvalidEndog { index, value, reason } => {
                write!(f, "Invalid response at index {index}: {value}: {reason}")
            }
            ConstraintError::InvalidOption { name, value, reason } => {
                write!(f, "Invalid option {name} = {value}: {reason}")
            }

            // ---- Numerical ----
            ConstraintError::SingularProjection { source } => {
                write!(f, "Redundant or inconsistent constraint rows in projection: {source}")
            }
            ConstraintError::Linalg(err) => write!(f, "Linear algebra failure: {err}"),

            // ---- Model fitting ----
            ConstraintError::Optimization(err) => write!(f, "Optimization failed: {err}"),
        }
    }
}

impl From<LinalgError> for ConstraintError {
    fn from(err: LinalgError) -> Self {
        ConstraintError::Linalg(err)
    }
}

impl From<OptError> for ConstraintError {
    fn from(err: OptError) -> Self {
        ConstraintError::Optimization(err)
    }
}

/// Convert a [`ConstraintError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl From<ConstraintError> for pyo3::PyErr {
    fn from(err: ConstraintError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
