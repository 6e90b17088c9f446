//! Validation helpers for constraint and model inputs.
//!
//! - **Shape checks**: [`check_len`] compares an observed length with the
//!   expected one.
//! - **Finiteness**: [`check_finite_vec`] and [`check_finite_mat`] reject
//!   `NaN`/`±∞` and report the first offending position.
//!
//! All helpers return [`ConstraintError`] variants so the transform, the
//! projection, and the models share one reporting format.
use crate::constraints::errors::{ConstraintError, ConstraintResult};
use ndarray::{ArrayView1, ArrayView2};

/// Validate that `found == expected`.
///
/// # Errors
/// Returns [`ConstraintError::DimensionMismatch`] tagged with `what`.
pub fn check_len(what: &'static str, expected: usize, found: usize) -> ConstraintResult<()> {
    if expected != found {
        return Err(ConstraintError::DimensionMismatch { what, expected, found });
    }
    Ok(())
}

/// Validate that every entry of a vector is finite.
///
/// # Errors
/// Returns [`ConstraintError::NonFiniteInput`] with the first bad index.
pub fn check_finite_vec(what: &'static str, values: ArrayView1<'_, f64>) -> ConstraintResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(ConstraintError::NonFiniteInput { what, index, value: values[index] }),
        None => Ok(()),
    }
}

/// Validate that every entry of a matrix is finite.
///
/// The reported index is the row-major position `row · ncols + col`.
///
/// # Errors
/// Returns [`ConstraintError::NonFiniteInput`] with the first bad index.
pub fn check_finite_mat(what: &'static str, values: ArrayView2<'_, f64>) -> ConstraintResult<()> {
    let ncols = values.ncols();
    for ((i, j), &value) in values.indexed_iter() {
        if !value.is_finite() {
            return Err(ConstraintError::NonFiniteInput { what, index: i * ncols + j, value });
        }
    }
    Ok(())
}
