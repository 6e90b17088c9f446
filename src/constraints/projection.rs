//! Closed-form Mahalanobis projection of an estimate onto `R·θ = q`.
//!
//! For a linear estimator (OLS) with covariance proportional to `weight_inv`,
//! the projection is the exact constrained estimator. For nonlinear models it
//! is the one-step linearized correction around the unconstrained optimum.
use crate::{
    constraints::{
        errors::{ConstraintError, ConstraintResult},
        options::DEFAULT_SINGULAR_TOL,
        transform::unit_rows,
        validation::{check_finite_mat, check_finite_vec, check_len},
    },
    linalg::solve_guarded,
};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

/// transform_params_constraint: project `params` onto `R·θ = q`.
///
/// Parameters
/// ----------
/// - `params`: `ArrayView1<f64>`
///   Unconstrained estimate, length `k_vars`.
/// - `weight_inv`: `ArrayView2<f64>`
///   Symmetric positive-definite `k_vars × k_vars` weighting matrix, usually
///   the covariance of `params` or a proxy such as `(XᵀX)⁻¹`.
/// - `r`: `ArrayView2<f64>`
///   `k_constr × k_vars` constraint matrix.
/// - `q`: `ArrayView1<f64>`
///   Length-`k_constr` constraint values.
///
/// Returns
/// -------
/// `ConstraintResult<Array1<f64>>`
///   `params − W Rᵀ (R W Rᵀ)⁻¹ (R·params − q)`, the point closest to `params`
///   in the `W⁻¹` metric that satisfies the constraint. When `params` is
///   already feasible the correction is zero.
///
/// Errors
/// ------
/// - [`ConstraintError::DimensionMismatch`] for non-conforming inputs.
/// - [`ConstraintError::NonFiniteInput`] for NaN/±inf entries.
/// - [`ConstraintError::SingularProjection`] if `R W Rᵀ` is singular, which
///   happens for redundant or inconsistent constraint rows. Rows of `R` are
///   rescaled to unit norm (with `q` alongside) before this check, so a row
///   written in large units is not mistaken for a singular one.
pub fn transform_params_constraint(
    params: ArrayView1<'_, f64>, weight_inv: ArrayView2<'_, f64>, r: ArrayView2<'_, f64>,
    q: ArrayView1<'_, f64>,
) -> ConstraintResult<Array1<f64>> {
    let k_vars = params.len();
    let k_constr = r.nrows();
    check_len("weight_inv rows", k_vars, weight_inv.nrows())?;
    check_len("weight_inv columns", k_vars, weight_inv.ncols())?;
    check_len("constraint matrix columns", k_vars, r.ncols())?;
    check_len("constraint values", k_constr, q.len())?;
    check_finite_vec("params", params)?;
    check_finite_mat("weight_inv", weight_inv)?;
    check_finite_mat("constraint matrix", r)?;
    check_finite_vec("constraint values", q)?;

    let (r, q) = unit_rows(r, q);
    let w_rt = weight_inv.dot(&r.t());
    let middle = r.dot(&w_rt);
    let violation = r.dot(&params) - &q;
    let multipliers = solve_guarded(
        middle.view(),
        violation.view().insert_axis(Axis(1)),
        DEFAULT_SINGULAR_TOL,
    )
    .map_err(|source| ConstraintError::SingularProjection { source })?;
    let reduction = w_rt.dot(&multipliers.column(0));
    Ok(&params - &reduction)
}
