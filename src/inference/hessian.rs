//! inference::hessian: covariance from the observed information.
//!
//! Purpose
//! -------
//! Turn a fitted maximum-likelihood estimate into a parameter covariance
//! matrix without requiring an analytic Hessian. The observed information
//! `J(θ̂) = ∂²(−ℓ)/∂θ∂θᵀ` is obtained by finite-differencing the negative
//! score and inverted with eigenvalue truncation.
//!
//! Key behaviors
//! -------------
//! - [`calc_covariance`] builds `J(θ̂)` via
//!   [`compute_hessian`] and returns its Moore–Penrose pseudo-inverse.
//! - [`standard_errors`] takes square roots of a covariance diagonal,
//!   clamping tiny negative rounding residue at zero.
//!
//! Invariants & assumptions
//! ------------------------
//! - The gradient map passed in is the gradient of the **negative**
//!   log-likelihood on the **sum** scale, so that `J(θ̂)` is positive
//!   semi-definite near a maximum and its inverse is the usual asymptotic
//!   covariance.
//! - Directions whose information eigenvalue is at or below
//!   `EIGEN_EPS · λ_max` contribute zero variance instead of blowing up.
//!
//! Conventions
//! -----------
//! - Constrained fits call this on the reduced model; the full-space
//!   covariance is obtained afterwards by congruence with the null-space
//!   basis.
use crate::{
    linalg::pinv_symmetric,
    optimization::{errors::OptResult, loglik_optimizer::finite_diff::compute_hessian},
};
use ndarray::{Array1, Array2, ArrayView2};

/// calc_covariance: pseudo-inverse of the finite-difference observed information.
///
/// Parameters
/// ----------
/// - `neg_score`: `&F`
///   Gradient map `θ ↦ ∇(−ℓ)(θ)`; must be C¹ near `theta_hat`.
/// - `theta_hat`: `&Array1<f64>`
///   Point estimate at which the information is evaluated.
///
/// Returns
/// -------
/// `OptResult<Array2<f64>>`
///   Symmetric `n × n` covariance, `n = theta_hat.len()`. An empty estimate
///   yields a `0 × 0` matrix without evaluating `neg_score`.
///
/// Errors
/// ------
/// - [`OptError::HessianDimMismatch`] / [`OptError::InvalidHessian`] from
///   [`compute_hessian`].
/// - [`OptError::Linalg`] if the decomposition is rejected.
///
/// [`OptError::HessianDimMismatch`]: crate::optimization::errors::OptError::HessianDimMismatch
/// [`OptError::InvalidHessian`]: crate::optimization::errors::OptError::InvalidHessian
/// [`OptError::Linalg`]: crate::optimization::errors::OptError::Linalg
pub fn calc_covariance<F: Fn(&Array1<f64>) -> Array1<f64>>(
    neg_score: &F, theta_hat: &Array1<f64>,
) -> OptResult<Array2<f64>> {
    if theta_hat.is_empty() {
        return Ok(Array2::zeros((0, 0)));
    }
    let obs_info = compute_hessian(neg_score, theta_hat)?;
    Ok(pinv_symmetric(obs_info.view())?)
}

/// Square roots of the covariance diagonal; negative rounding residue maps to 0.
pub fn standard_errors(cov: ArrayView2<'_, f64>) -> Array1<f64> {
    cov.diag().mapv(|v| v.max(0.0).sqrt())
}
