//! loglik_optimizer::finite_diff: finite-difference derivatives.
//!
//! Purpose
//! -------
//! Wrap the `finitediff` crate so the rest of the optimizer can ask for a
//! gradient or a Hessian and get back validated values or an [`OptError`].
//!
//! Key behaviors
//! -------------
//! - [`run_fd_diff`]: forward-difference gradient of a scalar objective whose
//!   evaluation errors are captured in a side cell.
//! - [`compute_hessian`]: Jacobian of a gradient map by central differences,
//!   falling back to forward differences if the central result is not finite.
//!   The result is symmetrized.
//!
//! Conventions
//! -----------
//! - `finitediff` closures must return plain `f64`, so objective failures are
//!   stashed in a `RefCell<Option<Error>>` and the closure returns `NaN`. The
//!   captured error wins over any validation error.
//! - Only the forward-difference failure is reported from
//!   [`compute_hessian`]; the central-difference failure is dropped.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// run_fd_diff: forward-difference gradient with error capture.
///
/// Parameters
/// ----------
/// - `theta`: `&Theta`, evaluation point.
/// - `func`: `&G`, scalar objective; writes failures into `closure_err`
///   and returns `NaN`.
/// - `closure_err`: `&RefCell<Option<Error>>`, cleared on entry, inspected
///   after differencing.
///
/// Returns
/// -------
/// `OptResult<Grad>`: a finite gradient of length `theta.len()`.
///
/// Errors
/// ------
/// - The captured objective error, converted into [`OptError`].
/// - [`OptError::InvalidGradient`] if the difference quotient is not finite.
///
/// [`OptError`]: crate::optimization::errors::OptError
/// [`OptError::InvalidGradient`]: crate::optimization::errors::OptError::InvalidGradient
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// compute_hessian: symmetric finite-difference Jacobian of a gradient map.
///
/// `f` maps `θ` to a gradient; the returned matrix is `∂f/∂θ`, validated to
/// be `n × n` and finite, then averaged with its transpose.
///
/// # Errors
/// - [`OptError::HessianDimMismatch`] / [`OptError::InvalidHessian`] when
///   the forward-difference fallback also fails validation.
///
/// [`OptError::HessianDimMismatch`]: crate::optimization::errors::OptError::HessianDimMismatch
/// [`OptError::InvalidHessian`]: crate::optimization::errors::OptError::InvalidHessian
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let central = theta.central_hessian(f);
    let mut hess = match validate_hessian(&central, dim) {
        Ok(()) => central,
        Err(_) => {
            let forward = theta.forward_hessian(f);
            validate_hessian(&forward, dim)?;
            forward
        }
    };
    symmetrize_hess(&mut hess);
    Ok(hess)
}

// ---- Helper methods ----

fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use argmin::core::ArgminError;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Forward-difference gradients with and without captured errors.
    // - Hessians of linear gradient maps, including asymmetric ones.
    // - The non-finite failure path.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A quadratic objective yields the analytic gradient 2θ.
    fn run_fd_diff_matches_quadratic_gradient() {
        // Arrange
        let theta: Theta = array![0.5, -1.0];
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |x: &Theta| x.dot(x);

        // Act
        let grad = run_fd_diff(&theta, &f, &closure_err).unwrap();

        // Assert
        assert!((grad[0] - 1.0).abs() < 1e-5);
        assert!((grad[1] + 2.0).abs() < 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // An error captured inside the objective takes precedence over the NaN
    // gradient it produced.
    fn run_fd_diff_surfaces_captured_error() {
        let theta: Theta = array![1.0];
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_: &Theta| {
            closure_err.replace(Some(ArgminError::NotImplemented { text: "fd".into() }.into()));
            f64::NAN
        };

        let err = run_fd_diff(&theta, &f, &closure_err).unwrap_err();

        assert_eq!(err, OptError::NotImplemented { text: "fd".into() });
    }

    #[test]
    fn run_fd_diff_rejects_non_finite_gradient() {
        let theta: Theta = array![0.0, 1.0];
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);

        let err = run_fd_diff(&theta, &|_: &Theta| f64::NAN, &closure_err).unwrap_err();

        assert!(matches!(err, OptError::InvalidGradient { .. }));
    }

    #[test]
    // Purpose
    // -------
    // The Jacobian of a linear map A·θ is A; an asymmetric A comes back as
    // its symmetric part.
    //
    // Given
    // -----
    // - A = [[2, 1], [3, 4]].
    //
    // Expect
    // ------
    // - Diagonal [2, 4], off-diagonal (1 + 3)/2 = 2 in both positions.
    fn compute_hessian_returns_symmetric_part_of_linear_map() {
        let a = array![[2.0, 1.0], [3.0, 4.0]];
        let grad_fn = |theta: &Theta| a.dot(theta);
        let theta: Theta = array![0.3, -0.7];

        let hess = compute_hessian(&grad_fn, &theta).unwrap();

        assert!((hess[[0, 0]] - 2.0).abs() < 1e-6);
        assert!((hess[[1, 1]] - 4.0).abs() < 1e-6);
        assert!((hess[[0, 1]] - 2.0).abs() < 1e-6);
        assert_eq!(hess[[0, 1]], hess[[1, 0]]);
    }

    #[test]
    fn compute_hessian_rejects_non_finite_gradient_map() {
        let theta: Theta = array![0.0];
        let grad_fn = |_: &Theta| Array1::from(vec![f64::NAN]);

        let err = compute_hessian(&grad_fn, &theta).unwrap_err();

        assert!(matches!(err, OptError::InvalidHessian { .. }));
    }
}
