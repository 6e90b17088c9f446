//! Bridge from [`LogLikelihood`] to argmin's `CostFunction` / `Gradient`.
//!
//! The solver minimizes `c(θ) = −ℓ(θ)`. Analytic gradients are negated;
//! without one, the cost itself is finite-differenced (central first, then
//! forward if the central pass hit an error or produced non-finite values).
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        finite_diff::run_fd_diff,
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// A model and its data, seen as an argmin minimization problem.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }

    fn fd_gradient(&self, theta: &Theta) -> Result<Grad, Error> {
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost_func = |theta: &Theta| -> f64 {
            self.cost(theta).unwrap_or_else(|e| {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            })
        };
        let central = theta.central_diff(&cost_func);
        let central_failed = closure_err.borrow().is_some();
        if !central_failed && validate_grad(&central, theta.len()).is_ok() {
            return Ok(central);
        }
        Ok(run_fd_diff(theta, &cost_func, &closure_err)?)
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// `−ℓ(θ)`; a non-finite `ℓ` is reported as [`OptError::NonFiniteCost`].
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let value = self.f.value(theta, self.data)?;
        if !value.is_finite() {
            return Err(OptError::NonFiniteCost { value }.into());
        }
        Ok(-value)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// `−∇ℓ(θ)` when the model provides it, otherwise a finite-difference
    /// gradient of the cost. Model errors other than
    /// [`OptError::GradientNotImplemented`] propagate.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, theta.len())?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => self.fd_gradient(theta),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use ndarray::array;

    // ℓ(θ) = −Σ (θ_i − 1)², with or without an analytic gradient.
    struct Bowl {
        analytic: bool,
    }

    impl LogLikelihood for Bowl {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            Ok(-theta.mapv(|t| (t - 1.0).powi(2)).sum())
        }

        fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
            if self.analytic {
                Ok(theta.mapv(|t| -2.0 * (t - 1.0)))
            } else {
                Err(OptError::GradientNotImplemented)
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The cost is the negated log-likelihood and the analytic gradient is
    // negated to match.
    fn adapter_negates_value_and_analytic_gradient() {
        let model = Bowl { analytic: true };
        let adapter = ArgMinAdapter::new(&model, &());
        let theta = array![0.0, 3.0];

        assert_eq!(adapter.cost(&theta).unwrap(), 5.0);
        assert_eq!(adapter.gradient(&theta).unwrap(), array![-2.0, 4.0]);
    }

    #[test]
    // Purpose
    // -------
    // Without an analytic gradient the finite-difference path agrees with
    // the analytic one.
    fn adapter_falls_back_to_finite_differences() {
        let model = Bowl { analytic: false };
        let adapter = ArgMinAdapter::new(&model, &());
        let theta = array![0.0, 3.0];

        let g = adapter.gradient(&theta).unwrap();

        assert!((g[0] + 2.0).abs() < 1e-5);
        assert!((g[1] - 4.0).abs() < 1e-5);
    }
}
