//! Entry point for maximizing a [`LogLikelihood`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LogLikelihood, MLEOptions},
    },
};

/// maximize: run L-BFGS on `−ℓ(θ)` starting from `theta0`.
///
/// Parameters
/// ----------
/// - `f`: model implementing [`LogLikelihood`].
/// - `theta0`: starting point, consumed by the solver state.
/// - `data`: observations forwarded to every evaluation.
/// - `opts`: tolerances, line search, verbosity, L-BFGS memory.
///
/// Returns
/// -------
/// `OptResult<OptimOutcome>` with `θ̂`, `ℓ(θ̂)`, termination status, and
/// counters.
///
/// Errors
/// ------
/// - Whatever `f.check` rejects.
/// - Solver construction or runtime failures, converted into `OptError`.
///
/// Examples
/// --------
/// ```
/// use ndarray::array;
/// use rust_constrained::optimization::errors::OptResult;
/// use rust_constrained::optimization::loglik_optimizer::{
///     LogLikelihood, MLEOptions, Theta, maximize,
/// };
///
/// struct Peak;
/// impl LogLikelihood for Peak {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(-(theta[0] - 2.0).powi(2))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = maximize(&Peak, array![0.0], &(), &MLEOptions::default()).unwrap();
/// assert!((out.theta_hat[0] - 2.0).abs() < 1e-4);
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::OptError,
        loglik_optimizer::{Cost, Grad, Tolerances},
    };
    use ndarray::array;

    // Concave quadratic with maximum at `center`.
    struct Quadratic {
        center: Theta,
    }

    impl LogLikelihood for Quadratic {
        type Data = ();

        fn value(&self, theta: &Theta, _: &()) -> OptResult<Cost> {
            Ok(-(theta - &self.center).mapv(|d| d * d).sum())
        }

        fn check(&self, theta: &Theta, _: &()) -> OptResult<()> {
            if theta.len() != self.center.len() {
                return Err(OptError::ThetaLengthMismatch {
                    expected: self.center.len(),
                    actual: theta.len(),
                });
            }
            Ok(())
        }

        fn grad(&self, theta: &Theta, _: &()) -> OptResult<Grad> {
            Ok((theta - &self.center).mapv(|d| -2.0 * d))
        }
    }

    #[test]
    // Purpose
    // -------
    // Both line searches locate the maximum of a concave quadratic.
    fn maximize_finds_quadratic_peak_with_either_line_search() {
        let model = Quadratic { center: array![1.5, -0.5, 3.0] };
        for searcher in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            let opts =
                MLEOptions::new(Tolerances::default(), searcher, false, None).unwrap();

            let out = maximize(&model, array![0.0, 0.0, 0.0], &(), &opts).unwrap();

            for (a, b) in out.theta_hat.iter().zip(model.center.iter()) {
                assert!((a - b).abs() < 1e-5, "{searcher:?}: {a} vs {b}");
            }
            assert!(out.value <= 0.0 && out.value > -1e-8);
        }
    }

    #[test]
    fn maximize_runs_check_before_solving() {
        let model = Quadratic { center: array![1.0, 2.0] };

        let err = maximize(&model, array![0.0], &(), &MLEOptions::default()).unwrap_err();

        assert_eq!(err, OptError::ThetaLengthMismatch { expected: 2, actual: 1 });
    }
}
