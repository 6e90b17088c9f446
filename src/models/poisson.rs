//! models::poisson: log-link Poisson regression fitted by maximum likelihood.
//!
//! Purpose
//! -------
//! Iterative reference model for constrained fitting. Counts `yᵢ` are
//! modeled with mean `μᵢ = exp(ηᵢ)`, `η = Xβ + offset`, where the offset is
//! typically a log-exposure.
//!
//! Key behaviors
//! -------------
//! - [`CountData`] validates the response (finite, non-negative) and caches
//!   `ln Γ(yᵢ + 1)` so likelihood evaluations only touch `η`.
//! - [`PoissonModel`] implements [`LogLikelihood`] with the analytic score
//!   `Xᵀ(y − μ)`, and [`PoissonModel::fit_mle`] runs L-BFGS through
//!   [`maximize`].
//! - The covariance is the pseudo-inverse of the observed information,
//!   obtained by finite-differencing the analytic score at `β̂`.
//! - A design with no columns has nothing to estimate; the fit skips the
//!   optimizer and only evaluates the log-likelihood.
//!
//! Invariants & assumptions
//! ------------------------
//! - `η` is capped at [`ETA_MAX`] before exponentiation, so an overshooting
//!   line-search step produces a large finite cost instead of an overflow.
//!   The cap is far outside any realistic fitted mean.
//! - Non-integer counts are accepted; the likelihood is then the usual
//!   quasi-Poisson extension through `ln Γ`.
//!
//! Conventions
//! -----------
//! - Parameters are on the log-mean scale. `scale` is fixed at `1.0` and
//!   p-values use the normal reference.
use crate::{
    constraints::{
        errors::{ConstraintError, ConstraintResult},
        validation::{check_finite_mat, check_finite_vec, check_len},
    },
    fitting::traits::ConstrainedModel,
    inference::calc_covariance,
    models::results::{Reference, RegressionResults},
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{
            Cost, Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, maximize,
        },
    },
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use statrs::function::gamma::ln_gamma;

/// Upper cap on the linear predictor before `exp`.
pub const ETA_MAX: f64 = 700.0;

/// Validated observations for [`PoissonModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct CountData {
    endog: Array1<f64>,
    exog: Array2<f64>,
    offset: Option<Array1<f64>>,
    ln_factorial: Array1<f64>,
}

impl CountData {
    /// # Errors
    /// - [`ConstraintError::DimensionMismatch`] for row or offset mismatches.
    /// - [`ConstraintError::NonFiniteInput`] for NaN or ±inf in `exog` or
    ///   `offset`.
    /// - [`ConstraintError::InvalidEndog`] for a negative or non-finite count.
    pub fn new(
        endog: Array1<f64>, exog: Array2<f64>, offset: Option<Array1<f64>>,
    ) -> ConstraintResult<Self> {
        check_len("exog rows", endog.len(), exog.nrows())?;
        if let Some((index, &value)) =
            endog.iter().enumerate().find(|(_, y)| !y.is_finite() || **y < 0.0)
        {
            return Err(ConstraintError::InvalidEndog {
                index,
                value,
                reason: "Counts must be finite and non-negative.",
            });
        }
        check_finite_mat("exog", exog.view())?;
        if let Some(offset) = &offset {
            check_len("offset", endog.len(), offset.len())?;
            check_finite_vec("offset", offset.view())?;
        }
        let ln_factorial = endog.mapv(|y| ln_gamma(y + 1.0));
        Ok(Self { endog, exog, offset, ln_factorial })
    }

    /// `η = Xθ + offset`.
    pub fn linear_predictor(&self, theta: &Theta) -> Array1<f64> {
        let eta = self.exog.dot(theta);
        match &self.offset {
            Some(offset) => eta + offset,
            None => eta,
        }
    }
}

/// Poisson regression with log link.
#[derive(Debug, Clone, PartialEq)]
pub struct PoissonModel {
    data: CountData,
}

impl PoissonModel {
    /// Build a model from counts, design, and optional offset.
    ///
    /// # Errors
    /// See [`CountData::new`].
    pub fn new(
        endog: Array1<f64>, exog: Array2<f64>, offset: Option<Array1<f64>>,
    ) -> ConstraintResult<Self> {
        Ok(Self { data: CountData::new(endog, exog, offset)? })
    }

    pub fn data(&self) -> &CountData {
        &self.data
    }

    /// Score `∇ℓ(θ) = Xᵀ(y − μ(θ))`.
    pub fn score(&self, theta: &Theta) -> Grad {
        let mu = self.data.linear_predictor(theta).mapv(mean_from_eta);
        self.data.exog.t().dot(&(&self.data.endog - &mu))
    }

    /// fit_mle: maximize the log-likelihood and attach the covariance.
    ///
    /// Parameters
    /// ----------
    /// - `start_params`: `Option<ArrayView1<f64>>`
    ///   Starting values; zeros when `None`.
    /// - `opts`: `&MLEOptions`
    ///   Optimizer tolerances, line search, and memory.
    ///
    /// Returns
    /// -------
    /// `ConstraintResult<RegressionResults>` with `optim` set to the
    /// optimizer outcome (absent for a zero-column design).
    ///
    /// Errors
    /// ------
    /// - [`ConstraintError::DimensionMismatch`] / [`ConstraintError::NonFiniteInput`]
    ///   for bad start values.
    /// - [`ConstraintError::Optimization`] for any optimizer or covariance
    ///   failure.
    pub fn fit_mle(
        &self, start_params: Option<ArrayView1<'_, f64>>, opts: &MLEOptions,
    ) -> ConstraintResult<RegressionResults> {
        let k = self.data.exog.ncols();
        if let Some(start) = start_params {
            check_len("start_params", k, start.len())?;
            check_finite_vec("start_params", start)?;
        }
        if k == 0 {
            let params = Array1::zeros(0);
            let llf = self.value(&params, &self.data)?;
            return Ok(self.results(params, Array2::zeros((0, 0)), llf, None));
        }

        let theta0 = start_params.map_or_else(|| Array1::zeros(k), |s| s.to_owned());
        let outcome = maximize(self, theta0, &self.data, opts)?;
        let hit_max_iter = opts.tols.max_iter.is_some_and(|m| outcome.iterations >= m);
        if !outcome.converged || hit_max_iter {
            log::warn!(
                "Poisson fit did not converge after {} iterations: {}",
                outcome.iterations,
                outcome.status
            );
        }

        let neg_score = |theta: &Array1<f64>| -self.score(theta);
        let cov_params = calc_covariance(&neg_score, &outcome.theta_hat)?;
        Ok(self.results(outcome.theta_hat.clone(), cov_params, outcome.value, Some(outcome)))
    }

    fn results(
        &self, params: Array1<f64>, cov_params: Array2<f64>, llf: f64,
        optim: Option<OptimOutcome>,
    ) -> RegressionResults {
        let nobs = self.data.endog.len();
        RegressionResults {
            df_resid: nobs as f64 - params.len() as f64,
            params,
            cov_params,
            nobs,
            scale: 1.0,
            llf,
            optim,
            reference: Reference::Normal,
        }
    }
}

impl LogLikelihood for PoissonModel {
    type Data = CountData;

    /// `ℓ(θ) = Σ yᵢηᵢ − exp(ηᵢ) − ln Γ(yᵢ + 1)`.
    fn value(&self, theta: &Theta, data: &CountData) -> OptResult<Cost> {
        let eta = data.linear_predictor(theta);
        let llf = eta
            .iter()
            .zip(data.endog.iter())
            .zip(data.ln_factorial.iter())
            .map(|((&e, &y), &lf)| y * e - mean_from_eta(e) - lf)
            .sum();
        Ok(llf)
    }

    fn check(&self, theta: &Theta, data: &CountData) -> OptResult<()> {
        let expected = data.exog.ncols();
        if theta.len() != expected {
            return Err(OptError::ThetaLengthMismatch { expected, actual: theta.len() });
        }
        match theta.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(OptError::InvalidThetaInput { index, value: theta[index] }),
            None => Ok(()),
        }
    }

    fn grad(&self, theta: &Theta, _data: &CountData) -> OptResult<Grad> {
        Ok(self.score(theta))
    }
}

impl ConstrainedModel for PoissonModel {
    type InitOptions = ();
    type FitOptions = MLEOptions;
    type Results = RegressionResults;
    type Error = ConstraintError;

    fn endog(&self) -> ArrayView1<'_, f64> {
        self.data.endog.view()
    }

    fn exog(&self) -> ArrayView2<'_, f64> {
        self.data.exog.view()
    }

    fn offset(&self) -> Option<ArrayView1<'_, f64>> {
        self.data.offset.as_ref().map(|o| o.view())
    }

    fn init_options(&self) -> Self::InitOptions {}

    fn from_parts(
        endog: Array1<f64>, exog: Array2<f64>, offset: Option<Array1<f64>>, _init: (),
    ) -> ConstraintResult<Self> {
        PoissonModel::new(endog, exog, offset)
    }

    fn fit(
        &self, start_params: Option<ArrayView1<'_, f64>>, options: &MLEOptions,
    ) -> ConstraintResult<RegressionResults> {
        self.fit_mle(start_params, options)
    }
}

// ---- Helper methods ----

fn mean_from_eta(eta: f64) -> f64 {
    eta.min(ETA_MAX).exp()
}
