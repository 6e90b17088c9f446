//! models::linear: ordinary least squares with an optional offset.
//!
//! Purpose
//! -------
//! Closed-form reference model for constrained fitting. The estimate solves
//! the normal equations on `y − offset`; its covariance is
//! `σ²·(XᵀX)⁺`.
//!
//! Key behaviors
//! -------------
//! - [`LinearModel::new`] validates shapes and finiteness once; fits never
//!   re-check the data.
//! - [`LinearModel::fit_ols`] computes `β̂ = (XᵀX)⁺ Xᵀ(y − offset)`, the
//!   residual variance `SSR / (n − k)` (or a caller-fixed scale), and the
//!   Gaussian log-likelihood.
//! - Implements [`ConstrainedModel`], so `fit_constrained` can rebuild it on
//!   a reduced design.
//!
//! Invariants & assumptions
//! ------------------------
//! - `exog` is `n × k` with `n = endog.len()`; `k = 0` is allowed and gives
//!   an empty estimate.
//! - A rank-deficient design is handled by the pseudo-inverse: the estimate
//!   is the minimum-norm solution and unidentified directions get zero
//!   variance.
//!
//! Conventions
//! -----------
//! - Start values are accepted for interface compatibility and ignored.
use crate::{
    constraints::{
        errors::{ConstraintError, ConstraintResult},
        validation::{check_finite_mat, check_finite_vec, check_len},
    },
    fitting::traits::ConstrainedModel,
    linalg::pinv_symmetric,
    models::results::{Reference, RegressionResults},
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::f64::consts::PI;

/// Fit options for [`LinearModel`].
///
/// - `fixed_scale`: when set, used as `σ²` instead of the residual variance,
///   and p-values switch to the normal reference. Only settable through
///   [`LinearFitOptions::new`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinearFitOptions {
    fixed_scale: Option<f64>,
}

impl LinearFitOptions {
    /// # Errors
    /// [`ConstraintError::InvalidOption`] if `fixed_scale` is non-finite or
    /// not strictly positive.
    pub fn new(fixed_scale: Option<f64>) -> ConstraintResult<Self> {
        if let Some(value) = fixed_scale {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConstraintError::InvalidOption {
                    name: "fixed_scale",
                    value,
                    reason: "Scale must be finite and positive.",
                });
            }
        }
        Ok(Self { fixed_scale })
    }

    pub fn fixed_scale(&self) -> Option<f64> {
        self.fixed_scale
    }
}

/// Linear regression `y = Xβ + offset + ε`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    endog: Array1<f64>,
    exog: Array2<f64>,
    offset: Option<Array1<f64>>,
}

impl LinearModel {
    /// Build a model from response, design, and optional offset.
    ///
    /// # Errors
    /// - [`ConstraintError::DimensionMismatch`] if `exog` rows or `offset`
    ///   length differ from `endog.len()`.
    /// - [`ConstraintError::NonFiniteInput`] for NaN or ±inf anywhere.
    pub fn new(
        endog: Array1<f64>, exog: Array2<f64>, offset: Option<Array1<f64>>,
    ) -> ConstraintResult<Self> {
        check_len("exog rows", endog.len(), exog.nrows())?;
        check_finite_vec("endog", endog.view())?;
        check_finite_mat("exog", exog.view())?;
        if let Some(offset) = &offset {
            check_len("offset", endog.len(), offset.len())?;
            check_finite_vec("offset", offset.view())?;
        }
        Ok(Self { endog, exog, offset })
    }

    pub fn nobs(&self) -> usize {
        self.endog.len()
    }

    /// fit_ols: least-squares estimate with covariance and log-likelihood.
    ///
    /// Returns
    /// -------
    /// [`RegressionResults`] with `scale = SSR / df_resid` (or the fixed
    /// scale), `cov_params = scale · (XᵀX)⁺`, and
    /// `llf = −n/2 · (ln(2π·SSR/n) + 1)`. With `df_resid = 0` and no fixed
    /// scale the scale is `NaN`. A perfect fit (`SSR = 0`) gives
    /// `llf = +inf`; both cases are logged at `warn` level.
    ///
    /// # Errors
    /// [`ConstraintError::Linalg`] if the eigendecomposition of `XᵀX` fails.
    pub fn fit_ols(&self, options: &LinearFitOptions) -> ConstraintResult<RegressionResults> {
        let n = self.nobs();
        let k = self.exog.ncols();
        let y = self.adjusted_endog();

        let xtx = self.exog.t().dot(&self.exog);
        let xtx_pinv = pinv_symmetric(xtx.view())?;
        let params = xtx_pinv.dot(&self.exog.t().dot(&y));

        let resid = &y - &self.exog.dot(&params);
        let ssr = resid.dot(&resid);
        let df_resid = n as f64 - k as f64;
        let (scale, reference) = match options.fixed_scale {
            Some(fixed) => (fixed, Reference::Normal),
            None if df_resid > 0.0 => (ssr / df_resid, Reference::StudentT),
            None => {
                log::warn!("OLS fit without residual degrees of freedom (n = {n}, k = {k})");
                (f64::NAN, Reference::StudentT)
            }
        };
        if ssr == 0.0 && n > 0 {
            log::warn!("OLS fit has zero residual sum of squares; log-likelihood is +inf");
        }
        let nobs = n as f64;
        let llf = -0.5 * nobs * ((2.0 * PI * ssr / nobs).ln() + 1.0);

        Ok(RegressionResults {
            params,
            cov_params: xtx_pinv * scale,
            nobs: n,
            df_resid,
            scale,
            llf,
            optim: None,
            reference,
        })
    }

    fn adjusted_endog(&self) -> Array1<f64> {
        match &self.offset {
            Some(offset) => &self.endog - offset,
            None => self.endog.clone(),
        }
    }
}

impl ConstrainedModel for LinearModel {
    type InitOptions = ();
    type FitOptions = LinearFitOptions;
    type Results = RegressionResults;
    type Error = ConstraintError;

    fn endog(&self) -> ArrayView1<'_, f64> {
        self.endog.view()
    }

    fn exog(&self) -> ArrayView2<'_, f64> {
        self.exog.view()
    }

    fn offset(&self) -> Option<ArrayView1<'_, f64>> {
        self.offset.as_ref().map(|o| o.view())
    }

    fn init_options(&self) -> Self::InitOptions {}

    fn from_parts(
        endog: Array1<f64>, exog: Array2<f64>, offset: Option<Array1<f64>>, _init: (),
    ) -> ConstraintResult<Self> {
        LinearModel::new(endog, exog, offset)
    }

    fn fit(
        &self, _start_params: Option<ArrayView1<'_, f64>>, options: &LinearFitOptions,
    ) -> ConstraintResult<RegressionResults> {
        self.fit_ols(options)
    }
}
