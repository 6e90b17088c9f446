//! Capability interface for models that can be fitted under constraints.
//!
//! A model qualifies if it exposes its data, can rebuild itself around a
//! different design matrix and offset, and can fit itself. Nothing is
//! registered anywhere; [`fit_constrained`](super::fit_constrained) is generic
//! over this trait.
use crate::constraints::ConstraintError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Fitted-model output consumed by the orchestrator.
pub trait FitResults {
    /// Estimated parameters, one per design column.
    fn params(&self) -> ArrayView1<'_, f64>;

    /// Parameter covariance, `k × k` for `k = params().len()`.
    fn cov_params(&self) -> Array2<f64>;
}

/// ConstrainedModel: what a regression model must provide to be fitted
/// under `R·θ = q` by re-parameterization.
///
/// Associated types
/// ----------------
/// - `InitOptions`: every construction setting except data and offset; it
///   is cloned verbatim into the reduced model.
/// - `FitOptions`: forwarded unchanged to [`fit`](Self::fit).
/// - `Results`: fitted output exposing params and covariance.
/// - `Error`: the model's error type. Constraint failures convert into it so
///   one `Result` covers the whole pipeline.
///
/// Contract
/// --------
/// - The parameter count equals `exog().ncols()`. Models with auxiliary
///   parameters outside the linear predictor are not supported.
/// - `from_parts` must produce a model of the same kind that differs only
///   in its design and offset.
/// - `fit` must not mutate `self`.
pub trait ConstrainedModel: Sized {
    type InitOptions: Clone;
    type FitOptions;
    type Results: FitResults;
    type Error: From<ConstraintError>;

    fn endog(&self) -> ArrayView1<'_, f64>;

    fn exog(&self) -> ArrayView2<'_, f64>;

    /// Additive term in the linear predictor; `None` means zero.
    fn offset(&self) -> Option<ArrayView1<'_, f64>> {
        None
    }

    fn init_options(&self) -> Self::InitOptions;

    fn from_parts(
        endog: Array1<f64>, exog: Array2<f64>, offset: Option<Array1<f64>>,
        init_options: Self::InitOptions,
    ) -> Result<Self, Self::Error>;

    fn fit(
        &self, start_params: Option<ArrayView1<'_, f64>>, options: &Self::FitOptions,
    ) -> Result<Self::Results, Self::Error>;
}
