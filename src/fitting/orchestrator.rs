//! fitting::orchestrator: fit a model under `R·θ = q` by re-parameterization.
//!
//! Purpose
//! -------
//! Fit any [`ConstrainedModel`] subject to linear equality constraints
//! without the model knowing about them. The constraint is absorbed into the
//! design: the model is rebuilt on `X·T` with offset `X·c`, fitted freely in
//! the reduced space, and its estimates are mapped back.
//!
//! Key behaviors
//! -------------
//! - Build (or reuse) a [`TransformRestriction`] for `(R, q)`.
//! - Reduce the design, compose the offset additively with any offset the
//!   model already carries, and reduce optional start values.
//! - Construct exactly one reduced model through
//!   [`ConstrainedModel::from_parts`] and call its `fit` exactly once.
//! - Expand `θ = T·y + c` and `Σ = T·C·Tᵀ`; standard errors are
//!   `sqrt(diag Σ)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The caller's model is never mutated; the reduced model is a new value.
//! - Every returned parameter vector satisfies the constraint to solver
//!   precision, regardless of the data.
//! - Directions fixed by the constraint carry zero variance in `Σ`.
//!
//! Conventions
//! -----------
//! - Failures are reported in the model's own error type; constraint errors
//!   convert into it, model errors pass through unchanged.
//!
//! Testing notes
//! -------------
//! - Unit tests use a recording mock model to check what the reduced model
//!   receives and how its output is expanded. Real models are covered by the
//!   integration tests.
use crate::{
    constraints::{
        errors::ConstraintResult,
        transform::TransformRestriction,
        validation::check_len,
    },
    fitting::traits::{ConstrainedModel, FitResults},
    inference::standard_errors,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Spread of the constrained estimate, selected by `return_cov`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSpread {
    /// `sqrt(diag Σ)`, one entry per full-space parameter.
    StdErrors(Array1<f64>),
    /// Full `k_vars × k_vars` covariance `Σ`.
    Covariance(Array2<f64>),
}

/// Full output of a constrained fit.
///
/// - `params`: full-space estimate, satisfies `R·θ = q`.
/// - `cov_params`: `T·C·Tᵀ`, singular along the constrained directions.
/// - `bse`: `sqrt(diag cov_params)`.
/// - `transform`: the re-parameterization used.
/// - `reduced`: the reduced model's own results, in reduced coordinates.
#[derive(Debug, Clone)]
pub struct ConstrainedFit<R> {
    pub params: Array1<f64>,
    pub cov_params: Array2<f64>,
    pub bse: Array1<f64>,
    pub transform: TransformRestriction,
    pub reduced: R,
}

impl<R> ConstrainedFit<R> {
    /// Split into `(params, spread, reduced)` as returned by [`fit_constrained`].
    pub fn into_parts(self, return_cov: bool) -> (Array1<f64>, ParamSpread, R) {
        let spread = if return_cov {
            ParamSpread::Covariance(self.cov_params)
        } else {
            ParamSpread::StdErrors(self.bse)
        };
        (self.params, spread, self.reduced)
    }
}

/// fit_constrained: fit `model` subject to `R·θ = q`.
///
/// Parameters
/// ----------
/// - `model`: `&M`
///   Template model; its data and construction options are reused.
/// - `r`: `ArrayView2<f64>`
///   `k_constr × k_vars` constraint matrix, `k_vars = model.exog().ncols()`.
/// - `q`: `Option<ArrayView1<f64>>`
///   Constraint values; `None` means `R·θ = 0`.
/// - `start_params`: `Option<ArrayView1<f64>>`
///   Full-space start values, reduced before being handed to the model.
/// - `fit_options`: `&M::FitOptions`
///   Forwarded unchanged to the reduced model's `fit`.
/// - `return_cov`: `bool`
///   Return the covariance instead of standard errors.
///
/// Returns
/// -------
/// `Result<(Array1<f64>, ParamSpread, M::Results), M::Error>`
///   Full-space parameters, their spread, and the reduced model's results.
///
/// Errors
/// ------
/// - Any [`ConstraintError`] from building the transform or from shape
///   checks, converted into `M::Error`.
/// - Any error from `M::from_parts` or `M::fit`, unchanged.
///
/// [`ConstraintError`]: crate::constraints::ConstraintError
pub fn fit_constrained<M: ConstrainedModel>(
    model: &M, r: ArrayView2<'_, f64>, q: Option<ArrayView1<'_, f64>>,
    start_params: Option<ArrayView1<'_, f64>>, fit_options: &M::FitOptions, return_cov: bool,
) -> Result<(Array1<f64>, ParamSpread, M::Results), M::Error> {
    Ok(fit_constrained_results(model, r, q, start_params, fit_options)?.into_parts(return_cov))
}

/// Like [`fit_constrained`], returning the full [`ConstrainedFit`].
///
/// # Errors
/// See [`fit_constrained`].
pub fn fit_constrained_results<M: ConstrainedModel>(
    model: &M, r: ArrayView2<'_, f64>, q: Option<ArrayView1<'_, f64>>,
    start_params: Option<ArrayView1<'_, f64>>, fit_options: &M::FitOptions,
) -> Result<ConstrainedFit<M::Results>, M::Error> {
    let transform = TransformRestriction::new(r, q)?;
    fit_with_transform(model, transform, start_params, fit_options)
}

/// fit_with_transform: constrained fit with a prebuilt transform.
///
/// Use this to build the transform with non-default
/// [`RestrictionOptions`](crate::constraints::RestrictionOptions), or to fit
/// several models under the same constraint.
///
/// # Errors
/// - `ConstraintError::DimensionMismatch` if the design width, an existing
///   offset, start values, or the reduced results do not conform.
/// - Model construction and fit errors, unchanged.
pub fn fit_with_transform<M: ConstrainedModel>(
    model: &M, transform: TransformRestriction, start_params: Option<ArrayView1<'_, f64>>,
    fit_options: &M::FitOptions,
) -> Result<ConstrainedFit<M::Results>, M::Error> {
    let reduced_model = build_reduced_model(model, &transform, start_params.is_some())?;
    let start_reduced = start_params.map(|s| transform.reduce(s)).transpose()?;

    let reduced = reduced_model.fit(start_reduced.as_ref().map(|s| s.view()), fit_options)?;

    let (params, cov_params) = expand_results(&transform, &reduced)?;
    let bse = standard_errors(cov_params.view());
    Ok(ConstrainedFit { params, cov_params, bse, transform, reduced })
}

// ---- Helper methods ----

fn build_reduced_model<M: ConstrainedModel>(
    model: &M, transform: &TransformRestriction, has_start: bool,
) -> Result<M, M::Error> {
    let exog = model.exog();
    check_len("exog columns", transform.k_vars(), exog.ncols())?;
    let exog_reduced = transform.reduce_rows(exog)?;

    let mut offset = exog.dot(&transform.constant());
    if let Some(existing) = model.offset() {
        check_len("offset", exog.nrows(), existing.len())?;
        offset += &existing;
    }

    log::debug!(
        "constrained fit: nobs = {}, k_vars = {} -> k_unconstr = {}, start values = {}",
        exog.nrows(),
        transform.k_vars(),
        transform.k_unconstr(),
        has_start
    );
    M::from_parts(model.endog().to_owned(), exog_reduced, Some(offset), model.init_options())
}

fn expand_results<R: FitResults>(
    transform: &TransformRestriction, reduced: &R,
) -> ConstraintResult<(Array1<f64>, Array2<f64>)> {
    let k_unconstr = transform.k_unconstr();
    let params = transform.expand(reduced.params())?;

    let cov_reduced = reduced.cov_params();
    check_len("reduced covariance rows", k_unconstr, cov_reduced.nrows())?;
    check_len("reduced covariance columns", k_unconstr, cov_reduced.ncols())?;
    let t = transform.transf_mat();
    let cov_params = t.dot(&cov_reduced).dot(&t.t());
    Ok((params, cov_params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintError;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use std::cell::Cell;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - What the reduced model receives: design, composed offset, options,
    //   start values.
    // - Expansion of params and covariance back to the full space.
    // - Error propagation from the transform and from the model.
    //
    // They intentionally DO NOT cover:
    // - Statistical accuracy of real models (see tests/).
    // -------------------------------------------------------------------------

    #[derive(Debug, Clone, PartialEq)]
    enum MockError {
        Constraint(ConstraintError),
        FitRefused,
    }

    impl From<ConstraintError> for MockError {
        fn from(err: ConstraintError) -> Self {
            MockError::Constraint(err)
        }
    }

    #[derive(Debug, Clone)]
    struct MockInit {
        tag: &'static str,
    }

    // Records its construction inputs; "fits" by returning fixed values.
    struct MockModel<'c> {
        endog: Array1<f64>,
        exog: Array2<f64>,
        offset: Option<Array1<f64>>,
        init: MockInit,
        fit_calls: Option<&'c Cell<usize>>,
    }

    #[derive(Debug)]
    struct MockResults {
        params: Array1<f64>,
        cov: Array2<f64>,
        seen_exog: Array2<f64>,
        seen_offset: Option<Array1<f64>>,
        seen_start: Option<Array1<f64>>,
        seen_tag: &'static str,
    }

    impl FitResults for MockResults {
        fn params(&self) -> ArrayView1<'_, f64> {
            self.params.view()
        }
        fn cov_params(&self) -> Array2<f64> {
            self.cov.clone()
        }
    }

    struct MockFitOptions {
        refuse: bool,
    }

    impl<'c> ConstrainedModel for MockModel<'c> {
        type InitOptions = (MockInit, Option<&'c Cell<usize>>);
        type FitOptions = MockFitOptions;
        type Results = MockResults;
        type Error = MockError;

        fn endog(&self) -> ArrayView1<'_, f64> {
            self.endog.view()
        }
        fn exog(&self) -> ArrayView2<'_, f64> {
            self.exog.view()
        }
        fn offset(&self) -> Option<ArrayView1<'_, f64>> {
            self.offset.as_ref().map(|o| o.view())
        }
        fn init_options(&self) -> Self::InitOptions {
            (self.init.clone(), self.fit_calls)
        }
        fn from_parts(
            endog: Array1<f64>, exog: Array2<f64>, offset: Option<Array1<f64>>,
            init_options: Self::InitOptions,
        ) -> Result<Self, Self::Error> {
            let (init, fit_calls) = init_options;
            Ok(Self { endog, exog, offset, init, fit_calls })
        }
        fn fit(
            &self, start_params: Option<ArrayView1<'_, f64>>, options: &MockFitOptions,
        ) -> Result<MockResults, MockError> {
            if let Some(calls) = self.fit_calls {
                calls.set(calls.get() + 1);
            }
            if options.refuse {
                return Err(MockError::FitRefused);
            }
            let k = self.exog.ncols();
            Ok(MockResults {
                params: Array1::from_elem(k, 0.5),
                cov: Array2::eye(k) * 4.0,
                seen_exog: self.exog.clone(),
                seen_offset: self.offset.clone(),
                seen_start: start_params.map(|s| s.to_owned()),
                seen_tag: self.init.tag,
            })
        }
    }

    fn mock<'c>(offset: Option<Array1<f64>>, fit_calls: Option<&'c Cell<usize>>) -> MockModel<'c> {
        MockModel {
            endog: array![1.0, 2.0, 3.0, 4.0],
            exog: array![[1.0, 0.0, 2.0], [1.0, 1.0, 0.0], [1.0, 2.0, 1.0], [1.0, 3.0, 3.0]],
            offset,
            init: MockInit { tag: "template" },
            fit_calls,
        }
    }

    #[test]
    // Purpose
    // -------
    // The reduced model sees X·T as its design, X·c plus the existing offset
    // as its offset, and the template's init options.
    //
    // Given
    // -----
    // - Constraint b0 = 1 on a 3-column design.
    // - Template offset [0.1, 0.2, 0.3, 0.4].
    //
    // Expect
    // ------
    // - Reduced design is 4 × 2 and equals transform.reduce_rows(X).
    // - Offset equals X·c + existing = 1 + existing (first column is ones).
    // - Init tag carried over.
    fn reduced_model_receives_reduced_design_and_composed_offset() {
        // Arrange
        let existing = array![0.1, 0.2, 0.3, 0.4];
        let model = mock(Some(existing.clone()), None);
        let r = array![[1.0, 0.0, 0.0]];
        let q = array![1.0];

        // Act
        let fit = fit_constrained_results(
            &model,
            r.view(),
            Some(q.view()),
            None,
            &MockFitOptions { refuse: false },
        )
        .unwrap();

        // Assert
        let expected_exog = fit.transform.reduce_rows(model.exog.view()).unwrap();
        assert_eq!(fit.reduced.seen_exog, expected_exog);
        let offset = fit.reduced.seen_offset.as_ref().unwrap();
        for (o, e) in offset.iter().zip(existing.iter()) {
            assert_abs_diff_eq!(*o, 1.0 + e, epsilon = 1e-12);
        }
        assert_eq!(fit.reduced.seen_tag, "template");
        assert!(fit.reduced.seen_start.is_none());
    }

    #[test]
    // Purpose
    // -------
    // Params and covariance are expanded through the transform, and the
    // constrained coordinate has zero variance.
    fn results_are_expanded_to_full_space() {
        let model = mock(None, None);
        let r = array![[1.0, 0.0, 0.0]];
        let q = array![1.0];

        let fit = fit_constrained_results(
            &model,
            r.view(),
            Some(q.view()),
            None,
            &MockFitOptions { refuse: false },
        )
        .unwrap();

        let expected = fit.transform.expand(array![0.5, 0.5].view()).unwrap();
        assert_eq!(fit.params, expected);
        assert_abs_diff_eq!(fit.params[0], 1.0, epsilon = 1e-12);
        assert_eq!(fit.cov_params.dim(), (3, 3));
        assert_abs_diff_eq!(fit.bse[0], 0.0, epsilon = 1e-7);
        // T Tᵀ projects onto coordinates 1 and 2, so their variance is 4.
        assert_abs_diff_eq!(fit.cov_params[[1, 1]], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.cov_params[[2, 2]], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.bse[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Start values are reduced and `return_cov` selects the spread variant.
    fn start_values_are_reduced_and_spread_follows_return_cov() {
        let model = mock(None, None);
        let r = array![[1.0, 1.0, 0.0]];
        let start = array![1.0, -1.0, 2.0];
        let opts = MockFitOptions { refuse: false };

        let (params, spread, reduced) =
            fit_constrained(&model, r.view(), None, Some(start.view()), &opts, true).unwrap();

        assert_eq!(params.len(), 3);
        assert!(matches!(spread, ParamSpread::Covariance(ref c) if c.dim() == (3, 3)));
        let transform = TransformRestriction::new(r.view(), None).unwrap();
        assert_eq!(reduced.seen_start.unwrap(), transform.reduce(start.view()).unwrap());

        let (_, spread, _) =
            fit_constrained(&model, r.view(), None, None, &opts, false).unwrap();
        assert!(matches!(spread, ParamSpread::StdErrors(ref s) if s.len() == 3));
    }

    #[test]
    // Purpose
    // -------
    // Exactly one fit call happens per constrained fit, and the template
    // model is left untouched.
    fn one_fit_call_and_template_unchanged() {
        let calls = Cell::new(0);
        let model = mock(None, Some(&calls));
        let exog_before = model.exog.clone();

        fit_constrained(
            &model,
            array![[0.0, 1.0, -1.0]].view(),
            None,
            None,
            &MockFitOptions { refuse: false },
            false,
        )
        .unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(model.exog, exog_before);
        assert!(model.offset.is_none());
    }

    #[test]
    fn transform_errors_convert_into_model_error() {
        let model = mock(None, None);
        let r = array![[1.0, 1.0, 0.0], [2.0, 2.0, 0.0]];
        let q = array![0.0, 1.0];

        let err = fit_constrained(
            &model,
            r.view(),
            Some(q.view()),
            None,
            &MockFitOptions { refuse: false },
            false,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            MockError::Constraint(ConstraintError::InconsistentConstraints { .. })
        ));
    }

    #[test]
    fn width_mismatch_between_design_and_constraint_is_reported() {
        let model = mock(None, None);

        let err = fit_constrained(
            &model,
            array![[1.0, 1.0]].view(),
            None,
            None,
            &MockFitOptions { refuse: false },
            false,
        )
        .unwrap_err();

        assert_eq!(
            err,
            MockError::Constraint(ConstraintError::DimensionMismatch {
                what: "exog columns",
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn model_fit_errors_pass_through_unchanged() {
        let model = mock(None, None);

        let err = fit_constrained(
            &model,
            array![[1.0, 0.0, 0.0]].view(),
            None,
            None,
            &MockFitOptions { refuse: true },
            false,
        )
        .unwrap_err();

        assert_eq!(err, MockError::FitRefused);
    }
}
