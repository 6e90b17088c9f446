//! rust_constrained: linear equality constrained model fitting with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! constrained estimation to Python via the `_rust_constrained` extension
//! module. Models are fitted under `R·θ = q` by re-parameterizing onto the
//! null space of `R`, so the models themselves never see the constraint.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules: `constraints` (transform, closed-form
//!   projection), `fitting` (orchestration over any `ConstrainedModel`),
//!   `models` (linear and Poisson reference models), `optimization` and
//!   `inference` (maximum likelihood and its covariance), and `linalg`.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_rust_constrained` Python extension.
//! - Create and register Python submodules (`constraints`, `models`) under
//!   `rust_constrained` so that dot-notation imports work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is implemented in the inner Rust modules; this file
//!   performs only FFI glue, input conversion, and error mapping.
//! - A flat `R` passed from Python is read as a single constraint row.
//!
//! Conventions
//! -----------
//! - Errors from core Rust code are propagated as [`ConstraintError`]
//!   internally and converted to Python `ValueError` at the PyO3 boundary.
//! - Matrices are returned to Python as row-major lists of lists.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend directly on the inner modules and can
//!   ignore the PyO3 items guarded by the `python-bindings` feature.
//!
//! Testing notes
//! -------------
//! - Core numerical behavior is covered by unit tests in the inner modules and
//!   by the pipeline tests under `tests/`.
//!
//! [`ConstraintError`]: crate::constraints::ConstraintError

pub mod constraints;
pub mod fitting;
pub mod inference;
pub mod linalg;
pub mod models;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    constraints::{TransformRestriction, transform_params_constraint},
    fitting::{ConstrainedFit, fit_constrained_results},
    models::{LinearFitOptions, LinearModel, PoissonModel, RegressionResults},
    optimization::loglik_optimizer::OptimOutcome,
    utils::{extract_f64_matrix, extract_f64_vector, extract_mle_opts, matrix_to_rows},
};

/// PyTransformRestriction: Python-facing wrapper for [`TransformRestriction`].
///
/// Purpose
/// -------
/// Let Python code build the null-space re-parameterization for `(R, q)` and
/// map parameter vectors between the full and reduced spaces.
///
/// Parameters
/// ----------
/// Constructed from Python via `TransformRestriction(R, q=None)`:
/// - `R`: 2-D array-like, or 1-D for a single constraint row.
/// - `q`: optional 1-D array-like of length `k_constr`.
///
/// Notes
/// -----
/// - Column signs of `transf_mat` are normalized; only the spanned subspace
///   is meaningful.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "TransformRestriction", module = "rust_constrained.constraints")]
pub struct PyTransformRestriction {
    inner: TransformRestriction,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyTransformRestriction {
    #[new]
    #[pyo3(text_signature = "(R, /, q=None)", signature = (r, q = None))]
    pub fn new<'py>(
        py: Python<'py>, r: &Bound<'py, PyAny>, q: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<Self> {
        let r = extract_f64_matrix(py, r, "R")?;
        let q = q.map(|q| extract_f64_vector(py, q, "q")).transpose()?;
        let inner = TransformRestriction::new(r.view(), q.as_ref().map(|q| q.view()))?;
        Ok(Self { inner })
    }

    #[getter]
    pub fn k_constr(&self) -> usize {
        self.inner.k_constr()
    }

    #[getter]
    pub fn k_vars(&self) -> usize {
        self.inner.k_vars()
    }

    #[getter]
    pub fn k_unconstr(&self) -> usize {
        self.inner.k_unconstr()
    }

    #[getter]
    pub fn transf_mat(&self) -> Vec<Vec<f64>> {
        matrix_to_rows(&self.inner.transf_mat().to_owned())
    }

    #[getter]
    pub fn complement(&self) -> Vec<Vec<f64>> {
        matrix_to_rows(&self.inner.complement().to_owned())
    }

    #[getter]
    pub fn constant(&self) -> Vec<f64> {
        self.inner.constant().to_vec()
    }

    /// Map reduced parameters to the full space: `T·y + c`.
    #[pyo3(text_signature = "(self, params_reduced, /)")]
    pub fn expand<'py>(
        &self, py: Python<'py>, params_reduced: &Bound<'py, PyAny>,
    ) -> PyResult<Vec<f64>> {
        let y = extract_f64_vector(py, params_reduced, "params_reduced")?;
        Ok(self.inner.expand(y.view())?.to_vec())
    }

    /// Row-wise [`expand`](Self::expand) for a batch of reduced vectors.
    #[pyo3(text_signature = "(self, params_reduced, /)")]
    pub fn expand_rows<'py>(
        &self, py: Python<'py>, params_reduced: &Bound<'py, PyAny>,
    ) -> PyResult<Vec<Vec<f64>>> {
        let y = extract_f64_matrix(py, params_reduced, "params_reduced")?;
        Ok(matrix_to_rows(&self.inner.expand_rows(y.view())?))
    }

    /// Project full parameters onto the reduced space: `Tᵀ·θ`.
    #[pyo3(text_signature = "(self, params, /)")]
    pub fn reduce<'py>(&self, py: Python<'py>, params: &Bound<'py, PyAny>) -> PyResult<Vec<f64>> {
        let theta = extract_f64_vector(py, params, "params")?;
        Ok(self.inner.reduce(theta.view())?.to_vec())
    }

    /// Row-wise [`reduce`](Self::reduce); a design matrix maps to `X·T`.
    #[pyo3(text_signature = "(self, params, /)")]
    pub fn reduce_rows<'py>(
        &self, py: Python<'py>, params: &Bound<'py, PyAny>,
    ) -> PyResult<Vec<Vec<f64>>> {
        let theta = extract_f64_matrix(py, params, "params")?;
        Ok(matrix_to_rows(&self.inner.reduce_rows(theta.view())?))
    }
}

/// PyConstrainedFit: result of a constrained fit, as seen from Python.
///
/// Fields
/// ------
/// - `params`, `bse`, `cov_params`: full-space estimate and its spread.
/// - `reduced_params`, `reduced_bse`: the reduced model's own estimate.
/// - `llf`, `nobs`, `df_resid`, `scale`: reduced-fit summary.
/// - `optim`: optimizer outcome for iteratively fitted models, else `None`.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "ConstrainedFit", module = "rust_constrained.models")]
pub struct PyConstrainedFit {
    inner: ConstrainedFit<RegressionResults>,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyConstrainedFit {
    #[getter]
    pub fn params(&self) -> Vec<f64> {
        self.inner.params.to_vec()
    }

    #[getter]
    pub fn bse(&self) -> Vec<f64> {
        self.inner.bse.to_vec()
    }

    #[getter]
    pub fn cov_params(&self) -> Vec<Vec<f64>> {
        matrix_to_rows(&self.inner.cov_params)
    }

    #[getter]
    pub fn reduced_params(&self) -> Vec<f64> {
        self.inner.reduced.params.to_vec()
    }

    #[getter]
    pub fn reduced_bse(&self) -> Vec<f64> {
        self.inner.reduced.bse().to_vec()
    }

    #[getter]
    pub fn reduced_pvalues(&self) -> Vec<f64> {
        self.inner.reduced.pvalues().to_vec()
    }

    #[getter]
    pub fn llf(&self) -> f64 {
        self.inner.reduced.llf
    }

    #[getter]
    pub fn nobs(&self) -> usize {
        self.inner.reduced.nobs
    }

    #[getter]
    pub fn df_resid(&self) -> f64 {
        self.inner.reduced.df_resid
    }

    #[getter]
    pub fn scale(&self) -> f64 {
        self.inner.reduced.scale
    }

    #[getter]
    pub fn optim(&self) -> Option<PyOptimOutcome> {
        self.inner.reduced.optim.clone().map(|inner| PyOptimOutcome { inner })
    }
}

/// PyOptimOutcome: read-only view of the L-BFGS outcome.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "OptimOutcome", module = "rust_constrained.models")]
pub struct PyOptimOutcome {
    pub inner: OptimOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyOptimOutcome {
    #[getter]
    pub fn theta_hat(&self) -> Vec<f64> {
        self.inner.theta_hat.to_vec()
    }

    #[getter]
    pub fn value(&self) -> f64 {
        self.inner.value
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.converged
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.status.clone()
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.iterations
    }

    #[getter]
    pub fn grad_norm(&self) -> Option<f64> {
        self.inner.grad_norm
    }

    #[getter]
    pub fn fn_evals(&self) -> Vec<(String, u64)> {
        self.inner.fn_evals.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }
}

/// Closed-form projection of `params` onto `R·x = q` under the metric
/// `weight_inv⁻¹`.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "transform_params_constraint")]
#[pyo3(text_signature = "(params, weight_inv, R, q, /)")]
pub fn py_transform_params_constraint<'py>(
    py: Python<'py>, params: &Bound<'py, PyAny>, weight_inv: &Bound<'py, PyAny>,
    r: &Bound<'py, PyAny>, q: &Bound<'py, PyAny>,
) -> PyResult<Vec<f64>> {
    let params = extract_f64_vector(py, params, "params")?;
    let weight_inv = extract_f64_matrix(py, weight_inv, "weight_inv")?;
    let r = extract_f64_matrix(py, r, "R")?;
    let q = extract_f64_vector(py, q, "q")?;
    Ok(transform_params_constraint(params.view(), weight_inv.view(), r.view(), q.view())?.to_vec())
}

/// Fit a linear model by OLS subject to `R·θ = q`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (endog, exog, r, q = None, offset = None, fixed_scale = None),
    text_signature = "(endog, exog, R, /, q=None, offset=None, fixed_scale=None)"
)]
pub fn fit_constrained_linear<'py>(
    py: Python<'py>, endog: &Bound<'py, PyAny>, exog: &Bound<'py, PyAny>, r: &Bound<'py, PyAny>,
    q: Option<&Bound<'py, PyAny>>, offset: Option<&Bound<'py, PyAny>>, fixed_scale: Option<f64>,
) -> PyResult<PyConstrainedFit> {
    let endog = extract_f64_vector(py, endog, "endog")?;
    let exog = extract_f64_matrix(py, exog, "exog")?;
    let r = extract_f64_matrix(py, r, "R")?;
    let q = q.map(|q| extract_f64_vector(py, q, "q")).transpose()?;
    let offset = offset.map(|o| extract_f64_vector(py, o, "offset")).transpose()?;

    let model = LinearModel::new(endog, exog, offset)?;
    let opts = LinearFitOptions::new(fixed_scale)?;
    let inner =
        fit_constrained_results(&model, r.view(), q.as_ref().map(|q| q.view()), None, &opts)?;
    Ok(PyConstrainedFit { inner })
}

/// Fit a Poisson regression by maximum likelihood subject to `R·θ = q`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[allow(clippy::too_many_arguments)]
#[pyo3(
    signature = (
        endog,
        exog,
        r,
        q = None,
        offset = None,
        start_params = None,
        tol_grad = None,
        tol_cost = None,
        max_iter = None,
        line_searcher = None,
        lbfgs_mem = None,
    ),
    text_signature = "(endog, exog, R, /, q=None, offset=None, start_params=None, \
                      tol_grad=1e-6, tol_cost=None, max_iter=300, \
                      line_searcher='MoreThuente', lbfgs_mem=None)"
)]
pub fn fit_constrained_poisson<'py>(
    py: Python<'py>, endog: &Bound<'py, PyAny>, exog: &Bound<'py, PyAny>, r: &Bound<'py, PyAny>,
    q: Option<&Bound<'py, PyAny>>, offset: Option<&Bound<'py, PyAny>>,
    start_params: Option<&Bound<'py, PyAny>>, tol_grad: Option<f64>, tol_cost: Option<f64>,
    max_iter: Option<usize>, line_searcher: Option<&str>, lbfgs_mem: Option<usize>,
) -> PyResult<PyConstrainedFit> {
    let endog = extract_f64_vector(py, endog, "endog")?;
    let exog = extract_f64_matrix(py, exog, "exog")?;
    let r = extract_f64_matrix(py, r, "R")?;
    let q = q.map(|q| extract_f64_vector(py, q, "q")).transpose()?;
    let offset = offset.map(|o| extract_f64_vector(py, o, "offset")).transpose()?;
    let start = start_params.map(|s| extract_f64_vector(py, s, "start_params")).transpose()?;
    let opts = extract_mle_opts(tol_grad, tol_cost, max_iter, line_searcher, lbfgs_mem)?;

    let model = PoissonModel::new(endog, exog, offset)?;
    let inner = fit_constrained_results(
        &model,
        r.view(),
        q.as_ref().map(|q| q.view()),
        start.as_ref().map(|s| s.view()),
        &opts,
    )?;
    Ok(PyConstrainedFit { inner })
}

/// _rust_constrained: PyO3 module initializer.
///
/// Registers the `constraints` and `models` submodules and inserts them into
/// `sys.modules` so `import rust_constrained.constraints` works.
///
/// Errors
/// ------
/// - `PyErr` if creating submodules or manipulating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_constrained<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let constraints_mod = PyModule::new(_py, "constraints")?;
    let models_mod = PyModule::new(_py, "models")?;
    constraints(_py, m, &constraints_mod)?;
    models(_py, m, &models_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_constrained.constraints", constraints_mod)?;

    _py.import("sys")?.getattr("modules")?.set_item("rust_constrained.models", models_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn constraints<'py>(
    _py: Python, rust_constrained: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PyTransformRestriction>()?;
    m.add_function(wrap_pyfunction!(py_transform_params_constraint, m)?)?;
    rust_constrained.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn models<'py>(
    _py: Python, rust_constrained: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PyConstrainedFit>()?;
    m.add_class::<PyOptimOutcome>()?;
    m.add_function(wrap_pyfunction!(fit_constrained_linear, m)?)?;
    m.add_function(wrap_pyfunction!(fit_constrained_poisson, m)?)?;
    rust_constrained.add_submodule(m)?;
    Ok(())
}
