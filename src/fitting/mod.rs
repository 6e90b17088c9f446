//! fitting: constrained estimation for any model implementing
//! [`ConstrainedModel`].
//!
//! Purpose
//! -------
//! Fit regression models under linear equality constraints `R·θ = q` by
//! absorbing the constraint into the design matrix, so that the model's own
//! unconstrained fitting routine can be reused as is.
//!
//! Key behaviors
//! -------------
//! - [`ConstrainedModel`] / [`FitResults`]: the explicit capability
//!   interface a model implements (data access, rebuild, fit).
//! - [`fit_constrained`]: `(params, ParamSpread, reduced results)`.
//! - [`fit_constrained_results`] / [`fit_with_transform`]: the same fit
//!   returning a [`ConstrainedFit`] with covariance, standard errors, and the
//!   transform.
//!
//! Downstream usage
//! ----------------
//! - `models::LinearModel` and `models::PoissonModel` implement the trait.
//! - The Python bindings expose one constrained-fit function per model.

pub mod orchestrator;
pub mod traits;

pub use self::orchestrator::{
    ConstrainedFit, ParamSpread, fit_constrained, fit_constrained_results, fit_with_transform,
};
pub use self::traits::{ConstrainedModel, FitResults};

pub mod prelude {
    pub use super::orchestrator::{
        ConstrainedFit, ParamSpread, fit_constrained, fit_constrained_results,
    };
    pub use super::traits::{ConstrainedModel, FitResults};
}
