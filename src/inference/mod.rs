//! inference: post-estimation covariance for likelihood-based models.
//!
//! Purpose
//! -------
//! Supply parameter covariance and standard errors for models fitted by
//! maximum likelihood, where no closed-form covariance is available.
//!
//! Key behaviors
//! -------------
//! - [`calc_covariance`]: pseudo-inverse of the finite-difference observed
//!   information at the estimate.
//! - [`standard_errors`]: square roots of a covariance diagonal.
//!
//! Downstream usage
//! ----------------
//! - `models::PoissonModel` calls [`calc_covariance`] with its analytic
//!   negative score after `maximize` returns.
//! - `models::RegressionResults` and the constrained fit orchestrator use
//!   [`standard_errors`] on reduced and expanded covariances alike.

pub mod hessian;

pub use self::hessian::{calc_covariance, standard_errors};

pub mod prelude {
    pub use super::hessian::{calc_covariance, standard_errors};
}
