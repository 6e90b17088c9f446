//! loglik_optimizer: argmin-backed maximization of log-likelihoods.
//!
//! Purpose
//! -------
//! Fit iterative models by maximum likelihood. A model implements
//! [`LogLikelihood`] and calls [`maximize`] with a starting point, its data,
//! and [`MLEOptions`]; the solver details stay behind this module.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] presents `c(θ) = −ℓ(θ)` to argmin, negating
//!   analytic gradients and finite-differencing the cost when none exist.
//! - [`builders`] construct L-BFGS with More–Thuente or Hager–Zhang line
//!   search; [`run::run_lbfgs`] executes it and validates the outcome.
//! - [`finite_diff`] supplies validated finite-difference gradients and
//!   Hessians; the latter also feed covariance estimation in `inference`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Models report invalid input as [`OptError`](crate::optimization::errors::OptError)
//!   values, never panics.
//! - [`OptimOutcome::value`] is always `ℓ(θ̂)`, not the cost.
//!
//! Conventions
//! -----------
//! - In constrained fits, `θ` here is the reduced parameter vector; the
//!   optimizer never sees the constraint.
//!
//! Testing notes
//! -------------
//! - Submodules test their own wiring on toy objectives; the Poisson model
//!   and the integration tests exercise full runs.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
