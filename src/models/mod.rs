//! models: reference regression models for constrained fitting.
//!
//! Purpose
//! -------
//! Provide two concrete [`ConstrainedModel`](crate::fitting::ConstrainedModel)
//! implementations, one closed-form and one iterative, so the constrained
//! pipeline can be used and tested end to end.
//!
//! Key behaviors
//! -------------
//! - [`LinearModel`]: ordinary least squares with offset and optional fixed
//!   scale.
//! - [`PoissonModel`]: log-link Poisson regression fitted with the L-BFGS
//!   optimizer; covariance from the observed information.
//! - [`RegressionResults`]: shared output with standard errors, test
//!   statistics, and p-values.
//!
//! Conventions
//! -----------
//! - Both models report failures as
//!   [`ConstraintError`](crate::constraints::ConstraintError), so constrained
//!   and unconstrained fits share one error type.

pub mod linear;
pub mod poisson;
pub mod results;

pub use self::linear::{LinearFitOptions, LinearModel};
pub use self::poisson::{CountData, PoissonModel};
pub use self::results::{Reference, RegressionResults};

pub mod prelude {
    pub use super::linear::{LinearFitOptions, LinearModel};
    pub use super::poisson::PoissonModel;
    pub use super::results::{Reference, RegressionResults};
}
