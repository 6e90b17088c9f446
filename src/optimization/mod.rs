//! optimization: maximum-likelihood fitting and its error surface.
//!
//! Iterative models (the Poisson model in `models`) implement
//! `loglik_optimizer::LogLikelihood` and are fitted through
//! `loglik_optimizer::maximize`. Configuration problems, derivative failures,
//! and argmin backend errors all surface as [`errors::OptError`].
//!
//! The optimizer knows nothing about constraints: constrained fits hand it a
//! reduced model whose parameters are unrestricted.

pub mod errors;
pub mod loglik_optimizer;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
}
