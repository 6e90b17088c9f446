//! constraints: linear equality restrictions on parameter vectors.
//!
//! Purpose
//! -------
//! Turn a system `R·θ = q` into something a model can be fitted under. Two
//! routes are offered:
//! - [`TransformRestriction`] re-parameterizes `θ = T·y + c` so that the
//!   constraint holds for every reduced vector `y`; models are fitted in `y`.
//! - [`transform_params_constraint`] projects an already-fitted unconstrained
//!   estimate onto the constraint set in a weighted metric.
//!
//! Key behaviors
//! -------------
//! - The transform is built once, atomically, from `(R, q)` and is immutable
//!   afterwards. It can be shared by reference across fits.
//! - Structural problems with `(R, q)` are detected at construction:
//!   inconsistent targets, redundant homogeneous rows, and more rows than
//!   parameters.
//! - Shape and finiteness problems are reported before any decomposition.
//!
//! Invariants & assumptions
//! ------------------------
//! - `R` is expected to have full row rank; see [`ConstraintError`] for what
//!   happens otherwise.
//! - `R · transf_mat ≈ 0` and `R · constant ≈ q` for every transform that
//!   constructs successfully.
//!
//! Conventions
//! -----------
//! - `R` is `k_constr × k_vars`; vectors in the full space have length
//!   `k_vars`, reduced vectors have length `k_unconstr`.
//! - Batches are row-major: each row is an independent parameter vector.
//!
//! Downstream usage
//! ----------------
//! - `fitting::fit_constrained` builds a transform, reduces the model design,
//!   fits the reduced model, and expands the estimates.
//! - Direct callers can use the transform to map between spaces, or the
//!   projection for a one-shot correction of an existing estimate.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its own invariants; the full
//!   pipeline is covered in `tests/`.

pub mod errors;
pub mod options;
pub mod projection;
pub mod transform;
pub mod validation;

pub use self::errors::{ConstraintError, ConstraintResult};
pub use self::options::RestrictionOptions;
pub use self::projection::transform_params_constraint;
pub use self::transform::TransformRestriction;

pub mod prelude {
    pub use super::errors::{ConstraintError, ConstraintResult};
    pub use super::options::RestrictionOptions;
    pub use super::projection::transform_params_constraint;
    pub use super::transform::TransformRestriction;
}
