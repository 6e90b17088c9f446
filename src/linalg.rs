//! linalg: `ndarray` ↔ `nalgebra` bridge and guarded dense solvers.
//!
//! Purpose
//! -------
//! Keep every decomposition used by the crate in one place. Public APIs speak
//! `ndarray`; decompositions (SVD, symmetric eigen, LU) run on
//! `nalgebra::DMatrix`. This module copies between the two, and wraps the
//! solvers with explicit conditioning checks so that singular systems are
//! reported as [`LinalgError`] values instead of silently producing
//! `inf`/`NaN` entries.
//!
//! Key behaviors
//! -------------
//! - [`to_dmatrix`] / [`from_dmatrix`] copy dense matrices between the two
//!   containers.
//! - [`pinv`] computes the Moore–Penrose pseudo-inverse of a rectangular
//!   matrix with a rank tolerance relative to its largest singular value.
//! - [`sorted_symmetric_eigen`] returns eigenpairs of a symmetric matrix with
//!   eigenvalues in **ascending** order. `nalgebra` does not sort, so the
//!   ordering is imposed here rather than assumed.
//! - [`solve_guarded`] solves `A X = B` for square `A`, rejecting matrices
//!   whose reciprocal condition number falls below a tolerance.
//! - [`pinv_symmetric`] builds the pseudo-inverse of a symmetric PSD matrix by
//!   eigenvalue truncation.
//!
//! Conventions
//! -----------
//! - Matrices are dense and `f64`; no sparse or complex paths.
//! - Errors are reported via [`LinalgResult<T>`]; callers translate them into
//!   domain errors with context.
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView2};

/// Relative cutoff for eigenvalue truncation in [`pinv_symmetric`].
pub const EIGEN_EPS: f64 = 1e-12;

/// Result alias for guarded linear-algebra routines.
pub type LinalgResult<T> = Result<T, LinalgError>;

/// Failures raised by the dense solvers in this module.
#[derive(Debug, Clone, PartialEq)]
pub enum LinalgError {
    /// The system matrix is singular or too ill-conditioned to solve.
    Singular { rcond: f64 },

    /// `nalgebra` refused to build a pseudo-inverse.
    PseudoInverse { reason: &'static str },

    /// A solver that needs a square matrix received a rectangular one.
    NotSquare { rows: usize, cols: usize },

    /// Left- and right-hand sides do not conform.
    ShapeMismatch { lhs: (usize, usize), rhs: (usize, usize) },
}

impl std::error::Error for LinalgError {}

impl std::fmt::Display for LinalgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinalgError::Singular { rcond } => {
                write!(f, "Singular matrix: reciprocal condition number {rcond:e}")
            }
            LinalgError::PseudoInverse { reason } => {
                write!(f, "Pseudo-inverse failed: {reason}")
            }
            LinalgError::NotSquare { rows, cols } => {
                write!(f, "Expected a square matrix, found {rows}x{cols}")
            }
            LinalgError::ShapeMismatch { lhs, rhs } => {
                write!(f, "Shape mismatch: lhs {lhs:?} does not conform with rhs {rhs:?}")
            }
        }
    }
}

/// Copy an `ndarray` matrix into a freshly allocated `DMatrix`.
pub fn to_dmatrix(a: ArrayView2<'_, f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

/// Copy a `DMatrix` back into an `ndarray` matrix.
pub fn from_dmatrix(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// pinv: Moore–Penrose pseudo-inverse of a rectangular matrix.
///
/// Singular values at or below `max(rows, cols) · ε · σ_max` are treated as
/// zero, matching the usual numerical-rank convention. An all-zero input
/// yields an all-zero pseudo-inverse of transposed shape.
///
/// # Errors
/// - [`LinalgError::PseudoInverse`] if `nalgebra` rejects the decomposition
///   (e.g., the SVD did not produce singular vectors).
pub fn pinv(a: ArrayView2<'_, f64>) -> LinalgResult<Array2<f64>> {
    let (rows, cols) = a.dim();
    if rows == 0 || cols == 0 {
        return Ok(Array2::zeros((cols, rows)));
    }
    let svd = to_dmatrix(a).svd(true, true);
    let sigma_max = svd.singular_values.iter().fold(0.0_f64, |acc, &s| acc.max(s));
    let eps = sigma_max * (rows.max(cols) as f64) * f64::EPSILON;
    let inv = svd.pseudo_inverse(eps).map_err(|reason| LinalgError::PseudoInverse { reason })?;
    Ok(from_dmatrix(&inv))
}

/// sorted_symmetric_eigen: eigenpairs of a symmetric matrix, ascending.
///
/// Parameters
/// ----------
/// - `a`: `ArrayView2<f64>`
///   Square matrix treated as symmetric; only numerical symmetry is assumed,
///   no symmetrization is performed.
///
/// Returns
/// -------
/// `LinalgResult<(Array1<f64>, Array2<f64>)>`
///   Eigenvalues sorted ascending and the matching eigenvectors as columns
///   (column `k` belongs to eigenvalue `k`). Each eigenvector has unit norm.
///
/// Errors
/// ------
/// - [`LinalgError::NotSquare`] for rectangular input.
///
/// Notes
/// -----
/// - Ties keep the order produced by the decomposition (stable sort).
pub fn sorted_symmetric_eigen(a: ArrayView2<'_, f64>) -> LinalgResult<(Array1<f64>, Array2<f64>)> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(LinalgError::NotSquare { rows, cols });
    }
    if rows == 0 {
        return Ok((Array1::zeros(0), Array2::zeros((0, 0))));
    }
    let eigen = to_dmatrix(a).symmetric_eigen();
    let mut order: Vec<usize> = (0..rows).collect();
    order.sort_by(|&i, &j| eigen.eigenvalues[i].total_cmp(&eigen.eigenvalues[j]));

    let evals = Array1::from_iter(order.iter().map(|&k| eigen.eigenvalues[k]));
    let evecs = Array2::from_shape_fn((rows, rows), |(i, j)| eigen.eigenvectors[(i, order[j])]);
    Ok((evals, evecs))
}

/// reciprocal_condition: `σ_min / σ_max` of a square matrix (0 if all-zero).
pub fn reciprocal_condition(a: &DMatrix<f64>) -> f64 {
    let sv = a.singular_values();
    let max = sv.iter().fold(0.0_f64, |acc, &s| acc.max(s));
    if max == 0.0 {
        return 0.0;
    }
    let min = sv.iter().fold(f64::INFINITY, |acc, &s| acc.min(s));
    min / max
}

/// solve_guarded: solve `A X = B` with an explicit singularity check.
///
/// Purpose
/// -------
/// LU solvers only fail on exactly-zero pivots, which floating-point data
/// rarely produces. This wrapper first computes the reciprocal condition
/// number of `A` from its singular values and refuses to solve when it falls
/// below `singular_tol`.
///
/// Parameters
/// ----------
/// - `a`: `ArrayView2<f64>`, square `k × k` system matrix.
/// - `b`: `ArrayView2<f64>`, `k × m` right-hand side (one system per column).
/// - `singular_tol`: `f64`, minimum acceptable `σ_min / σ_max`.
///
/// Returns
/// -------
/// `LinalgResult<Array2<f64>>`: the `k × m` solution. A `0 × 0` system
/// returns a `0 × m` solution without touching the decomposition.
///
/// Errors
/// ------
/// - [`LinalgError::NotSquare`] if `a` is rectangular.
/// - [`LinalgError::ShapeMismatch`] if `b.nrows() != a.nrows()`.
/// - [`LinalgError::Singular`] if `A` is singular or ill-conditioned.
pub fn solve_guarded(
    a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>, singular_tol: f64,
) -> LinalgResult<Array2<f64>> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(LinalgError::NotSquare { rows, cols });
    }
    if b.nrows() != rows {
        return Err(LinalgError::ShapeMismatch { lhs: a.dim(), rhs: b.dim() });
    }
    if rows == 0 {
        return Ok(Array2::zeros((0, b.ncols())));
    }
    let a_nalg = to_dmatrix(a);
    let rcond = reciprocal_condition(&a_nalg);
    if !rcond.is_finite() || rcond < singular_tol {
        return Err(LinalgError::Singular { rcond });
    }
    let solution = a_nalg.lu().solve(&to_dmatrix(b)).ok_or(LinalgError::Singular { rcond })?;
    Ok(from_dmatrix(&solution))
}

/// pinv_symmetric: pseudo-inverse of a symmetric PSD matrix.
///
/// Uses `A⁺ = Σ_{k: λ_k > EIGEN_EPS·λ_max} q_k q_kᵀ / λ_k`. Directions with
/// eigenvalues below the cutoff contribute nothing, so weakly identified
/// directions are dropped rather than blown up.
///
/// # Errors
/// - [`LinalgError::NotSquare`] for rectangular input.
pub fn pinv_symmetric(a: ArrayView2<'_, f64>) -> LinalgResult<Array2<f64>> {
    let (evals, evecs) = sorted_symmetric_eigen(a)?;
    let n = evals.len();
    let lambda_max = evals.iter().fold(0.0_f64, |acc, &l| acc.max(l));
    let cutoff = EIGEN_EPS * lambda_max;
    let mut out = Array2::<f64>::zeros((n, n));
    for (k, &lambda) in evals.iter().enumerate() {
        if lambda > cutoff && lambda > 0.0 {
            let q_k = evecs.column(k);
            for i in 0..n {
                let coeff = q_k[i] / lambda;
                for j in 0..n {
                    out[[i, j]] += coeff * q_k[j];
                }
            }
        }
    }
    Ok(out)
}
