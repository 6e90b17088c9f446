//! constraints::transform: null-space re-parameterization of `R·θ = q`.
//!
//! Purpose
//! -------
//! Build an immutable affine map between a reduced parameter space of
//! dimension `k_unconstr = k_vars − k_constr` and the full parameter space,
//! such that every image of the map satisfies the linear equality constraints
//! `R·θ = q` by construction. Models are then fitted in the reduced space
//! without any constraint handling of their own.
//!
//! Key behaviors
//! -------------
//! - Form the orthogonal projector onto the null space of `R`,
//!   `M = I − Rᵀ(R⁺)ᵀ`, and eigen-decompose it.
//! - Split eigenvectors by eigenvalue: those below
//!   [`RestrictionOptions::eigen_split`] span the constrained complement `L`,
//!   the rest form the orthonormal null-space basis `transf_mat`.
//! - For non-zero `q`, solve `(Lᵀ Rᵀ) X = Lᵀ` and set `constant = Xᵀ q`, a
//!   particular solution with `R · constant = q`.
//! - `expand(y) = transf_mat · y + constant` and `reduce(θ) = θ · transf_mat`,
//!   for single vectors and row-wise for batches.
//!
//! Invariants & assumptions
//! ------------------------
//! - Columns of `transf_mat` are orthonormal and `R · transf_mat ≈ 0`.
//! - `reduce(expand(y)) = y` for every reduced `y`.
//! - `expand(reduce(θ)) = θ` only when `θ` already satisfies the constraint;
//!   otherwise the component along the constrained directions is discarded
//!   without error.
//! - The transform is never mutated after construction.
//!
//! Conventions
//! -----------
//! - Eigenvectors are sorted by eigenvalue explicitly; the decomposition's
//!   own ordering is never relied upon.
//! - Each null-space column is sign-normalized so that its largest-magnitude
//!   entry is positive. The basis is otherwise only defined up to rotation,
//!   so comparisons in tests are made on subspaces.
//!
//! Testing notes
//! -------------
//! - Unit tests below cover the constraint identities, the affine offset, the
//!   round-trip laws, row-scaled constraints, and the three structural
//!   failure modes (inconsistent, redundant, too many rows).
use crate::{
    constraints::{
        errors::{ConstraintError, ConstraintResult},
        options::RestrictionOptions,
        validation::{check_finite_mat, check_finite_vec, check_len},
    },
    linalg::{pinv, solve_guarded, sorted_symmetric_eigen},
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};

/// Distance from {0, 1} beyond which a projector eigenvalue is reported.
const SPECTRUM_TOL: f64 = 1e-6;

/// Affine transform between reduced and full parameter spaces for `R·θ = q`.
///
/// Fields
/// ------
/// - `k_constr`: number of constraint rows.
/// - `k_vars`: dimension of the full parameter space.
/// - `k_unconstr`: `k_vars − k_constr`, dimension of the reduced space.
/// - `transf_mat`: `k_vars × k_unconstr` orthonormal null-space basis.
/// - `complement`: `k_vars × k_constr` basis `L` of the constrained
///   directions, used only for the offset solve.
/// - `constant`: length-`k_vars` particular solution (zero if homogeneous).
/// - `eigenvalues`: ascending spectrum of the null-space projector.
/// - `constraint_matrix` / `constraint_values`: copies of `R` and `q`
///   (`q` is zero-filled when absent).
#[derive(Debug, Clone, PartialEq)]
pub struct TransformRestriction {
    k_constr: usize,
    k_vars: usize,
    k_unconstr: usize,
    transf_mat: Array2<f64>,
    complement: Array2<f64>,
    constant: Array1<f64>,
    eigenvalues: Array1<f64>,
    constraint_matrix: Array2<f64>,
    constraint_values: Array1<f64>,
    homogeneous: bool,
}

impl TransformRestriction {
    /// Build the transform for `R·θ = q` with default options.
    ///
    /// `q = None` means the homogeneous system `R·θ = 0`.
    ///
    /// # Errors
    /// See [`TransformRestriction::with_options`].
    pub fn new(r: ArrayView2<'_, f64>, q: Option<ArrayView1<'_, f64>>) -> ConstraintResult<Self> {
        Self::with_options(r, q, &RestrictionOptions::default())
    }

    /// Build the transform for a single constraint row `row · θ = value`.
    ///
    /// This is the coercion of a flat sequence into a `1 × k_vars` matrix.
    pub fn from_row(row: ArrayView1<'_, f64>, value: Option<f64>) -> ConstraintResult<Self> {
        let q = value.map(|v| Array1::from_elem(1, v));
        Self::new(row.insert_axis(Axis(0)), q.as_ref().map(|q| q.view()))
    }

    /// with_options: construct the transform with explicit numerical options.
    ///
    /// Parameters
    /// ----------
    /// - `r`: `ArrayView2<f64>`
    ///   `k_constr × k_vars` constraint matrix, expected to have full row rank.
    /// - `q`: `Option<ArrayView1<f64>>`
    ///   Length-`k_constr` target values; `None` or all-zero is homogeneous
    ///   and skips the offset solve.
    /// - `opts`: `&RestrictionOptions`
    ///   Eigenvalue split and singularity tolerance.
    ///
    /// Returns
    /// -------
    /// `ConstraintResult<TransformRestriction>`
    ///   A fully initialized, immutable transform.
    ///
    /// Errors
    /// ------
    /// - [`ConstraintError::EmptyParameterSpace`] if `R` has no columns.
    /// - [`ConstraintError::TooManyConstraints`] if `k_constr > k_vars`.
    /// - [`ConstraintError::DimensionMismatch`] if `q.len() != k_constr`.
    /// - [`ConstraintError::NonFiniteInput`] for NaN/±inf in `R` or `q`.
    /// - [`ConstraintError::InconsistentConstraints`] if the offset system
    ///   `Lᵀ Rᵀ` is singular. For rank-deficient `R` with non-zero `q` this is
    ///   always the outcome.
    /// - [`ConstraintError::RedundantConstraints`] if `R` is rank-deficient
    ///   and `q` is zero.
    ///
    /// Notes
    /// -----
    /// - Rank is read off the projector spectrum: it is the count of
    ///   eigenvalues below `eigen_split`.
    /// - Rows of `R` and entries of `q` are rescaled to unit row norm before
    ///   the projector and offset are computed, so the conditioning checks
    ///   do not depend on the units a constraint is written in. The stored
    ///   `R` and `q` are the caller's.
    pub fn with_options(
        r: ArrayView2<'_, f64>, q: Option<ArrayView1<'_, f64>>, opts: &RestrictionOptions,
    ) -> ConstraintResult<Self> {
        let (k_constr, k_vars) = r.dim();
        if k_vars == 0 {
            return Err(ConstraintError::EmptyParameterSpace);
        }
        if k_constr > k_vars {
            return Err(ConstraintError::TooManyConstraints { k_constr, k_vars });
        }
        check_finite_mat("constraint matrix", r)?;
        if let Some(q) = q {
            check_len("constraint values", k_constr, q.len())?;
            check_finite_vec("constraint values", q)?;
        }

        let constraint_values = q.map_or_else(|| Array1::zeros(k_constr), |q| q.to_owned());
        let (r_unit, q_unit) = unit_rows(r, constraint_values.view());

        let projector = null_space_projector(r_unit.view())?;
        let (eigenvalues, eigenvectors) = sorted_symmetric_eigen(projector.view())?;
        warn_if_blurred_spectrum(eigenvalues.view());
        let rank = eigenvalues.iter().filter(|&&lambda| lambda < opts.eigen_split).count();

        let complement = eigenvectors.slice(s![.., ..k_constr]).to_owned();
        let mut transf_mat = eigenvectors.slice(s![.., k_constr..]).to_owned();
        normalize_column_signs(&mut transf_mat);

        let homogeneous = constraint_values.iter().all(|&v| v == 0.0);
        let constant = if homogeneous {
            Array1::zeros(k_vars)
        } else {
            solve_offset(r_unit.view(), complement.view(), q_unit.view(), opts.singular_tol)?
        };
        if rank < k_constr {
            return Err(ConstraintError::RedundantConstraints { rank, k_constr });
        }

        log::debug!(
            "restriction transform: k_vars = {k_vars}, k_constr = {k_constr}, homogeneous = {homogeneous}"
        );
        Ok(Self {
            k_constr,
            k_vars,
            k_unconstr: k_vars - k_constr,
            transf_mat,
            complement,
            constant,
            eigenvalues,
            constraint_matrix: r.to_owned(),
            constraint_values,
            homogeneous,
        })
    }

    pub fn k_constr(&self) -> usize {
        self.k_constr
    }

    pub fn k_vars(&self) -> usize {
        self.k_vars
    }

    pub fn k_unconstr(&self) -> usize {
        self.k_unconstr
    }

    /// Orthonormal null-space basis, `k_vars × k_unconstr`.
    pub fn transf_mat(&self) -> ArrayView2<'_, f64> {
        self.transf_mat.view()
    }

    /// Basis `L` of the constrained directions, `k_vars × k_constr`.
    pub fn complement(&self) -> ArrayView2<'_, f64> {
        self.complement.view()
    }

    /// Particular solution of `R · θ = q`; zero for homogeneous constraints.
    pub fn constant(&self) -> ArrayView1<'_, f64> {
        self.constant.view()
    }

    /// Projector spectrum, ascending.
    pub fn eigenvalues(&self) -> ArrayView1<'_, f64> {
        self.eigenvalues.view()
    }

    pub fn constraint_matrix(&self) -> ArrayView2<'_, f64> {
        self.constraint_matrix.view()
    }

    pub fn constraint_values(&self) -> ArrayView1<'_, f64> {
        self.constraint_values.view()
    }

    /// `true` when the map is linear (`q` absent or zero).
    pub fn is_homogeneous(&self) -> bool {
        self.homogeneous
    }

    /// expand: map reduced parameters to the full space.
    ///
    /// Computes `transf_mat · y + constant`. The result satisfies
    /// `R · θ = q` for every `y`.
    ///
    /// # Errors
    /// - [`ConstraintError::DimensionMismatch`] if `y.len() != k_unconstr`.
    pub fn expand(&self, params_reduced: ArrayView1<'_, f64>) -> ConstraintResult<Array1<f64>> {
        check_len("reduced parameters", self.k_unconstr, params_reduced.len())?;
        Ok(self.transf_mat.dot(&params_reduced) + &self.constant)
    }

    /// expand_rows: row-wise [`expand`](Self::expand) for a batch.
    ///
    /// Each row of the `m × k_unconstr` input is an independent reduced vector;
    /// the output is `m × k_vars`.
    ///
    /// # Errors
    /// - [`ConstraintError::DimensionMismatch`] if the width is not `k_unconstr`.
    pub fn expand_rows(&self, params_reduced: ArrayView2<'_, f64>) -> ConstraintResult<Array2<f64>> {
        check_len("reduced parameter columns", self.k_unconstr, params_reduced.ncols())?;
        Ok(params_reduced.dot(&self.transf_mat.t()) + &self.constant)
    }

    /// reduce: project full-space values onto the null-space basis.
    ///
    /// Computes `θ · transf_mat`. No check is made that `θ` satisfies the
    /// constraint; components along constrained directions are dropped.
    ///
    /// # Errors
    /// - [`ConstraintError::DimensionMismatch`] if `θ.len() != k_vars`.
    pub fn reduce(&self, params: ArrayView1<'_, f64>) -> ConstraintResult<Array1<f64>> {
        check_len("full parameters", self.k_vars, params.len())?;
        Ok(params.dot(&self.transf_mat))
    }

    /// reduce_rows: row-wise [`reduce`](Self::reduce).
    ///
    /// Applied to a design matrix (`nobs × k_vars`, one column per parameter)
    /// this yields the reduced design with `k_unconstr` columns.
    ///
    /// # Errors
    /// - [`ConstraintError::DimensionMismatch`] if the width is not `k_vars`.
    pub fn reduce_rows(&self, params: ArrayView2<'_, f64>) -> ConstraintResult<Array2<f64>> {
        check_len("full parameter columns", self.k_vars, params.ncols())?;
        Ok(params.dot(&self.transf_mat))
    }

    /// Constraint residual `R · θ − q`.
    ///
    /// # Errors
    /// - [`ConstraintError::DimensionMismatch`] if `θ.len() != k_vars`.
    pub fn residual(&self, params: ArrayView1<'_, f64>) -> ConstraintResult<Array1<f64>> {
        check_len("full parameters", self.k_vars, params.len())?;
        Ok(self.constraint_matrix.dot(&params) - &self.constraint_values)
    }

    /// `true` if every constraint holds within `tol` (absolute, per row).
    pub fn satisfies(&self, params: ArrayView1<'_, f64>, tol: f64) -> ConstraintResult<bool> {
        Ok(self.residual(params)?.iter().all(|r| r.abs() <= tol))
    }
}

// ---- Helper methods ----

/// Divide each row of `R` and the matching entry of `q` by the row's
/// Euclidean norm. Zero rows are left as they are.
pub(crate) fn unit_rows(
    r: ArrayView2<'_, f64>, q: ArrayView1<'_, f64>,
) -> (Array2<f64>, Array1<f64>) {
    let mut r_unit = r.to_owned();
    let mut q_unit = q.to_owned();
    for (mut row, value) in r_unit.rows_mut().into_iter().zip(q_unit.iter_mut()) {
        let norm = row.dot(&row).sqrt();
        if norm > 0.0 {
            row.mapv_inplace(|v| v / norm);
            *value /= norm;
        }
    }
    (r_unit, q_unit)
}

/// `M = I − Rᵀ (R⁺)ᵀ`, symmetrized to absorb rounding before the eigen step.
fn null_space_projector(r: ArrayView2<'_, f64>) -> ConstraintResult<Array2<f64>> {
    let k_vars = r.ncols();
    let r_pinv = pinv(r)?;
    let mut projector = Array2::<f64>::eye(k_vars) - r.t().dot(&r_pinv.t());
    for i in 0..k_vars {
        for j in 0..i {
            let avg = 0.5 * (projector[[i, j]] + projector[[j, i]]);
            projector[[i, j]] = avg;
            projector[[j, i]] = avg;
        }
    }
    Ok(projector)
}

/// Solve `(Lᵀ Rᵀ) X = Lᵀ` and return `Xᵀ q`.
fn solve_offset(
    r: ArrayView2<'_, f64>, complement: ArrayView2<'_, f64>, q: ArrayView1<'_, f64>,
    singular_tol: f64,
) -> ConstraintResult<Array1<f64>> {
    let system = complement.t().dot(&r.t());
    let solution = solve_guarded(system.view(), complement.t(), singular_tol)
        .map_err(|source| ConstraintError::InconsistentConstraints { source })?;
    Ok(solution.t().dot(&q))
}

/// Flip each column so its largest-magnitude entry is positive.
fn normalize_column_signs(basis: &mut Array2<f64>) {
    for mut column in basis.columns_mut() {
        let pivot = column.iter().fold(0.0_f64, |best, &v| if v.abs() > best.abs() { v } else { best });
        if pivot < 0.0 {
            column.mapv_inplace(|v| -v);
        }
    }
}

fn warn_if_blurred_spectrum(eigenvalues: ArrayView1<'_, f64>) {
    for &lambda in eigenvalues.iter() {
        if lambda.abs().min((lambda - 1.0).abs()) > SPECTRUM_TOL {
            log::warn!(
                "null-space projector eigenvalue {lambda} is not near 0 or 1; \
                 the constraint matrix may be ill-conditioned"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Dimensions, orthonormality, and the null-space identity R·T ≈ 0.
    // - The affine offset for inhomogeneous constraints.
    // - Round-trip laws between reduced and full spaces.
    // - Structural failures (inconsistent, redundant, too many rows) and
    //   shape errors on expand/reduce.
    //
    // They intentionally DO NOT cover:
    // - Fitting models through the transform (see `fitting::orchestrator`).
    // -------------------------------------------------------------------------

    fn max_abs(a: &Array2<f64>) -> f64 {
        a.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }

    #[test]
    // Purpose
    // -------
    // The sum-to-zero constraint on two parameters leaves a single direction
    // proportional to [1, −1]/√2.
    //
    // Given
    // -----
    // - R = [[1, 1]], q = None.
    //
    // Expect
    // ------
    // - k_unconstr = 1, |transf_mat| = [1, 1]/√2 with opposite signs,
    //   constant = [0, 0].
    fn sum_to_zero_pair_yields_antisymmetric_direction() {
        // Arrange
        let r = array![[1.0, 1.0]];

        // Act
        let transf = TransformRestriction::new(r.view(), None).unwrap();

        // Assert
        assert_eq!(transf.k_constr(), 1);
        assert_eq!(transf.k_vars(), 2);
        assert_eq!(transf.k_unconstr(), 1);
        let t = transf.transf_mat();
        let inv_sqrt2 = 1.0 / 2.0_f64.sqrt();
        assert_abs_diff_eq!(t[[0, 0]].abs(), inv_sqrt2, epsilon = 1e-12);
        assert_abs_diff_eq!(t[[1, 0]].abs(), inv_sqrt2, epsilon = 1e-12);
        assert!(t[[0, 0]] * t[[1, 0]] < 0.0);
        assert_eq!(transf.constant(), array![0.0, 0.0].view());
        assert!(transf.is_homogeneous());
    }

    #[test]
    // Purpose
    // -------
    // Basis columns are orthonormal and annihilated by R.
    //
    // Given
    // -----
    // - A generic 2 × 4 full-row-rank R.
    //
    // Expect
    // ------
    // - Tᵀ T = I₂ and R T ≈ 0.
    fn basis_is_orthonormal_and_in_null_space() {
        let r = array![[1.0, 2.0, -1.0, 0.5], [0.0, 1.0, 3.0, -2.0]];

        let transf = TransformRestriction::new(r.view(), None).unwrap();
        let t = transf.transf_mat();

        let gram = t.t().dot(&t);
        assert_eq!(gram.dim(), (2, 2));
        assert!(max_abs(&(gram - Array2::<f64>::eye(2))) < 1e-12);
        assert!(max_abs(&r.dot(&t)) < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The projector spectrum splits cleanly into k_constr zeros and
    // k_unconstr ones, in ascending order.
    fn projector_spectrum_is_zero_one_ascending() {
        let r = array![[1.0, 0.0, 1.0], [0.0, 1.0, 1.0]];

        let transf = TransformRestriction::new(r.view(), None).unwrap();
        let evals = transf.eigenvalues();

        assert_abs_diff_eq!(evals[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(evals[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(evals[2], 1.0, epsilon = 1e-12);
        assert_eq!(transf.complement().dim(), (3, 2));
    }

    #[test]
    // Purpose
    // -------
    // An inhomogeneous constraint pins b0 = 2 regardless of reduced input.
    //
    // Given
    // -----
    // - R = [[1, 0]], q = [2].
    //
    // Expect
    // ------
    // - constant = [2, 0]; expand(y)[0] = 2 for several y.
    fn inhomogeneous_constraint_fixes_coordinate() {
        let r = array![[1.0, 0.0]];
        let q = array![2.0];

        let transf = TransformRestriction::new(r.view(), Some(q.view())).unwrap();

        assert!(!transf.is_homogeneous());
        assert_abs_diff_eq!(transf.constant()[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(transf.constant()[1], 0.0, epsilon = 1e-12);
        for y in [-3.0, 0.0, 0.25, 17.0] {
            let full = transf.expand(array![y].view()).unwrap();
            assert_abs_diff_eq!(full[0], 2.0, epsilon = 1e-12);
            assert_abs_diff_eq!(full[1].abs(), y.abs(), epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // For a general inhomogeneous system the offset satisfies R·c = q and
    // every expanded vector satisfies the constraint.
    fn expanded_vectors_satisfy_inhomogeneous_constraints() {
        let r = array![[1.0, 1.0, 1.0, 1.0], [1.0, -1.0, 0.0, 2.0]];
        let q = array![1.0, -0.5];

        let transf = TransformRestriction::new(r.view(), Some(q.view())).unwrap();

        let rc = r.dot(&transf.constant());
        assert_abs_diff_eq!(rc[0], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(rc[1], -0.5, epsilon = 1e-10);
        let batch = array![[0.0, 0.0], [1.0, -2.0], [3.5, 0.25]];
        let full = transf.expand_rows(batch.view()).unwrap();
        for row in full.rows() {
            assert!(transf.satisfies(row, 1e-10).unwrap());
        }
    }

    #[test]
    // Purpose
    // -------
    // reduce(expand(y)) returns y exactly (orthonormal basis).
    fn reduce_inverts_expand() {
        let r = array![[2.0, -1.0, 0.0], [0.0, 1.0, 1.0]];
        let q = array![0.5, 3.0];
        let transf = TransformRestriction::new(r.view(), Some(q.view())).unwrap();

        for y in [-1.0, 0.0, 2.5] {
            let back = transf.reduce(transf.expand(array![y].view()).unwrap().view()).unwrap();
            assert_abs_diff_eq!(back[0], y, epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // expand(reduce(x)) recovers x when x already satisfies a homogeneous
    // constraint, and drops the constrained component otherwise.
    //
    // Given
    // -----
    // - R = [[1, 1, 1]] (sum to zero).
    // - x_ok = [1, −2, 1] (sums to zero), x_bad = [1, 1, 1].
    //
    // Expect
    // ------
    // - expand(reduce(x_ok)) = x_ok.
    // - expand(reduce(x_bad)) = 0 (x_bad lies entirely in the complement).
    fn expand_reduce_is_identity_only_on_feasible_set() {
        let r = array![[1.0, 1.0, 1.0]];
        let transf = TransformRestriction::new(r.view(), None).unwrap();

        let x_ok = array![1.0, -2.0, 1.0];
        let recovered = transf.expand(transf.reduce(x_ok.view()).unwrap().view()).unwrap();
        for (a, b) in recovered.iter().zip(x_ok.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }

        let x_bad = array![1.0, 1.0, 1.0];
        let projected = transf.expand(transf.reduce(x_bad.view()).unwrap().view()).unwrap();
        assert!(projected.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    // Purpose
    // -------
    // Reducing a design matrix keeps the row count and shrinks the width.
    fn reduce_rows_shrinks_design_width() {
        let r = array![[1.0, -1.0, 0.0]];
        let transf = TransformRestriction::new(r.view(), None).unwrap();
        let exog = array![[1.0, 0.0, 2.0], [0.0, 1.0, 3.0], [1.0, 1.0, 1.0], [2.0, 0.5, 0.0]];

        let reduced = transf.reduce_rows(exog.view()).unwrap();

        assert_eq!(reduced.dim(), (4, 2));
        let first = transf.reduce(exog.row(0)).unwrap();
        assert_abs_diff_eq!(reduced[[0, 0]], first[0], epsilon = 1e-14);
        assert_abs_diff_eq!(reduced[[0, 1]], first[1], epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // Inconsistent constraints are detected while solving for the offset.
    //
    // Given
    // -----
    // - R = [[1, 1], [2, 2]], q = [0, 1]: b0 + b1 = 0 and 2(b0 + b1) = 1.
    //
    // Expect
    // ------
    // - `InconsistentConstraints` wrapping a singular-system failure.
    fn inconsistent_constraints_are_rejected() {
        let r = array![[1.0, 1.0], [2.0, 2.0]];
        let q = array![0.0, 1.0];

        let err = TransformRestriction::new(r.view(), Some(q.view())).unwrap_err();

        assert!(matches!(err, ConstraintError::InconsistentConstraints { .. }));
    }

    #[test]
    // Purpose
    // -------
    // A full-rank, consistent constraint written on a very large scale builds
    // the same transform as its unit-scaled equivalent.
    //
    // Given
    // -----
    // - R = [[1e11, 1e11, 0], [0, 1, -1]], q = [3e11, 0.5].
    // - The same constraint with the first row and target divided by 1e11.
    //
    // Expect
    // ------
    // - Construction succeeds; constant satisfies b0 + b1 = 3, b1 − b2 = 0.5.
    // - Constant and null-space basis agree with the unit-scaled transform.
    fn row_scaled_constraint_matches_unit_scaled_transform() {
        // Arrange
        let r_big = array![[1e11, 1e11, 0.0], [0.0, 1.0, -1.0]];
        let q_big = array![3e11, 0.5];
        let r_unit = array![[1.0, 1.0, 0.0], [0.0, 1.0, -1.0]];
        let q_unit = array![3.0, 0.5];

        // Act
        let big = TransformRestriction::new(r_big.view(), Some(q_big.view())).unwrap();
        let unit = TransformRestriction::new(r_unit.view(), Some(q_unit.view())).unwrap();

        // Assert
        let c = big.constant();
        assert_abs_diff_eq!(c[0] + c[1], 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(c[1] - c[2], 0.5, epsilon = 1e-10);
        for (a, b) in c.iter().zip(unit.constant().iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-10);
        }
        assert_eq!(big.k_unconstr(), 1);
        let t_big = big.transf_mat();
        let t_unit = unit.transf_mat();
        assert_abs_diff_eq!(t_big.column(0).dot(&t_unit.column(0)).abs(), 1.0, epsilon = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // Redundant homogeneous rows are rejected instead of yielding a basis of
    // the wrong dimension.
    fn redundant_homogeneous_rows_are_rejected() {
        let r = array![[1.0, 1.0, 0.0], [2.0, 2.0, 0.0]];

        let err = TransformRestriction::new(r.view(), None).unwrap_err();

        assert_eq!(err, ConstraintError::RedundantConstraints { rank: 1, k_constr: 2 });
    }

    #[test]
    // Purpose
    // -------
    // Two independent homogeneous rows on two parameters force both to zero;
    // the reduced space is empty and expand returns the zero vector.
    fn fully_constrained_homogeneous_system_has_empty_reduced_space() {
        let r = array![[1.0, 1.0], [1.0, 2.0]];

        let transf = TransformRestriction::new(r.view(), None).unwrap();

        assert_eq!(transf.k_unconstr(), 0);
        let full = transf.expand(Array1::<f64>::zeros(0).view()).unwrap();
        assert_eq!(full, array![0.0, 0.0]);
    }

    #[test]
    fn more_rows_than_columns_is_rejected() {
        let r = array![[1.0], [2.0]];

        let err = TransformRestriction::new(r.view(), None).unwrap_err();

        assert_eq!(err, ConstraintError::TooManyConstraints { k_constr: 2, k_vars: 1 });
    }

    #[test]
    fn wrong_length_q_is_rejected() {
        let r = array![[1.0, 0.0]];
        let q = array![1.0, 2.0];

        let err = TransformRestriction::new(r.view(), Some(q.view())).unwrap_err();

        assert_eq!(
            err,
            ConstraintError::DimensionMismatch { what: "constraint values", expected: 1, found: 2 }
        );
    }

    #[test]
    fn expand_and_reduce_check_lengths() {
        let transf = TransformRestriction::new(array![[1.0, 1.0, 0.0]].view(), None).unwrap();

        assert!(matches!(
            transf.expand(array![1.0].view()),
            Err(ConstraintError::DimensionMismatch { expected: 2, found: 1, .. })
        ));
        assert!(matches!(
            transf.reduce(array![1.0, 2.0].view()),
            Err(ConstraintError::DimensionMismatch { expected: 3, found: 2, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // A flat row is treated as a single constraint, and an explicit zero
    // target behaves exactly like an absent one.
    fn from_row_matches_matrix_form_and_zero_q_is_homogeneous() {
        let row = array![1.0, 1.0];

        let from_row = TransformRestriction::from_row(row.view(), Some(0.0)).unwrap();
        let from_matrix = TransformRestriction::new(array![[1.0, 1.0]].view(), None).unwrap();

        assert!(from_row.is_homogeneous());
        assert_eq!(from_row.transf_mat(), from_matrix.transf_mat());
        assert_eq!(from_row.constant(), from_matrix.constant());
    }

    #[test]
    // Purpose
    // -------
    // With no constraint rows the reduced space is the full space.
    fn empty_constraint_matrix_gives_full_dimensional_basis() {
        let r = Array2::<f64>::zeros((0, 3));

        let transf = TransformRestriction::new(r.view(), None).unwrap();

        assert_eq!(transf.k_unconstr(), 3);
        let t = transf.transf_mat();
        assert!(max_abs(&(t.t().dot(&t) - Array2::<f64>::eye(3))) < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Sign normalization makes the largest entry of every column positive.
    fn basis_columns_have_positive_pivot() {
        let r = array![[3.0, -1.0, 2.0, 0.0]];

        let transf = TransformRestriction::new(r.view(), None).unwrap();

        for column in transf.transf_mat().columns() {
            let pivot = column
                .iter()
                .fold(0.0_f64, |best, &v| if v.abs() > best.abs() { v } else { best });
            assert!(pivot > 0.0);
        }
    }
}
