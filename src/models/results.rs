//! models::results: fitted output shared by the reference models.
//!
//! [`RegressionResults`] carries the estimate, its covariance, and the
//! summary quantities needed for Wald-type inference. Test statistics use a
//! Student-t reference when the scale was estimated (linear model) and a
//! standard normal otherwise (fixed scale, Poisson).
use crate::{
    fitting::traits::FitResults, inference::standard_errors,
    optimization::loglik_optimizer::OptimOutcome,
};
use ndarray::{Array1, Array2, ArrayView1};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Reference distribution for `θ̂ / se(θ̂)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reference {
    /// Student-t with `df_resid` degrees of freedom.
    StudentT,
    /// Standard normal.
    Normal,
}

/// RegressionResults: estimate plus inference summary.
///
/// Fields
/// ------
/// - `params`: `Array1<f64>`, one entry per design column.
/// - `cov_params`: `Array2<f64>`, `k × k`.
/// - `nobs`: number of observations.
/// - `df_resid`: `nobs − k`.
/// - `scale`: residual variance (linear model) or `1.0` (Poisson).
/// - `llf`: log-likelihood at `params`.
/// - `optim`: optimizer outcome for iteratively fitted models.
/// - `reference`: distribution used by [`pvalues`](Self::pvalues).
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionResults {
    pub params: Array1<f64>,
    pub cov_params: Array2<f64>,
    pub nobs: usize,
    pub df_resid: f64,
    pub scale: f64,
    pub llf: f64,
    pub optim: Option<OptimOutcome>,
    pub reference: Reference,
}

impl RegressionResults {
    /// Standard errors, `sqrt(diag cov_params)`.
    pub fn bse(&self) -> Array1<f64> {
        standard_errors(self.cov_params.view())
    }

    /// `θ̂ / se(θ̂)`; a zero standard error gives `NaN` (or `±∞` for a
    /// nonzero estimate).
    pub fn test_statistics(&self) -> Array1<f64> {
        &self.params / &self.bse()
    }

    /// Two-sided p-values of [`test_statistics`](Self::test_statistics).
    ///
    /// Entries are `NaN` when the statistic is `NaN` or when the reference
    /// distribution cannot be built (e.g. `df_resid ≤ 0` for Student-t).
    pub fn pvalues(&self) -> Array1<f64> {
        let stats = self.test_statistics();
        match self.reference {
            Reference::StudentT => match StudentsT::new(0.0, 1.0, self.df_resid) {
                Ok(dist) => two_sided(&stats, &dist),
                Err(_) => Array1::from_elem(stats.len(), f64::NAN),
            },
            Reference::Normal => match Normal::new(0.0, 1.0) {
                Ok(dist) => two_sided(&stats, &dist),
                Err(_) => Array1::from_elem(stats.len(), f64::NAN),
            },
        }
    }
}

fn two_sided<D: ContinuousCDF<f64, f64>>(stats: &Array1<f64>, dist: &D) -> Array1<f64> {
    stats.mapv(|z| if z.is_nan() { f64::NAN } else { 2.0 * dist.sf(z.abs()) })
}

impl FitResults for RegressionResults {
    fn params(&self) -> ArrayView1<'_, f64> {
        self.params.view()
    }

    fn cov_params(&self) -> Array2<f64> {
        self.cov_params.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn results(reference: Reference, df_resid: f64) -> RegressionResults {
        RegressionResults {
            params: array![1.96, 0.0],
            cov_params: array![[1.0, 0.0], [0.0, 4.0]],
            nobs: 12,
            df_resid,
            scale: 1.0,
            llf: -3.0,
            optim: None,
            reference,
        }
    }

    #[test]
    // Purpose
    // -------
    // Under the normal reference, z = 1.96 has the familiar 5% two-sided
    // p-value and a zero estimate has p = 1.
    fn normal_pvalues_match_textbook_values() {
        let res = results(Reference::Normal, 10.0);

        let p = res.pvalues();

        assert_abs_diff_eq!(p[0], 0.05, epsilon = 1e-3);
        assert_abs_diff_eq!(p[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Student-t tails are heavier than normal tails for small df.
    fn student_t_pvalues_exceed_normal_ones() {
        let t = results(Reference::StudentT, 5.0).pvalues();
        let z = results(Reference::Normal, 5.0).pvalues();

        assert!(t[0] > z[0]);
    }

    #[test]
    fn student_t_without_residual_df_yields_nan() {
        let p = results(Reference::StudentT, 0.0).pvalues();

        assert!(p.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn bse_and_statistics_follow_covariance_diagonal() {
        let res = results(Reference::Normal, 10.0);

        assert_eq!(res.bse(), array![1.0, 2.0]);
        assert_eq!(res.test_statistics(), array![1.96, 0.0]);
    }
}
