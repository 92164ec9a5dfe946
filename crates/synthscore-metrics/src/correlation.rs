use tracing::info;

use synthscore_core::validate_schemas;

use crate::errors::Result;
use crate::matrix::{mixed_correlation, pearson_correlation};
use crate::metric::{Metric, MetricContext, MetricKind, MetricResults, NormalizedScore};

/// Result key for the correlation matrix difference score.
pub const CORR_MAT_DIFF: &str = "corr_mat_diff";
/// Result key for the real-data correlation matrix.
pub const REAL_COR_MAT: &str = "real_cor_mat";
/// Result key for the synthetic-data correlation matrix.
pub const SYNT_COR_MAT: &str = "synt_cor_mat";
/// Result key for the difference matrix.
pub const DIFF_COR_MAT: &str = "diff_cor_mat";

/// Frobenius norm of the correlation matrix difference between real and
/// synthetic data.
///
/// Mixed mode spans all analyzed columns with block-specific measures;
/// otherwise only the numeric columns enter, under plain Pearson.
#[derive(Debug, Clone, Copy)]
pub struct MixedCorrelation {
    /// Use the mixed-type matrix; otherwise numeric columns only.
    pub mixed_corr: bool,
    /// Keep the real, synthetic, and difference matrices in the results.
    pub return_mats: bool,
}

impl Default for MixedCorrelation {
    fn default() -> Self {
        Self {
            mixed_corr: true,
            return_mats: false,
        }
    }
}

impl Metric for MixedCorrelation {
    fn name(&self) -> &'static str {
        "corr_diff"
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Utility
    }

    fn evaluate(&self, ctx: &MetricContext<'_>) -> Result<MetricResults> {
        validate_schemas(ctx.real, ctx.synt, ctx.hout)?;

        let (real_corr, synt_corr) = if self.mixed_corr {
            (
                mixed_correlation(ctx.real, ctx.num_cols, ctx.cat_cols)?,
                mixed_correlation(ctx.synt, ctx.num_cols, ctx.cat_cols)?,
            )
        } else {
            (
                pearson_correlation(ctx.real, ctx.num_cols)?,
                pearson_correlation(ctx.synt, ctx.num_cols)?,
            )
        };
        let diff = real_corr.sub(&synt_corr)?;
        let score = diff.frobenius_norm();

        if ctx.verbose {
            // heatmap rendering stays external; announce that the matrix is ready
            info!(
                event = "matrix_ready",
                metric = self.name(),
                mixed = self.mixed_corr,
                columns = diff.row_labels().len()
            );
        }
        info!(
            event = "metric_evaluated",
            metric = self.name(),
            mixed = self.mixed_corr,
            corr_mat_diff = score
        );

        let mut results = MetricResults::default();
        results.insert_scalar(CORR_MAT_DIFF, score);
        if self.return_mats {
            results.insert_matrix(REAL_COR_MAT, real_corr);
            results.insert_matrix(SYNT_COR_MAT, synt_corr);
            results.insert_matrix(DIFF_COR_MAT, diff);
        }
        Ok(results)
    }

    fn format_output(&self, results: &MetricResults) -> String {
        let score = results.scalar(CORR_MAT_DIFF).unwrap_or(f64::NAN);
        if self.mixed_corr {
            format!(
                "| Mixed correlation matrix difference      :   {score:.4}           |"
            )
        } else {
            format!(
                "| Correlation difference (nums only)       :   {score:.4}           |"
            )
        }
    }

    fn normalize_output(&self, results: &MetricResults) -> Option<NormalizedScore> {
        let score = results.scalar(CORR_MAT_DIFF)?;
        Some(NormalizedScore {
            val: vec![1.0 - score.tanh()],
            err: vec![0.0],
        })
    }
}
