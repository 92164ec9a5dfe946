use tracing::info;

use synthscore_core::{DataTable, validate_schemas};

use crate::distance::{DistanceKind, knn_distance};
use crate::entropy::column_entropy;
use crate::errors::Result;
use crate::metric::{Metric, MetricContext, MetricKind, MetricResults, NormalizedScore};

/// Result key for the epsilon identifiability risk.
pub const EPS_RISK: &str = "eps_risk";

/// Epsilon identifiability risk from nearest-neighbor distance comparison.
///
/// A real row counts as identifiable when the synthetic data holds a
/// closer neighbor than the rest of the real data does (leave-one-out).
/// Adapted from Yoon, Drumright & van der Schaar (2020), "Anonymization
/// Through Data Synthesis Using Generative Adversarial Networks
/// (ADS-GAN)", IEEE JBHI 24(8).
#[derive(Debug, Clone, Copy, Default)]
pub struct EpsilonIdentifiability;

impl Metric for EpsilonIdentifiability {
    fn name(&self) -> &'static str {
        "eps_risk"
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Privacy
    }

    fn evaluate(&self, ctx: &MetricContext<'_>) -> Result<MetricResults> {
        validate_schemas(ctx.real, ctx.synt, ctx.hout)?;

        // euclid is numeric-only; categorical columns drop out of this mode
        let restricted;
        let (real, synt): (&DataTable, &DataTable) = if ctx.nn_dist == DistanceKind::Euclid {
            restricted = (
                ctx.real.select(ctx.num_cols)?,
                ctx.synt.select(ctx.num_cols)?,
            );
            (&restricted.0, &restricted.1)
        } else {
            (ctx.real, ctx.synt)
        };

        let weights = inverse_entropy_weights(real, ctx.cat_cols)?;

        let (in_dists, _) =
            knn_distance(real, real, ctx.cat_cols, 1, ctx.nn_dist, Some(&weights))?;
        let (ext_dists, _) =
            knn_distance(real, synt, ctx.cat_cols, 1, ctx.nn_dist, Some(&weights))?;

        // strict less-than: ties are not identifiable
        let identifiable = in_dists
            .column(0)
            .iter()
            .zip(ext_dists.column(0).iter())
            .filter(|(in_dist, ext_dist)| ext_dist < in_dist)
            .count();
        let risk = identifiable as f64 / real.n_rows() as f64;

        info!(
            event = "metric_evaluated",
            metric = self.name(),
            nn_dist = ctx.nn_dist.as_str(),
            eps_risk = risk
        );

        let mut results = MetricResults::default();
        results.insert_scalar(EPS_RISK, risk);
        Ok(results)
    }

    fn format_output(&self, results: &MetricResults) -> String {
        format!(
            "| Epsilon identifiability risk             :   {:.4}           |",
            results.scalar(EPS_RISK).unwrap_or(f64::NAN)
        )
    }

    fn normalize_output(&self, results: &MetricResults) -> Option<NormalizedScore> {
        let risk = results.scalar(EPS_RISK)?;
        Some(NormalizedScore {
            val: vec![(-5.0 * risk).exp()],
            err: vec![0.0],
        })
    }
}

/// Inverse-entropy weights for the non-categorical columns of a table,
/// in table order. The additive constant guards zero-entropy (constant)
/// columns.
fn inverse_entropy_weights(table: &DataTable, cat_cols: &[String]) -> Result<Vec<f64>> {
    let mut weights = Vec::new();
    for column in table.columns() {
        if cat_cols.contains(&column.name) {
            continue;
        }
        let values = table.numeric(&column.name)?;
        weights.push(1.0 / (column_entropy(values) + 1e-16));
    }
    Ok(weights)
}
