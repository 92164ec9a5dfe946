use std::cmp::Ordering;
use std::collections::HashMap;

use crate::errors::{MetricError, Result};

/// Guard against zero denominators in degenerate tables.
const EPS: f64 = 1e-16;

/// Cramér's V association between two categorical columns.
///
/// The chi-squared independence statistic of the contingency table,
/// normalized by `observations * (min(rows, cols) - 1)`. Reported without
/// the square root, as the normalized statistic. A single-category column
/// degenerates the denominator to the ε-guard.
pub fn cramers_v(left: &[String], right: &[String]) -> Result<f64> {
    check_lengths(left.len(), right.len())?;

    let crosstab = contingency_table(left, right);
    let stat = chi_squared(&crosstab);
    let obs = left.len() as f64;
    let mini = (crosstab.len().min(crosstab[0].len()) - 1) as f64;
    Ok(stat / (obs * mini + EPS))
}

/// Correlation ratio η² between categorical labels and numeric
/// measurements.
///
/// Weighted variance of the per-category means around the grand mean,
/// over the total variance of the measurements. Exactly 0 when the
/// numerator is 0, which covers constant measurements. The argument order
/// is fixed: categories first.
pub fn correlation_ratio(categories: &[String], measurements: &[f64]) -> Result<f64> {
    check_lengths(categories.len(), measurements.len())?;

    let codes = factorize(categories);
    let cat_num = codes.iter().max().map(|max| max + 1).unwrap_or(0);

    let mut group_sums = vec![0.0; cat_num];
    let mut group_counts = vec![0.0; cat_num];
    for (code, value) in codes.iter().zip(measurements) {
        group_sums[*code] += value;
        group_counts[*code] += 1.0;
    }

    let total: f64 = group_counts.iter().sum();
    let grand_mean = group_sums.iter().sum::<f64>() / total;

    let mut numerator = 0.0;
    for (sum, count) in group_sums.iter().zip(&group_counts) {
        let group_mean = sum / count;
        numerator += count * (group_mean - grand_mean).powi(2);
    }

    if numerator == 0.0 {
        return Ok(0.0);
    }

    let denominator: f64 = measurements
        .iter()
        .map(|value| (value - grand_mean).powi(2))
        .sum();
    Ok(numerator / denominator)
}

/// Pearson linear correlation between two numeric columns.
///
/// NaN when either column has zero variance; callers validate column
/// non-degeneracy.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    check_lengths(x.len(), y.len())?;

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    Ok(cov / (var_x * var_y).sqrt())
}

/// Spearman rank correlation between two numeric columns.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<f64> {
    check_lengths(x.len(), y.len())?;
    pearson(&rank(x), &rank(y))
}

/// Dense integer codes for labels, in order of first appearance.
pub(crate) fn factorize(labels: &[String]) -> Vec<usize> {
    let mut codes: HashMap<&str, usize> = HashMap::new();
    labels
        .iter()
        .map(|label| {
            let next = codes.len();
            *codes.entry(label.as_str()).or_insert(next)
        })
        .collect()
}

/// Fractional ranks (1-based), with tied values receiving their average
/// rank.
fn rank(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        // average of 1-based ranks start+1..=end+1
        let tied_rank = (start + end) as f64 / 2.0 + 1.0;
        for &idx in &order[start..=end] {
            ranks[idx] = tied_rank;
        }
        start = end + 1;
    }
    ranks
}

fn contingency_table(left: &[String], right: &[String]) -> Vec<Vec<f64>> {
    let row_codes = factorize(left);
    let col_codes = factorize(right);
    let n_rows = row_codes.iter().max().map(|max| max + 1).unwrap_or(1);
    let n_cols = col_codes.iter().max().map(|max| max + 1).unwrap_or(1);

    let mut table = vec![vec![0.0; n_cols]; n_rows];
    for (row, col) in row_codes.iter().zip(&col_codes) {
        table[*row][*col] += 1.0;
    }
    table
}

/// Pearson chi-squared independence statistic of a contingency table,
/// with the Yates continuity correction on single-degree-of-freedom
/// (2x2) tables.
fn chi_squared(observed: &[Vec<f64>]) -> f64 {
    let n_rows = observed.len();
    let n_cols = observed[0].len();

    let row_sums: Vec<f64> = observed.iter().map(|row| row.iter().sum()).collect();
    let col_sums: Vec<f64> = (0..n_cols)
        .map(|col| observed.iter().map(|row| row[col]).sum())
        .collect();
    let total: f64 = row_sums.iter().sum();

    let dof = (n_rows - 1) * (n_cols - 1);
    if dof == 0 {
        return 0.0;
    }

    let mut stat = 0.0;
    for (row, row_sum) in observed.iter().zip(&row_sums) {
        for (cell, col_sum) in row.iter().zip(&col_sums) {
            let expected = row_sum * col_sum / total;
            let shift = expected - cell;
            let cell = if dof == 1 && shift != 0.0 {
                cell + 0.5 * shift.signum()
            } else {
                *cell
            };
            stat += (cell - expected).powi(2) / expected;
        }
    }
    stat
}

fn check_lengths(left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(MetricError::LengthMismatch { left, right });
    }
    Ok(())
}
