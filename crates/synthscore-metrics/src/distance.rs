use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use synthscore_core::{ColumnData, DataTable};

use crate::errors::{MetricError, Result};

/// Distance metric keyword understood by [`knn_distance`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DistanceKind {
    /// Weighted Euclidean over numeric features only.
    Euclid,
    /// Gower-style mixed-type distance.
    Gower,
}

impl DistanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceKind::Euclid => "euclid",
            DistanceKind::Gower => "gower",
        }
    }
}

impl fmt::Display for DistanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceKind {
    type Err = MetricError;

    fn from_str(keyword: &str) -> Result<Self> {
        match keyword {
            "euclid" => Ok(DistanceKind::Euclid),
            "gower" => Ok(DistanceKind::Gower),
            other => Err(MetricError::UnknownDistanceMetric(other.to_string())),
        }
    }
}

/// Distances and reference row indices of the k nearest neighbors of each
/// query row, ascending by distance.
///
/// When query and reference are equal by contents the query is
/// leave-one-out: a row is never its own neighbor. `weights` align with
/// the non-categorical columns of the tables, in table order; missing
/// weights default to 1 per feature.
pub fn knn_distance(
    query: &DataTable,
    reference: &DataTable,
    cat_cols: &[String],
    k: usize,
    metric: DistanceKind,
    weights: Option<&[f64]>,
) -> Result<(Array2<f64>, Array2<usize>)> {
    check_compatible(query, reference)?;

    if query.n_cols() == 0 {
        return Err(MetricError::InvalidDistanceQuery(
            "query table has no columns".to_string(),
        ));
    }
    if reference.n_rows() == 0 {
        return Err(MetricError::InvalidDistanceQuery(
            "reference table has no rows".to_string(),
        ));
    }

    let leave_one_out = query == reference;
    let candidates = reference.n_rows() - usize::from(leave_one_out);
    if k == 0 {
        return Err(MetricError::InvalidDistanceQuery(
            "k must be at least 1".to_string(),
        ));
    }
    if k > candidates {
        return Err(MetricError::InvalidDistanceQuery(format!(
            "k={k} exceeds {candidates} candidate row(s)"
        )));
    }

    let full = match metric {
        DistanceKind::Euclid => euclid_distances(query, reference, weights)?,
        DistanceKind::Gower => gower_distances(query, reference, cat_cols, weights)?,
    };

    let n_query = query.n_rows();
    let mut distances = Array2::zeros((n_query, k));
    let mut indices = Array2::zeros((n_query, k));
    for i in 0..n_query {
        let mut row: Vec<(f64, usize)> = (0..reference.n_rows())
            .filter(|&j| !(leave_one_out && j == i))
            .map(|j| (full[[i, j]], j))
            .collect();
        row.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        for (slot, (dist, idx)) in row.into_iter().take(k).enumerate() {
            distances[[i, slot]] = dist;
            indices[[i, slot]] = idx;
        }
    }

    Ok((distances, indices))
}

fn check_compatible(query: &DataTable, reference: &DataTable) -> Result<()> {
    if query.n_cols() != reference.n_cols() {
        return Err(MetricError::InvalidDistanceQuery(format!(
            "query has {} column(s), reference has {}",
            query.n_cols(),
            reference.n_cols()
        )));
    }
    for (query_col, reference_col) in query.columns().iter().zip(reference.columns()) {
        if query_col.name != reference_col.name || query_col.role() != reference_col.role() {
            return Err(MetricError::InvalidDistanceQuery(format!(
                "query column '{}' ({}) does not match reference column '{}' ({})",
                query_col.name,
                query_col.role(),
                reference_col.name,
                reference_col.role()
            )));
        }
    }
    Ok(())
}

fn euclid_distances(
    query: &DataTable,
    reference: &DataTable,
    weights: Option<&[f64]>,
) -> Result<Array2<f64>> {
    if let Some(weights) = weights {
        if weights.len() != query.n_cols() {
            return Err(MetricError::WeightLength {
                got: weights.len(),
                expected: query.n_cols(),
            });
        }
    }

    let query_scaled = scaled_numeric_matrix(query, weights)?;
    let reference_scaled = scaled_numeric_matrix(reference, weights)?;

    let mut full = Array2::zeros((query.n_rows(), reference.n_rows()));
    for i in 0..query.n_rows() {
        for j in 0..reference.n_rows() {
            let mut sum = 0.0;
            for f in 0..query.n_cols() {
                let diff = query_scaled[[i, f]] - reference_scaled[[j, f]];
                sum += diff * diff;
            }
            full[[i, j]] = sum.sqrt();
        }
    }
    Ok(full)
}

/// Feature columns scaled by the per-feature weights.
fn scaled_numeric_matrix(table: &DataTable, weights: Option<&[f64]>) -> Result<Array2<f64>> {
    let mut matrix = Array2::zeros((table.n_rows(), table.n_cols()));
    for (col_idx, column) in table.columns().iter().enumerate() {
        let values = match &column.data {
            ColumnData::Numeric(values) => values,
            ColumnData::Categorical(_) => {
                return Err(MetricError::NonNumericColumn(column.name.clone()));
            }
        };
        let weight = weights.map(|weights| weights[col_idx]).unwrap_or(1.0);
        for (row_idx, value) in values.iter().enumerate() {
            matrix[[row_idx, col_idx]] = value * weight;
        }
    }
    Ok(matrix)
}

enum GowerFeature<'a> {
    Numeric {
        query: &'a [f64],
        reference: &'a [f64],
        weight: f64,
        range: f64,
    },
    Categorical {
        query: &'a [String],
        reference: &'a [String],
    },
}

fn gower_distances(
    query: &DataTable,
    reference: &DataTable,
    cat_cols: &[String],
    weights: Option<&[f64]>,
) -> Result<Array2<f64>> {
    let numeric_count = query
        .columns()
        .iter()
        .filter(|column| !cat_cols.contains(&column.name))
        .count();
    if let Some(weights) = weights {
        if weights.len() != numeric_count {
            return Err(MetricError::WeightLength {
                got: weights.len(),
                expected: numeric_count,
            });
        }
    }

    let mut features = Vec::with_capacity(query.n_cols());
    let mut weight_sum = 0.0;
    let mut cat_count = 0.0;
    let mut numeric_idx = 0;
    for column in query.columns() {
        if cat_cols.contains(&column.name) {
            features.push(GowerFeature::Categorical {
                query: query.categorical(&column.name)?,
                reference: reference.categorical(&column.name)?,
            });
            cat_count += 1.0;
        } else {
            let query_values = query.numeric(&column.name)?;
            let reference_values = reference.numeric(&column.name)?;
            // range over both tables combined
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for value in query_values.iter().chain(reference_values) {
                min = min.min(*value);
                max = max.max(*value);
            }
            let weight = weights.map(|weights| weights[numeric_idx]).unwrap_or(1.0);
            weight_sum += weight;
            numeric_idx += 1;
            features.push(GowerFeature::Numeric {
                query: query_values,
                reference: reference_values,
                weight,
                range: max - min,
            });
        }
    }

    let denominator = weight_sum + cat_count;
    if denominator == 0.0 {
        return Err(MetricError::InvalidDistanceQuery(
            "gower distance has no usable features".to_string(),
        ));
    }

    let mut full = Array2::zeros((query.n_rows(), reference.n_rows()));
    for i in 0..query.n_rows() {
        for j in 0..reference.n_rows() {
            let mut sum = 0.0;
            for feature in &features {
                match feature {
                    GowerFeature::Numeric {
                        query,
                        reference,
                        weight,
                        range,
                    } => {
                        if *range > 0.0 {
                            sum += weight * (query[i] - reference[j]).abs() / range;
                        }
                    }
                    GowerFeature::Categorical { query, reference } => {
                        if query[i] != reference[j] {
                            sum += 1.0;
                        }
                    }
                }
            }
            full[[i, j]] = sum / denominator;
        }
    }
    Ok(full)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use synthscore_core::Column;

    use super::*;

    fn numeric_table(values: &[(f64, f64)]) -> DataTable {
        DataTable::new(vec![
            Column::numeric("x", values.iter().map(|(x, _)| *x).collect()),
            Column::numeric("y", values.iter().map(|(_, y)| *y).collect()),
        ])
        .expect("valid table")
    }

    #[test]
    fn euclid_finds_the_hand_checked_neighbor() {
        let query = numeric_table(&[(0.0, 0.0)]);
        let reference = numeric_table(&[(3.0, 4.0), (1.0, 1.0), (10.0, 10.0)]);
        let (dists, idx) =
            knn_distance(&query, &reference, &[], 2, DistanceKind::Euclid, None)
                .expect("distances compute");
        assert_relative_eq!(dists[[0, 0]], 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(idx[[0, 0]], 1);
        assert_relative_eq!(dists[[0, 1]], 5.0, epsilon = 1e-12);
        assert_eq!(idx[[0, 1]], 0);
    }

    #[test]
    fn euclid_weights_rescale_features() {
        let query = numeric_table(&[(0.0, 0.0)]);
        let reference = numeric_table(&[(1.0, 0.0), (0.0, 2.0)]);
        // upweight x so the y-offset row becomes the nearer one
        let (dists, idx) = knn_distance(
            &query,
            &reference,
            &[],
            1,
            DistanceKind::Euclid,
            Some(&[3.0, 1.0]),
        )
        .expect("distances compute");
        assert_eq!(idx[[0, 0]], 1);
        assert_relative_eq!(dists[[0, 0]], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn leave_one_out_never_returns_the_query_row() {
        let table = numeric_table(&[(0.0, 0.0), (1.0, 0.0), (5.0, 0.0)]);
        let (dists, idx) =
            knn_distance(&table, &table, &[], 1, DistanceKind::Euclid, None)
                .expect("distances compute");
        for i in 0..table.n_rows() {
            assert_ne!(idx[[i, 0]], i);
            assert!(dists[[i, 0]] > 0.0);
        }
    }

    #[test]
    fn euclid_rejects_categorical_columns() {
        let table = DataTable::new(vec![
            Column::numeric("x", vec![1.0, 2.0]),
            Column::categorical("c", vec!["a".to_string(), "b".to_string()]),
        ])
        .expect("valid table");
        assert!(matches!(
            knn_distance(&table, &table, &[], 1, DistanceKind::Euclid, None),
            Err(MetricError::NonNumericColumn(_))
        ));
    }

    #[test]
    fn euclid_rejects_wrong_weight_length() {
        let query = numeric_table(&[(0.0, 0.0)]);
        let reference = numeric_table(&[(1.0, 1.0)]);
        assert!(matches!(
            knn_distance(
                &query,
                &reference,
                &[],
                1,
                DistanceKind::Euclid,
                Some(&[1.0])
            ),
            Err(MetricError::WeightLength { got: 1, expected: 2 })
        ));
    }

    #[test]
    fn rejects_k_beyond_candidates() {
        let table = numeric_table(&[(0.0, 0.0), (1.0, 1.0)]);
        // leave-one-out leaves a single candidate per row
        assert!(matches!(
            knn_distance(&table, &table, &[], 2, DistanceKind::Euclid, None),
            Err(MetricError::InvalidDistanceQuery(_))
        ));
    }

    #[test]
    fn gower_mixes_categorical_and_numeric_features() {
        let cat_cols = vec!["color".to_string()];
        let query = DataTable::new(vec![
            Column::numeric("x", vec![0.0]),
            Column::categorical("color", vec!["red".to_string()]),
        ])
        .expect("valid table");
        let reference = DataTable::new(vec![
            Column::numeric("x", vec![10.0, 0.0]),
            Column::categorical("color", vec!["red".to_string(), "blue".to_string()]),
        ])
        .expect("valid table");

        let (dists, idx) =
            knn_distance(&query, &reference, &cat_cols, 2, DistanceKind::Gower, None)
                .expect("distances compute");
        // row 0: numeric 10/10 = 1, categorical match -> (1 + 0) / 2
        // row 1: numeric 0, categorical mismatch -> (0 + 1) / 2
        assert_relative_eq!(dists[[0, 0]], 0.5, epsilon = 1e-12);
        assert!(idx[[0, 0]] == 0 || idx[[0, 0]] == 1);
        assert_relative_eq!(dists[[0, 1]], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn gower_zero_range_feature_contributes_nothing() {
        let query = DataTable::new(vec![Column::numeric("x", vec![5.0])]).expect("valid table");
        let reference =
            DataTable::new(vec![Column::numeric("x", vec![5.0, 5.0])]).expect("valid table");
        let (dists, _) = knn_distance(&query, &reference, &[], 1, DistanceKind::Gower, None)
            .expect("distances compute");
        assert_eq!(dists[[0, 0]], 0.0);
    }

    #[test]
    fn keyword_parsing_round_trips() {
        assert_eq!("euclid".parse::<DistanceKind>().ok(), Some(DistanceKind::Euclid));
        assert_eq!("gower".parse::<DistanceKind>().ok(), Some(DistanceKind::Gower));
        assert!(matches!(
            "cosine".parse::<DistanceKind>(),
            Err(MetricError::UnknownDistanceMetric(_))
        ));
    }
}
