use ndarray::{Array2, s};
use serde::{Deserialize, Serialize};

use synthscore_core::DataTable;

use crate::association::{correlation_ratio, cramers_v, pearson, spearman};
use crate::errors::{MetricError, Result};

/// Rectangular matrix indexed by column names on both axes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedMatrix {
    rows: Vec<String>,
    cols: Vec<String>,
    values: Array2<f64>,
}

impl NamedMatrix {
    pub fn new(rows: Vec<String>, cols: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if values.dim() != (rows.len(), cols.len()) {
            return Err(MetricError::AxisMismatch(format!(
                "{}x{} values for {} row label(s) and {} column label(s)",
                values.nrows(),
                values.ncols(),
                rows.len(),
                cols.len()
            )));
        }
        Ok(Self { rows, cols, values })
    }

    pub fn row_labels(&self) -> &[String] {
        &self.rows
    }

    pub fn col_labels(&self) -> &[String] {
        &self.cols
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Entry addressed by row and column label.
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let row_idx = self.rows.iter().position(|label| label == row)?;
        let col_idx = self.cols.iter().position(|label| label == col)?;
        Some(self.values[[row_idx, col_idx]])
    }

    pub fn transposed(&self) -> NamedMatrix {
        NamedMatrix {
            rows: self.cols.clone(),
            cols: self.rows.clone(),
            values: self.values.t().to_owned(),
        }
    }

    /// Element-wise difference; both axes must carry identical labels.
    pub fn sub(&self, other: &NamedMatrix) -> Result<NamedMatrix> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(MetricError::AxisMismatch(
                "subtraction requires identical row and column labels".to_string(),
            ));
        }
        Ok(NamedMatrix {
            rows: self.rows.clone(),
            cols: self.cols.clone(),
            values: &self.values - &other.values,
        })
    }

    /// Square root of the sum of squared entries.
    pub fn frobenius_norm(&self) -> f64 {
        self.values.iter().map(|value| value * value).sum::<f64>().sqrt()
    }
}

/// Build the matrix with entry (i, j) = `func(col_i, col_j)` over the
/// cross product of two column-name lists, preserving list order on both
/// axes.
pub fn pairwise_matrix<F>(
    data: &DataTable,
    func: F,
    row_cols: &[String],
    col_cols: &[String],
) -> Result<NamedMatrix>
where
    F: Fn(&DataTable, &str, &str) -> Result<f64>,
{
    let mut values = Array2::zeros((row_cols.len(), col_cols.len()));
    for (i, row) in row_cols.iter().enumerate() {
        for (j, col) in col_cols.iter().enumerate() {
            values[[i, j]] = func(data, row, col)?;
        }
    }
    NamedMatrix::new(row_cols.to_vec(), col_cols.to_vec(), values)
}

/// Mixed-type association matrix over one table.
///
/// Spearman's rho for numeric pairs, Cramér's V for categorical pairs,
/// and the correlation ratio for categorical-numeric pairs. The blocks
/// are assembled as [categorical..., numeric...] on both axes, and the
/// diagonal is forced to exactly 1 to present a uniform self-association
/// convention (the correlation ratio is not self-normalized).
pub fn mixed_correlation(
    data: &DataTable,
    num_cols: &[String],
    cat_cols: &[String],
) -> Result<NamedMatrix> {
    let corr_num_num = pairwise_matrix(
        data,
        |table, a, b| spearman(table.numeric(a)?, table.numeric(b)?),
        num_cols,
        num_cols,
    )?;
    let corr_cat_cat = pairwise_matrix(
        data,
        |table, a, b| cramers_v(table.categorical(a)?, table.categorical(b)?),
        cat_cols,
        cat_cols,
    )?;
    let corr_cat_num = pairwise_matrix(
        data,
        |table, a, b| correlation_ratio(table.categorical(a)?, table.numeric(b)?),
        cat_cols,
        num_cols,
    )?;

    let n_cat = cat_cols.len();
    let n = n_cat + num_cols.len();
    let mut values = Array2::zeros((n, n));
    values
        .slice_mut(s![..n_cat, ..n_cat])
        .assign(corr_cat_cat.values());
    values
        .slice_mut(s![..n_cat, n_cat..])
        .assign(corr_cat_num.values());
    values
        .slice_mut(s![n_cat.., ..n_cat])
        .assign(&corr_cat_num.values().t());
    values
        .slice_mut(s![n_cat.., n_cat..])
        .assign(corr_num_num.values());

    for i in 0..n {
        values[[i, i]] = 1.0;
    }

    let labels: Vec<String> = cat_cols.iter().chain(num_cols).cloned().collect();
    NamedMatrix::new(labels.clone(), labels, values)
}

/// Pearson correlation matrix over the numeric columns only.
pub fn pearson_correlation(data: &DataTable, num_cols: &[String]) -> Result<NamedMatrix> {
    pairwise_matrix(
        data,
        |table, a, b| pearson(table.numeric(a)?, table.numeric(b)?),
        num_cols,
        num_cols,
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use synthscore_core::Column;

    use super::*;

    fn sample_table() -> DataTable {
        DataTable::new(vec![
            Column::categorical(
                "sex",
                ["m", "f", "m", "f", "m", "f"]
                    .iter()
                    .map(|value| value.to_string())
                    .collect(),
            ),
            Column::numeric("age", vec![34.0, 29.0, 51.0, 44.0, 38.0, 25.0]),
            Column::numeric("income", vec![51.0, 42.0, 73.0, 60.0, 55.0, 39.0]),
        ])
        .expect("valid table")
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn mixed_matrix_orders_categorical_then_numeric() {
        let table = sample_table();
        let matrix = mixed_correlation(&table, &names(&["age", "income"]), &names(&["sex"]))
            .expect("matrix computes");
        assert_eq!(matrix.row_labels(), &names(&["sex", "age", "income"]));
        assert_eq!(matrix.col_labels(), matrix.row_labels());
    }

    #[test]
    fn mixed_matrix_diagonal_is_exactly_one() {
        let table = sample_table();
        let matrix = mixed_correlation(&table, &names(&["age", "income"]), &names(&["sex"]))
            .expect("matrix computes");
        for label in matrix.row_labels() {
            assert_eq!(matrix.get(label, label), Some(1.0));
        }
    }

    #[test]
    fn mixed_matrix_mirrors_cat_num_block() {
        let table = sample_table();
        let matrix = mixed_correlation(&table, &names(&["age", "income"]), &names(&["sex"]))
            .expect("matrix computes");
        assert_relative_eq!(
            matrix.get("sex", "age").unwrap_or(f64::NAN),
            matrix.get("age", "sex").unwrap_or(f64::NAN),
            epsilon = 1e-12
        );
    }

    #[test]
    fn pairwise_matrix_preserves_list_order() {
        let table = sample_table();
        let matrix = pairwise_matrix(
            &table,
            |data, a, b| pearson(data.numeric(a)?, data.numeric(b)?),
            &names(&["income", "age"]),
            &names(&["age"]),
        )
        .expect("matrix computes");
        assert_eq!(matrix.row_labels(), &names(&["income", "age"]));
        assert_eq!(matrix.col_labels(), &names(&["age"]));
        assert_relative_eq!(
            matrix.get("age", "age").unwrap_or(f64::NAN),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn frobenius_norm_of_difference() {
        let left = NamedMatrix::new(
            names(&["a", "b"]),
            names(&["a", "b"]),
            array![[1.0, 0.5], [0.5, 1.0]],
        )
        .expect("valid matrix");
        let right = NamedMatrix::new(
            names(&["a", "b"]),
            names(&["a", "b"]),
            array![[1.0, 0.1], [0.1, 1.0]],
        )
        .expect("valid matrix");
        let diff = left.sub(&right).expect("axes match");
        assert_relative_eq!(diff.frobenius_norm(), (2.0_f64 * 0.4 * 0.4).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn sub_rejects_mismatched_axes() {
        let left = NamedMatrix::new(names(&["a"]), names(&["a"]), array![[1.0]])
            .expect("valid matrix");
        let right = NamedMatrix::new(names(&["b"]), names(&["b"]), array![[1.0]])
            .expect("valid matrix");
        assert!(matches!(
            left.sub(&right),
            Err(MetricError::AxisMismatch(_))
        ));
    }
}
