use crate::error::{Error, Result};
use crate::table::DataTable;

/// Validate that real, synthetic, and optional holdout tables share one schema.
///
/// The tables must carry the same column names in the same order with the
/// same roles; the first divergence is reported.
pub fn validate_schemas(
    real: &DataTable,
    synt: &DataTable,
    hout: Option<&DataTable>,
) -> Result<()> {
    compare_schema("synthetic", real, synt)?;
    if let Some(hout) = hout {
        compare_schema("holdout", real, hout)?;
    }
    Ok(())
}

fn compare_schema(label: &str, real: &DataTable, other: &DataTable) -> Result<()> {
    if real.n_cols() != other.n_cols() {
        return Err(Error::SchemaMismatch(format!(
            "{label} table has {} column(s), real has {}",
            other.n_cols(),
            real.n_cols()
        )));
    }

    for (real_col, other_col) in real.columns().iter().zip(other.columns()) {
        if real_col.name != other_col.name {
            return Err(Error::SchemaMismatch(format!(
                "{label} table has column '{}' where real has '{}'",
                other_col.name, real_col.name
            )));
        }
        if real_col.role() != other_col.role() {
            return Err(Error::SchemaMismatch(format!(
                "column '{}' is {} in the {label} table but {} in real",
                real_col.name,
                other_col.role(),
                real_col.role()
            )));
        }
    }

    Ok(())
}
