use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::table::{Column, ColumnData, ColumnRole, DataTable};

/// Load a CSV file into a [`DataTable`] using declared column roles.
///
/// The header row names the columns; every header must have a declared
/// role. Numeric cells must parse as floating point; empty cells are
/// rejected for numeric columns (the metrics have no missing-value
/// semantics).
pub fn load_table_csv(path: &Path, roles: &HashMap<String, ColumnRole>) -> Result<DataTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let headers = reader
        .headers()
        .map_err(Error::Csv)?
        .iter()
        .map(|header| header.to_string())
        .collect::<Vec<_>>();

    let mut builders = Vec::with_capacity(headers.len());
    for header in &headers {
        match roles.get(header) {
            Some(ColumnRole::Numeric) => builders.push(ColumnData::Numeric(Vec::new())),
            Some(ColumnRole::Categorical) => builders.push(ColumnData::Categorical(Vec::new())),
            None => return Err(Error::UnknownColumn(header.clone())),
        }
    }

    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        for (col_idx, header) in headers.iter().enumerate() {
            let raw = record.get(col_idx).unwrap_or_default().trim();
            match &mut builders[col_idx] {
                ColumnData::Numeric(values) => {
                    let value = raw.parse::<f64>().map_err(|_| Error::InvalidValue {
                        column: header.clone(),
                        row: row_idx as u64 + 1,
                        message: format!("invalid numeric '{raw}'"),
                    })?;
                    values.push(value);
                }
                ColumnData::Categorical(values) => values.push(raw.to_string()),
            }
        }
    }

    let columns = headers
        .into_iter()
        .zip(builders)
        .map(|(name, data)| Column { name, data })
        .collect();
    DataTable::new(columns)
}
