use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Role of a column in the analysis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Numeric,
    Categorical,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Numeric => "numeric",
            ColumnRole::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values of one column, stored columnar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn role(&self) -> ColumnRole {
        match self {
            ColumnData::Numeric(_) => ColumnRole::Numeric,
            ColumnData::Categorical(_) => ColumnRole::Categorical,
        }
    }
}

/// A named column with its values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn categorical(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values),
        }
    }

    pub fn role(&self) -> ColumnRole {
        self.data.role()
    }
}

/// In-memory table of named, typed columns.
///
/// Rows are aligned across columns; every column holds the same number of
/// values. Equality compares contents, which the distance utility relies
/// on to detect leave-one-out queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataTable {
    columns: Vec<Column>,
    n_rows: usize,
}

impl DataTable {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for column in &columns {
            if !seen.insert(column.name.clone()) {
                return Err(Error::InvalidTable(format!(
                    "duplicate column name: {}",
                    column.name
                )));
            }
        }

        let n_rows = columns.first().map(|column| column.data.len()).unwrap_or(0);
        for column in &columns {
            if column.data.len() != n_rows {
                return Err(Error::InvalidTable(format!(
                    "column '{}' has {} value(s), expected {}",
                    column.name,
                    column.data.len(),
                    n_rows
                )));
            }
        }

        Ok(Self { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Values of a numeric column.
    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        match self.column(name) {
            Some(column) => match &column.data {
                ColumnData::Numeric(values) => Ok(values),
                ColumnData::Categorical(_) => Err(Error::ColumnRole {
                    column: name.to_string(),
                    expected: ColumnRole::Numeric,
                }),
            },
            None => Err(Error::UnknownColumn(name.to_string())),
        }
    }

    /// Values of a categorical column.
    pub fn categorical(&self, name: &str) -> Result<&[String]> {
        match self.column(name) {
            Some(column) => match &column.data {
                ColumnData::Categorical(values) => Ok(values),
                ColumnData::Numeric(_) => Err(Error::ColumnRole {
                    column: name.to_string(),
                    expected: ColumnRole::Categorical,
                }),
            },
            None => Err(Error::UnknownColumn(name.to_string())),
        }
    }

    /// Restrict the table to the named columns, preserving the requested order.
    pub fn select(&self, names: &[String]) -> Result<DataTable> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let column = self
                .column(name)
                .ok_or_else(|| Error::UnknownColumn(name.clone()))?;
            columns.push(column.clone());
        }
        DataTable::new(columns)
    }
}
