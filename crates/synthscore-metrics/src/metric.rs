use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use synthscore_core::DataTable;

use crate::distance::DistanceKind;
use crate::errors::Result;
use crate::matrix::NamedMatrix;

/// Category a metric contributes to in aggregate scoring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Privacy,
    Utility,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Privacy => "privacy",
            MetricKind::Utility => "utility",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared evaluation inputs borrowed by every metric.
///
/// `cat_cols` and `num_cols` partition the analyzed columns; they are
/// disjoint and consistent with the column roles of the tables.
#[derive(Debug, Clone)]
pub struct MetricContext<'a> {
    pub real: &'a DataTable,
    pub synt: &'a DataTable,
    pub hout: Option<&'a DataTable>,
    pub cat_cols: &'a [String],
    pub num_cols: &'a [String],
    pub nn_dist: DistanceKind,
    pub analysis_target: Option<&'a str>,
    pub verbose: bool,
}

impl<'a> MetricContext<'a> {
    pub fn new(
        real: &'a DataTable,
        synt: &'a DataTable,
        cat_cols: &'a [String],
        num_cols: &'a [String],
    ) -> Self {
        Self {
            real,
            synt,
            hout: None,
            cat_cols,
            num_cols,
            nn_dist: DistanceKind::Gower,
            analysis_target: None,
            verbose: false,
        }
    }
}

/// One stored metric result value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ResultValue {
    Scalar(f64),
    Matrix(NamedMatrix),
}

/// Ordered mapping of result keys produced by one `evaluate` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricResults {
    #[serde(flatten)]
    values: BTreeMap<String, ResultValue>,
}

impl MetricResults {
    pub fn insert_scalar(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), ResultValue::Scalar(value));
    }

    pub fn insert_matrix(&mut self, key: impl Into<String>, value: NamedMatrix) {
        self.values.insert(key.into(), ResultValue::Matrix(value));
    }

    pub fn scalar(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            Some(ResultValue::Scalar(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn matrix(&self, key: &str) -> Option<&NamedMatrix> {
        match self.values.get(key) {
            Some(ResultValue::Matrix(value)) => Some(value),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResultValue)> {
        self.values.iter()
    }
}

/// Normalized goodness score on the unit interval, zero worst and one best.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedScore {
    pub val: Vec<f64>,
    pub err: Vec<f64>,
}

/// Capability contract every metric implements.
///
/// `evaluate` computes over the context datasets and returns the results
/// record by value; `format_output` and `normalize_output` read it back.
pub trait Metric {
    /// Short keyword referencing the metric.
    fn name(&self) -> &'static str;

    /// Whether the metric scores privacy or utility.
    fn kind(&self) -> MetricKind;

    /// Compute the metric over the context datasets.
    fn evaluate(&self, ctx: &MetricContext<'_>) -> Result<MetricResults>;

    /// Fixed-width report line for the results.
    fn format_output(&self, results: &MetricResults) -> String;

    /// Map the results onto [0, 1] goodness, or `None` to exclude the
    /// metric from aggregate scoring.
    fn normalize_output(&self, results: &MetricResults) -> Option<NormalizedScore>;
}
