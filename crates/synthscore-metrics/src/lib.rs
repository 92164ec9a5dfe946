//! Statistical metrics comparing a real dataset against a synthetically
//! generated counterpart.
//!
//! Utility metrics quantify how much statistical structure the synthetic
//! data preserves; privacy metrics quantify leakage of real records.
//! Every metric implements the [`Metric`] contract and is evaluated over
//! a shared [`MetricContext`].

pub mod association;
pub mod correlation;
pub mod distance;
pub mod entropy;
pub mod errors;
pub mod identifiability;
pub mod matrix;
pub mod metric;

pub use association::{correlation_ratio, cramers_v, pearson, spearman};
pub use correlation::MixedCorrelation;
pub use distance::{DistanceKind, knn_distance};
pub use entropy::column_entropy;
pub use errors::{MetricError, Result};
pub use identifiability::EpsilonIdentifiability;
pub use matrix::{NamedMatrix, mixed_correlation, pairwise_matrix, pearson_correlation};
pub use metric::{
    Metric, MetricContext, MetricKind, MetricResults, NormalizedScore, ResultValue,
};
