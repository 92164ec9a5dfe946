use thiserror::Error;

/// Errors emitted by the metric computations.
#[derive(Debug, Error)]
pub enum MetricError {
    /// Shared dataset-model error (schema, column lookup, roles).
    #[error(transparent)]
    Core(#[from] synthscore_core::Error),
    /// The distance utility was asked for an unusable configuration.
    #[error("invalid distance query: {0}")]
    InvalidDistanceQuery(String),
    /// A categorical column reached the numeric-only euclid distance.
    #[error("column '{0}' is categorical; euclid distance is numeric-only")]
    NonNumericColumn(String),
    /// Weight vector length does not match the numeric feature count.
    #[error("weight length {got} does not match {expected} numeric feature(s)")]
    WeightLength { got: usize, expected: usize },
    /// Column vectors passed to an association measure differ in length.
    #[error("association inputs differ in length: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
    /// Two matrices with different axes were combined.
    #[error("matrix axes differ: {0}")]
    AxisMismatch(String),
    /// The requested keyword does not name a known distance metric.
    #[error("unknown distance metric: {0}")]
    UnknownDistanceMetric(String),
}

/// Convenience alias for results returned by the metric computations.
pub type Result<T> = std::result::Result<T, MetricError>;
