use std::collections::HashMap;

/// Shannon entropy (natural log) of the rounded value distribution of one
/// numeric column.
///
/// Values are discretized by rounding to the nearest integer (ties to
/// even) before counting; the result is 0 only when the column is
/// constant after rounding. Callers ensure the column is non-empty.
pub fn column_entropy(values: &[f64]) -> f64 {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    for value in values {
        *counts.entry(value.round_ties_even().to_bits()).or_insert(0) += 1;
    }

    let total = values.len() as f64;
    let mut entropy = 0.0;
    for count in counts.values() {
        let p = *count as f64 / total;
        entropy -= p * p.ln();
    }
    entropy
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn constant_column_has_zero_entropy() {
        assert_eq!(column_entropy(&[3.0; 40]), 0.0);
    }

    #[test]
    fn rounding_merges_nearby_values() {
        // 1.1 and 0.9 both round to 1
        assert_eq!(column_entropy(&[1.1, 0.9, 1.0]), 0.0);
    }

    #[test]
    fn uniform_values_reach_log_k() {
        let values = [1.0, 2.0, 3.0, 4.0, 1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(column_entropy(&values), 4.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn permutation_invariant() {
        let a = [1.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        let b = [3.0, 1.0, 3.0, 2.0, 1.0, 3.0];
        assert_relative_eq!(column_entropy(&a), column_entropy(&b), epsilon = 1e-12);
    }
}
