//! Score normalisation.

/// Dampen a raw score by ontology size so very large ontologies do not win
/// on volume alone: `score / log2(2 + total_classes)`.
///
/// The divisor is at least 1, so a normalised score never exceeds the raw one.
pub fn normalise_by_size(score: f64, total_classes: u64) -> f64 {
    let divisor = (2.0 + total_classes as f64).log2();
    if divisor <= 0.0 {
        return score;
    }
    score / divisor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_classes_halves_score() {
        // log2(4) = 2
        assert!((normalise_by_size(20.0, 2) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic_in_size() {
        let small = normalise_by_size(100.0, 10);
        let large = normalise_by_size(100.0, 100_000);
        assert!(small > large);
        assert!(normalise_by_size(100.0, 0) <= 100.0);
    }

    #[test]
    fn test_zero_score_stays_zero() {
        assert_eq!(normalise_by_size(0.0, 42), 0.0);
    }
}
