//! Turnout estimation: what share of the expected electorate has voted so far.

/// Derives the turnout percentage from a configured baseline of expected voters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnoutEstimator {
    expected_voters: u64,
}

impl TurnoutEstimator {
    pub fn new(expected_voters: u64) -> Self {
        Self { expected_voters }
    }

    pub fn expected_voters(&self) -> u64 {
        self.expected_voters
    }

    /// `total_votes / expected_voters * 100`, clamped to `[0, 100]`. A zero baseline yields 0.
    pub fn target(&self, total_votes: u64) -> f64 {
        if self.expected_voters == 0 {
            return 0.0;
        }

        (total_votes as f64 / self.expected_voters as f64 * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::TurnoutEstimator;

    #[test]
    fn proportional_turnout() {
        let estimator = TurnoutEstimator::new(50_000);
        assert_eq!(estimator.target(0), 0.0);
        assert_eq!(estimator.target(12_500), 25.0);
    }

    #[test]
    fn turnout_is_capped() {
        assert_eq!(TurnoutEstimator::new(100).target(250), 100.0);
    }

    #[test]
    fn zero_baseline() {
        assert_eq!(TurnoutEstimator::new(0).target(100), 0.0);
    }

    #[quickcheck]
    fn always_within_bounds(expected: u32, total: u32) -> bool {
        let target = TurnoutEstimator::new(expected as u64).target(total as u64);
        (0.0..=100.0).contains(&target)
    }
}
