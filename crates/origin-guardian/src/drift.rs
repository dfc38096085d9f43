//! Energy history over a run.

/// Energies recorded at sample points.
#[derive(Debug, Clone, Default)]
pub struct DriftTracker {
    history: Vec<f64>,
}

impl DriftTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, energy: f64) {
        self.history.push(energy);
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Mean absolute change between consecutive records.
    pub fn average_drift(&self) -> f64 {
        if self.history.len() < 2 {
            return 0.0;
        }
        let sum: f64 = self.history.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
        sum / (self.history.len() - 1) as f64
    }

    /// Largest |E - E₀| / |E₀| over the history (absolute when E₀ is near zero).
    pub fn max_relative_drift(&self) -> f64 {
        let Some(&first) = self.history.first() else {
            return 0.0;
        };
        let scale = if first.abs() > 1e-12 { first.abs() } else { 1.0 };
        self.history
            .iter()
            .map(|e| (e - first).abs() / scale)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_tracker() {
        let tracker = DriftTracker::new();
        assert!(tracker.is_empty());
        assert_eq!(tracker.average_drift(), 0.0);
        assert_eq!(tracker.max_relative_drift(), 0.0);
    }

    #[test]
    fn test_drift_statistics() {
        let mut tracker = DriftTracker::new();
        for e in [2.0, 2.1, 1.9, 2.0] {
            tracker.record(e);
        }
        assert_eq!(tracker.len(), 4);
        // |0.1| + |-0.2| + |0.1| over three intervals
        assert_relative_eq!(tracker.average_drift(), 0.4 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(tracker.max_relative_drift(), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_first_energy_is_absolute() {
        let mut tracker = DriftTracker::new();
        tracker.record(0.0);
        tracker.record(0.25);
        assert_relative_eq!(tracker.max_relative_drift(), 0.25);
    }
}
