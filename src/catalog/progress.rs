/// Percentage of enumerated entries processed during a scan.
///
/// Every enumerated entry advances the tracker, ignored ones included, so the
/// final entry always lands on exactly 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanProgressTracker {
    total: usize,
    processed: usize,
}

impl ScanProgressTracker {
    pub fn start(total: usize) -> Self {
        Self {
            total,
            processed: 0,
        }
    }

    /// Record one processed entry and return the updated percentage.
    pub fn advance(&mut self) -> u8 {
        self.processed = (self.processed + 1).min(self.total);
        self.percent()
    }

    /// Rounded `processed / total * 100`; an empty scan is already complete.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let total = self.total as u128;
        let processed = self.processed.min(self.total) as u128;
        let rounded = (processed * 200 + total) / (2 * total);
        rounded.min(100) as u8
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scan_reports_complete() {
        let tracker = ScanProgressTracker::start(0);
        assert_eq!(tracker.percent(), 100);
        assert!(tracker.is_complete());
    }

    #[test]
    fn reaches_exactly_100_and_never_decreases() {
        for total in [1, 2, 3, 7, 199, 1000] {
            let mut tracker = ScanProgressTracker::start(total);
            let mut last = tracker.percent();
            assert_eq!(last, 0);
            for _ in 0..total {
                let percent = tracker.advance();
                assert!(percent >= last, "progress went backwards for total {total}");
                assert!(percent <= 100);
                last = percent;
            }
            assert_eq!(last, 100, "total {total}");
        }
    }

    #[test]
    fn rounds_to_nearest_percent() {
        let mut tracker = ScanProgressTracker::start(3);
        assert_eq!(tracker.advance(), 33);
        assert_eq!(tracker.advance(), 67);
        assert_eq!(tracker.advance(), 100);
    }

    #[test]
    fn extra_advances_stay_clamped() {
        let mut tracker = ScanProgressTracker::start(2);
        tracker.advance();
        tracker.advance();
        assert_eq!(tracker.advance(), 100);
        assert_eq!(tracker.processed(), 2);
    }
}
