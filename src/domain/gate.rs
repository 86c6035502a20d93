// Throttle/movement gate for location reports
use crate::domain::position::{Position, degree_distance};

/// Minimum displacement in degree space before a new report is allowed.
/// Roughly 50 m at equatorial latitudes; see `degree_distance` for why this is
/// an approximation.
pub const MOVEMENT_THRESHOLD_DEG: f64 = 0.0005;

/// Minimum interval between accepted reports.
pub const MIN_REPORT_INTERVAL_MS: i64 = 30_000;

/// The last sample that was successfully reported. Owned exclusively by the
/// gate, created at session start, discarded at session end. Never persisted
/// and never shared as process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LastReportedSample {
    pub time_ms: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    Forward,
    /// Dropped: moved less than the threshold since the last report.
    TooClose,
    /// Dropped: less than the minimum interval since the last report.
    TooSoon,
}

/// Decides whether a sample is worth reporting. Both the movement test and the
/// time test must pass. The baseline advances only via `commit`, which callers
/// invoke after a successful report; a failed report leaves the gate unchanged
/// so the next sample is judged against the old baseline.
#[derive(Debug, Clone, Default)]
pub struct ReportGate {
    last: LastReportedSample,
}

impl ReportGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&self, position: &Position, now_ms: i64) -> GateDecision {
        // No report yet: the first sample always goes through, regardless of
        // what clock the fix timestamps run on.
        let Some(baseline) = self.baseline() else {
            return GateDecision::Forward;
        };
        if degree_distance(position, &baseline) <= MOVEMENT_THRESHOLD_DEG {
            return GateDecision::TooClose;
        }
        if now_ms - self.last.time_ms < MIN_REPORT_INTERVAL_MS {
            return GateDecision::TooSoon;
        }
        GateDecision::Forward
    }

    pub fn commit(&mut self, position: &Position, now_ms: i64) {
        self.last = LastReportedSample {
            time_ms: now_ms,
            latitude: Some(position.latitude),
            longitude: Some(position.longitude),
        };
    }

    pub fn last_reported(&self) -> &LastReportedSample {
        &self.last
    }

    fn baseline(&self) -> Option<Position> {
        match (self.last.latitude, self.last.longitude) {
            (Some(latitude), Some(longitude)) => Some(Position {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(lat: f64, lon: f64) -> Position {
        Position::new(lat, lon).unwrap()
    }

    #[test]
    fn test_first_sample_always_forwards() {
        let gate = ReportGate::new();
        assert_eq!(
            gate.evaluate(&pos(12.9716, 77.5946), 0),
            GateDecision::Forward
        );
    }

    #[test]
    fn test_first_sample_forwards_on_session_clock() {
        // A session-relative clock hands the gate timestamps well under the
        // report interval; an unset baseline must still forward.
        let gate = ReportGate::new();
        assert_eq!(
            gate.evaluate(&pos(12.9716, 77.5946), 1_000),
            GateDecision::Forward
        );
    }

    #[test]
    fn test_small_move_within_interval_dropped() {
        // Two samples 1 s apart, degree distance about 0.00014: fails both tests.
        let mut gate = ReportGate::new();
        gate.commit(&pos(12.0000, 77.0000), 1_000);
        assert_eq!(
            gate.evaluate(&pos(12.0001, 77.0001), 2_000),
            GateDecision::TooClose
        );
    }

    #[test]
    fn test_small_move_after_interval_still_dropped() {
        let mut gate = ReportGate::new();
        gate.commit(&pos(12.0000, 77.0000), 0);
        assert_eq!(
            gate.evaluate(&pos(12.0001, 77.0001), 60_000),
            GateDecision::TooClose
        );
    }

    #[test]
    fn test_large_move_within_interval_dropped() {
        let mut gate = ReportGate::new();
        gate.commit(&pos(12.0000, 77.0000), 0);
        assert_eq!(
            gate.evaluate(&pos(12.0100, 77.0000), 29_999),
            GateDecision::TooSoon
        );
    }

    #[test]
    fn test_large_move_after_interval_forwards() {
        let mut gate = ReportGate::new();
        gate.commit(&pos(12.0000, 77.0000), 0);
        assert_eq!(
            gate.evaluate(&pos(12.0100, 77.0000), 30_000),
            GateDecision::Forward
        );
    }

    #[test]
    fn test_commit_advances_baseline() {
        let mut gate = ReportGate::new();
        gate.commit(&pos(12.5, 77.5), 42_000);
        assert_eq!(
            gate.last_reported(),
            &LastReportedSample {
                time_ms: 42_000,
                latitude: Some(12.5),
                longitude: Some(77.5),
            }
        );
    }

    #[test]
    fn test_threshold_boundary() {
        // A displacement of 0.0005 degrees is not exactly representable, so
        // probe the boundary from clearly-below and clearly-above sides.
        let mut gate = ReportGate::new();
        gate.commit(&pos(12.0, 77.0), 0);
        assert_eq!(
            gate.evaluate(&pos(12.0004, 77.0), 60_000),
            GateDecision::TooClose
        );
        assert_eq!(
            gate.evaluate(&pos(12.00051, 77.0), 60_000),
            GateDecision::Forward
        );
    }
}
