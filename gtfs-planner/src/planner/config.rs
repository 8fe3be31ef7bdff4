//! Routing policy for the journey planner.

use chrono::Duration;

/// Tunable parameters of a planning request.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingPolicy {
    /// Maximum number of changes; paths have at most `max_transfers + 1` edges.
    pub max_transfers: usize,

    /// Number of candidate station paths evaluated against the timetable.
    pub max_paths: usize,

    /// How long after the requested time a first departure may leave (minutes).
    pub departure_window_mins: i64,

    /// Longest wait accepted when changing trains (minutes).
    pub transfer_window_mins: i64,

    /// Journeys arriving more than this after the earliest arrival are dropped (minutes).
    pub arrival_slack_mins: i64,

    /// Bounding box margin around origin and destination, in degrees latitude.
    pub lat_margin: f64,

    /// Bounding box margin around origin and destination, in degrees longitude.
    pub lon_margin: f64,

    /// Reject changes onto a trip with the same headsign and long name as
    /// the current one: it is the same service continuing.
    pub exclude_same_service: bool,

    /// Budget for a whole planning request (milliseconds).
    pub deadline_ms: u64,

    /// How far ahead a departure board looks (minutes).
    pub board_window_mins: i64,

    /// Maximum rows on a departure board.
    pub board_limit: usize,
}

impl RoutingPolicy {
    /// Create a policy with the given search bounds and default windows.
    pub fn new(max_transfers: usize, max_paths: usize) -> Self {
        Self {
            max_transfers,
            max_paths,
            ..Self::default()
        }
    }

    /// Maximum number of edges in a candidate path.
    pub fn max_edges(&self) -> usize {
        self.max_transfers + 1
    }

    /// Returns the first-departure window as a Duration.
    pub fn departure_window(&self) -> Duration {
        Duration::minutes(self.departure_window_mins)
    }

    /// Returns the transfer window as a Duration.
    pub fn transfer_window(&self) -> Duration {
        Duration::minutes(self.transfer_window_mins)
    }

    /// Returns the arrival slack as a Duration.
    pub fn arrival_slack(&self) -> Duration {
        Duration::minutes(self.arrival_slack_mins)
    }

    /// Returns the request budget.
    pub fn deadline(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.deadline_ms)
    }

    /// Returns the departure board window as a Duration.
    pub fn board_window(&self) -> Duration {
        Duration::minutes(self.board_window_mins)
    }
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self {
            max_transfers: 3,
            max_paths: 5,
            departure_window_mins: 30,
            transfer_window_mins: 30,
            arrival_slack_mins: 30,
            // Roughly 22 km each way at Dutch latitudes.
            lat_margin: 0.25,
            lon_margin: 0.20,
            exclude_same_service: true,
            deadline_ms: 5_000,
            board_window_mins: 60,
            board_limit: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy() {
        let policy = RoutingPolicy::default();

        assert_eq!(policy.max_transfers, 3);
        assert_eq!(policy.max_paths, 5);
        assert_eq!(policy.departure_window_mins, 30);
        assert_eq!(policy.transfer_window_mins, 30);
        assert_eq!(policy.arrival_slack_mins, 30);
        assert_eq!(policy.lat_margin, 0.25);
        assert_eq!(policy.lon_margin, 0.20);
        assert!(policy.exclude_same_service);
        assert_eq!(policy.board_limit, 20);
    }

    #[test]
    fn duration_methods() {
        let policy = RoutingPolicy::default();

        assert_eq!(policy.departure_window(), Duration::minutes(30));
        assert_eq!(policy.transfer_window(), Duration::minutes(30));
        assert_eq!(policy.arrival_slack(), Duration::minutes(30));
        assert_eq!(policy.board_window(), Duration::minutes(60));
        assert_eq!(policy.deadline(), std::time::Duration::from_secs(5));
    }

    #[test]
    fn custom_bounds() {
        let policy = RoutingPolicy::new(1, 2);

        assert_eq!(policy.max_transfers, 1);
        assert_eq!(policy.max_edges(), 2);
        assert_eq!(policy.max_paths, 2);
        assert_eq!(policy.transfer_window_mins, 30);
    }
}
