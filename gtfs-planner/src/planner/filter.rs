//! Station filters for candidate interchange stations.
//!
//! Feeds mix rail stations with stops of other modes under similar names.
//! A `StationFilter` decides, per stop name, whether the stop may admit its
//! station as an intermediate node of a candidate path.

/// Predicate on stop names.
pub trait StationFilter: Send + Sync {
    /// Returns true if a stop with this name may be used.
    fn allows(&self, stop_name: &str) -> bool;
}

/// Rejects names containing a comma.
///
/// In Dutch feeds bus, tram and metro stops are named "Place, Street"
/// while rail stations are not.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommaNameFilter;

impl StationFilter for CommaNameFilter {
    fn allows(&self, stop_name: &str) -> bool {
        !stop_name.contains(',')
    }
}

/// Accepts every stop.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl StationFilter for AllowAll {
    fn allows(&self, _stop_name: &str) -> bool {
        true
    }
}

impl<F> StationFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn allows(&self, stop_name: &str) -> bool {
        self(stop_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_filter() {
        assert!(CommaNameFilter.allows("Utrecht Centraal"));
        assert!(!CommaNameFilter.allows("Amsterdam, Rokin"));
    }

    #[test]
    fn allow_all() {
        assert!(AllowAll.allows("Amsterdam, Rokin"));
    }

    #[test]
    fn closures_are_filters() {
        let no_airports = |name: &str| !name.contains("Airport");
        assert!(no_airports.allows("Utrecht Centraal"));
        assert!(!no_airports.allows("Schiphol Airport"));
    }
}
