//! Normalized, read-only transit dataset.
//!
//! A `Dataset` is built once from a `Feed` snapshot and never mutated. It
//! resolves every external id to a dense index and keeps the lookup
//! indexes the routing engine needs: stop-times per trip in sequence order,
//! departures per stop in time order, and declared transfers per stop.

mod build;
mod error;
mod feed;

#[cfg(test)]
pub(crate) mod fixtures;

use std::collections::HashMap;
use std::ops::Range;

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::domain::{RailTime, RouteId, StopId, StopTimeId, TripId};

pub use error::DatasetError;
pub use feed::{
    AgencyRecord, Feed, IMPOSSIBLE_TRANSFER, RAIL_ROUTE_TYPE, RouteRecord, StopRecord,
    StopTimeRecord, TransferRecord, TripRecord,
};

/// Hour of day suggested when a requested departure falls outside the timetable.
const SUGGESTED_HOUR: u32 = 8;

/// A physical stop or platform.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub external_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// External id of the parent stop, if this is a platform of a larger station.
    pub parent: Option<String>,
    pub platform: Option<String>,
}

/// A rail route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: RouteId,
    pub external_id: String,
    /// Name of the operating agency.
    pub agency: String,
    pub long_name: String,
}

/// One scheduled run of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub id: TripId,
    pub external_id: String,
    pub route: RouteId,
    pub headsign: String,
    pub long_name: String,
}

/// One visit of a trip at a stop.
#[derive(Debug, Clone, PartialEq)]
pub struct StopTime {
    pub id: StopTimeId,
    pub trip: TripId,
    pub stop: StopId,
    /// Raw GTFS sequence number.
    pub sequence: u32,
    /// Position among the trip's stop-times ordered by sequence.
    pub rank: u32,
    pub headsign: Option<String>,
    pub arrival: RailTime,
    pub departure: RailTime,
    pub shape_dist: f64,
}

/// Declared minimum dwell between two stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub from: StopId,
    pub to: StopId,
    pub min_transfer: Duration,
}

/// Read-only view of one service date.
#[derive(Debug, Clone)]
pub struct Dataset {
    service_date: NaiveDate,
    stops: Vec<Stop>,
    routes: Vec<Route>,
    trips: Vec<Trip>,
    /// Grouped by trip, in rank order within each trip.
    stop_times: Vec<StopTime>,
    transfers: Vec<Transfer>,
    trip_ranges: Vec<Range<usize>>,
    /// Per stop, sorted by departure time.
    stop_departures: Vec<Vec<StopTimeId>>,
    transfers_from: HashMap<StopId, Vec<usize>>,
    stop_index: HashMap<String, StopId>,
}

impl Dataset {
    /// Returns the service date the dataset was extracted for.
    pub fn service_date(&self) -> NaiveDate {
        self.service_date
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn stop_times(&self) -> &[StopTime] {
        &self.stop_times
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn stop(&self, id: StopId) -> &Stop {
        &self.stops[id.index()]
    }

    pub fn route(&self, id: RouteId) -> &Route {
        &self.routes[id.index()]
    }

    pub fn trip(&self, id: TripId) -> &Trip {
        &self.trips[id.index()]
    }

    pub fn stop_time(&self, id: StopTimeId) -> &StopTime {
        &self.stop_times[id.index()]
    }

    /// Look up a stop by its GTFS id.
    pub fn stop_by_external_id(&self, external_id: &str) -> Option<&Stop> {
        self.stop_index.get(external_id).map(|id| self.stop(*id))
    }

    /// Returns the stop-times of a trip, ordered by rank.
    pub fn trip_stop_times(&self, trip: TripId) -> &[StopTime] {
        &self.stop_times[self.trip_ranges[trip.index()].clone()]
    }

    /// Returns stop-times at `stop` departing within `[from, until]`, in time order.
    pub fn departures_between(
        &self,
        stop: StopId,
        from: RailTime,
        until: RailTime,
    ) -> impl Iterator<Item = &StopTime> + '_ {
        let departures = &self.stop_departures[stop.index()];
        let start = departures.partition_point(|id| self.stop_time(*id).departure < from);
        departures[start..]
            .iter()
            .map(|id| self.stop_time(*id))
            .take_while(move |st| st.departure <= until)
    }

    /// Returns the transfers declared from a stop.
    pub fn transfers_from(&self, stop: StopId) -> impl Iterator<Item = &Transfer> + '_ {
        self.transfers_from
            .get(&stop)
            .into_iter()
            .flatten()
            .map(|idx| &self.transfers[*idx])
    }

    /// Minimum declared transfer time from one stop to another.
    ///
    /// A transfer row matches when it targets `to` directly or any stop
    /// sharing `to`'s name. Returns `None` when no row matches.
    pub fn min_transfer(&self, from: StopId, to: StopId) -> Option<Duration> {
        let to_name = &self.stop(to).name;
        self.transfers_from(from)
            .filter(|t| t.to == to || self.stop(t.to).name == *to_name)
            .map(|t| t.min_transfer)
            .min()
    }

    /// Display name of the service a trip runs as: agency and long name.
    pub fn service_name(&self, trip: TripId) -> String {
        let trip = self.trip(trip);
        let agency = &self.route(trip.route).agency;
        match (agency.is_empty(), trip.long_name.is_empty()) {
            (true, _) => trip.long_name.clone(),
            (false, true) => agency.clone(),
            (false, false) => format!("{} {}", agency, trip.long_name),
        }
    }

    /// Headsign shown at a stop-time: the stop override, else the trip's.
    pub fn headsign_at(&self, stop_time: StopTimeId) -> &str {
        let st = self.stop_time(stop_time);
        st.headsign
            .as_deref()
            .unwrap_or(&self.trip(st.trip).headsign)
    }

    /// Earliest and latest departure among stop-times that dwell.
    ///
    /// Stop-times whose departure equals their arrival are ignored.
    pub fn departure_range(&self) -> Option<(RailTime, RailTime)> {
        let mut dwelling = self
            .stop_times
            .iter()
            .filter(|st| st.departure != st.arrival)
            .map(|st| st.departure);
        let first = dwelling.next()?;
        Some(dwelling.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }

    /// Returns `when` if the timetable covers it, else a morning departure on
    /// the first service day.
    pub fn suggest_departure(&self, when: RailTime) -> RailTime {
        match self.departure_range() {
            Some((min, max)) if when < min || when > max => {
                let morning =
                    NaiveTime::from_hms_opt(SUGGESTED_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
                RailTime::new(min.date(), morning)
            }
            _ => when,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{FeedBuilder, time};
    use super::*;

    fn dataset() -> Dataset {
        FeedBuilder::new()
            .station("ut", "Utrecht Centraal", 52.089, 5.110)
            .platform("ut5", "Utrecht Centraal", "ut", "5")
            .platform("ut7", "Utrecht Centraal", "ut", "7")
            .station("asd", "Amsterdam Centraal", 52.379, 4.900)
            .route("ic", "Intercity")
            .trip(
                "t1",
                "ic",
                "Amsterdam Centraal",
                &[("ut5", "", "10:00"), ("asd", "10:27", "")],
            )
            .trip(
                "t2",
                "ic",
                "Amsterdam Centraal",
                &[("ut7", "10:14", "10:16"), ("asd", "10:43", "")],
            )
            .transfer("ut5", "ut7", 240)
            .build()
    }

    #[test]
    fn lookups_by_external_id() {
        let ds = dataset();

        let stop = ds.stop_by_external_id("ut5").unwrap();
        assert_eq!(stop.platform.as_deref(), Some("5"));
        assert_eq!(stop.parent.as_deref(), Some("ut"));
        assert!(ds.stop_by_external_id("rtd").is_none());
    }

    #[test]
    fn departures_are_windowed_and_ordered() {
        let ds = dataset();
        let ut5 = ds.stop_by_external_id("ut5").unwrap().id;
        let ut7 = ds.stop_by_external_id("ut7").unwrap().id;

        assert_eq!(ds.departures_between(ut5, time("09:30"), time("10:30")).count(), 1);
        assert_eq!(ds.departures_between(ut5, time("10:01"), time("10:30")).count(), 0);

        let at_seven: Vec<_> = ds
            .departures_between(ut7, time("10:16"), time("10:16"))
            .collect();
        assert_eq!(at_seven.len(), 1);
        assert_eq!(at_seven[0].departure, time("10:16"));
    }

    #[test]
    fn min_transfer_direct_and_by_name() {
        let ds = dataset();
        let ut5 = ds.stop_by_external_id("ut5").unwrap().id;
        let ut7 = ds.stop_by_external_id("ut7").unwrap().id;
        let asd = ds.stop_by_external_id("asd").unwrap().id;

        assert_eq!(ds.min_transfer(ut5, ut7), Some(Duration::seconds(240)));
        // The parent stop shares the platform's name.
        let ut = ds.stop_by_external_id("ut").unwrap().id;
        assert_eq!(ds.min_transfer(ut5, ut), Some(Duration::seconds(240)));
        assert_eq!(ds.min_transfer(ut7, ut5), None);
        assert_eq!(ds.min_transfer(ut5, asd), None);
    }

    #[test]
    fn service_name_and_headsign() {
        let ds = dataset();
        let t1 = ds.trips()[0].id;
        let first = ds.trip_stop_times(t1)[0].id;

        assert_eq!(ds.service_name(t1), "NS Intercity");
        assert_eq!(ds.headsign_at(first), "Amsterdam Centraal");
    }

    #[test]
    fn departure_range_skips_non_dwelling_rows() {
        let ds = dataset();

        // Only t2 at ut7 dwells (10:14 -> 10:16).
        let (min, max) = ds.departure_range().unwrap();
        assert_eq!(min, time("10:16"));
        assert_eq!(max, time("10:16"));
    }

    #[test]
    fn suggest_departure_clamps_to_morning() {
        let ds = dataset();

        assert_eq!(ds.suggest_departure(time("10:16")), time("10:16"));
        assert_eq!(ds.suggest_departure(time("22:00")), time("08:00"));
    }
}
