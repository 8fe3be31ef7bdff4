//! Test helpers for assembling small feeds.

use chrono::NaiveDate;

use super::{
    AgencyRecord, Dataset, Feed, RAIL_ROUTE_TYPE, RouteRecord, StopRecord, StopTimeRecord,
    TransferRecord, TripRecord,
};
use crate::domain::RailTime;

pub(crate) fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

/// Parse "HH:MM" on the fixture service date.
pub(crate) fn time(s: &str) -> RailTime {
    RailTime::parse_hhmm(s, date()).unwrap()
}

/// Builder for feeds with a single agency ("NS") on the fixture date.
pub(crate) struct FeedBuilder {
    feed: Feed,
}

impl FeedBuilder {
    pub(crate) fn new() -> Self {
        Self {
            feed: Feed {
                service_date: date(),
                agencies: vec![AgencyRecord {
                    agency_id: "ns".into(),
                    agency_name: "NS".into(),
                }],
                stops: vec![],
                routes: vec![],
                trips: vec![],
                stop_times: vec![],
                transfers: vec![],
            },
        }
    }

    /// A top-level stop (no parent).
    pub(crate) fn station(mut self, id: &str, name: &str, lat: f64, lon: f64) -> Self {
        self.feed.stops.push(StopRecord {
            stop_id: id.into(),
            stop_name: name.into(),
            stop_lat: lat,
            stop_lon: lon,
            parent_station: None,
            platform_code: None,
        });
        self
    }

    /// A platform stop placed at its parent's coordinates.
    pub(crate) fn platform(mut self, id: &str, name: &str, parent: &str, platform: &str) -> Self {
        let (lat, lon) = self
            .feed
            .stops
            .iter()
            .find(|s| s.stop_id == parent)
            .map(|s| (s.stop_lat, s.stop_lon))
            .unwrap_or((0.0, 0.0));
        self.feed.stops.push(StopRecord {
            stop_id: id.into(),
            stop_name: name.into(),
            stop_lat: lat,
            stop_lon: lon,
            parent_station: Some(parent.into()),
            platform_code: Some(platform.into()),
        });
        self
    }

    pub(crate) fn route(self, id: &str, long_name: &str) -> Self {
        self.route_of_type(id, long_name, RAIL_ROUTE_TYPE)
    }

    pub(crate) fn route_of_type(mut self, id: &str, long_name: &str, route_type: u16) -> Self {
        self.feed.routes.push(RouteRecord {
            route_id: id.into(),
            agency_id: Some("ns".into()),
            route_short_name: String::new(),
            route_long_name: long_name.into(),
            route_type,
        });
        self
    }

    /// A trip whose long name is its route's long name.
    ///
    /// `calls` are `(stop, arrival, departure)` with "HH:MM" times; an empty
    /// string leaves the time absent.
    pub(crate) fn trip(
        self,
        id: &str,
        route: &str,
        headsign: &str,
        calls: &[(&str, &str, &str)],
    ) -> Self {
        let long_name = self
            .feed
            .routes
            .iter()
            .find(|r| r.route_id == route)
            .map(|r| r.route_long_name.clone())
            .unwrap_or_default();
        self.trip_named(id, route, headsign, &long_name, calls)
    }

    pub(crate) fn trip_named(
        mut self,
        id: &str,
        route: &str,
        headsign: &str,
        long_name: &str,
        calls: &[(&str, &str, &str)],
    ) -> Self {
        self.feed.trips.push(TripRecord {
            route_id: route.into(),
            trip_id: id.into(),
            trip_headsign: headsign.into(),
            trip_short_name: String::new(),
            trip_long_name: long_name.into(),
        });
        for (i, (stop, arr, dep)) in calls.iter().enumerate() {
            self.feed.stop_times.push(StopTimeRecord {
                trip_id: id.into(),
                stop_sequence: (i as u32 + 1) * 10,
                stop_id: (*stop).into(),
                stop_headsign: None,
                arrival_time: gtfs_time(arr),
                departure_time: gtfs_time(dep),
                shape_dist_traveled: Some(i as f64 * 1000.0),
            });
        }
        self
    }

    pub(crate) fn transfer(mut self, from: &str, to: &str, seconds: u32) -> Self {
        self.feed.transfers.push(TransferRecord {
            from_stop_id: from.into(),
            to_stop_id: to.into(),
            transfer_type: 2,
            min_transfer_time: Some(seconds),
        });
        self
    }

    pub(crate) fn feed(self) -> Feed {
        self.feed
    }

    pub(crate) fn build(self) -> Dataset {
        Dataset::from_feed(self.feed).unwrap()
    }
}

fn gtfs_time(hhmm: &str) -> Option<String> {
    (!hhmm.is_empty()).then(|| format!("{hhmm}:00"))
}
