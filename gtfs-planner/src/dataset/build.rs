//! Dataset construction from a feed snapshot.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use tracing::info;

use super::feed::non_empty;
use super::{
    Dataset, DatasetError, Feed, IMPOSSIBLE_TRANSFER, RAIL_ROUTE_TYPE, Route, Stop, StopTime,
    StopTimeRecord, Transfer, Trip,
};
use crate::domain::{RailTime, RouteId, StopId, StopTimeId, TripId};

impl Dataset {
    /// Build a dataset from a feed snapshot.
    ///
    /// Non-rail routes and everything hanging off them are dropped, as are
    /// transfers marked impossible. Any other dangling reference, duplicate
    /// id, duplicate stop sequence or untimed stop-time aborts the build.
    pub fn from_feed(feed: Feed) -> Result<Self, DatasetError> {
        let Feed {
            service_date,
            agencies,
            stops: stop_rows,
            routes: route_rows,
            trips: trip_rows,
            stop_times: stop_time_rows,
            transfers: transfer_rows,
        } = feed;

        let agency_names: HashMap<String, String> = agencies
            .into_iter()
            .map(|a| (a.agency_id, a.agency_name))
            .collect();

        // Stops
        let mut stops = Vec::with_capacity(stop_rows.len());
        let mut stop_index = HashMap::with_capacity(stop_rows.len());
        for row in stop_rows {
            let id = StopId::from_index(stops.len());
            if stop_index.insert(row.stop_id.clone(), id).is_some() {
                return Err(duplicate("stop", row.stop_id));
            }
            stops.push(Stop {
                id,
                parent: non_empty(&row.parent_station).map(str::to_owned),
                platform: non_empty(&row.platform_code).map(str::to_owned),
                external_id: row.stop_id,
                name: row.stop_name,
                latitude: row.stop_lat,
                longitude: row.stop_lon,
            });
        }
        for stop in &stops {
            if let Some(parent) = &stop.parent {
                if !stop_index.contains_key(parent) {
                    return Err(unknown("parent stop", parent));
                }
            }
        }

        // Routes: rail only
        let mut routes = Vec::new();
        let mut route_index = HashMap::new();
        let mut skipped_routes = HashSet::new();
        for row in route_rows {
            if route_index.contains_key(&row.route_id) || skipped_routes.contains(&row.route_id) {
                return Err(duplicate("route", row.route_id));
            }
            if row.route_type != RAIL_ROUTE_TYPE {
                skipped_routes.insert(row.route_id);
                continue;
            }
            let agency = match non_empty(&row.agency_id) {
                Some(agency_id) => agency_names
                    .get(agency_id)
                    .cloned()
                    .ok_or_else(|| unknown("agency", agency_id))?,
                // GTFS allows omitting the agency when the feed has only one.
                None if agency_names.len() == 1 => {
                    agency_names.values().next().cloned().unwrap_or_default()
                }
                None => String::new(),
            };
            let id = RouteId::from_index(routes.len());
            route_index.insert(row.route_id.clone(), id);
            routes.push(Route {
                id,
                external_id: row.route_id,
                agency,
                long_name: row.route_long_name,
            });
        }

        // Trips
        let mut trips = Vec::new();
        let mut trip_index = HashMap::new();
        let mut skipped_trips = HashSet::new();
        for row in trip_rows {
            if trip_index.contains_key(&row.trip_id) || skipped_trips.contains(&row.trip_id) {
                return Err(duplicate("trip", row.trip_id));
            }
            if skipped_routes.contains(&row.route_id) {
                skipped_trips.insert(row.trip_id);
                continue;
            }
            let route = *route_index
                .get(&row.route_id)
                .ok_or_else(|| unknown("route", &row.route_id))?;
            let id = TripId::from_index(trips.len());
            trip_index.insert(row.trip_id.clone(), id);
            trips.push(Trip {
                id,
                external_id: row.trip_id,
                route,
                headsign: row.trip_headsign,
                long_name: row.trip_long_name,
            });
        }

        // Stop-times, grouped per trip and ranked by sequence
        let mut per_trip: Vec<Vec<StopTimeRecord>> = vec![Vec::new(); trips.len()];
        for row in stop_time_rows {
            if skipped_trips.contains(&row.trip_id) {
                continue;
            }
            let trip = trip_index
                .get(&row.trip_id)
                .ok_or_else(|| unknown("trip", &row.trip_id))?;
            per_trip[trip.index()].push(row);
        }

        let mut stop_times: Vec<StopTime> = Vec::new();
        let mut trip_ranges = Vec::with_capacity(trips.len());
        for (trip, mut rows) in trips.iter().zip(per_trip) {
            rows.sort_by_key(|r| r.stop_sequence);
            if let Some(pair) = rows
                .windows(2)
                .find(|w| w[0].stop_sequence == w[1].stop_sequence)
            {
                return Err(DatasetError::DuplicateSequence {
                    trip: trip.external_id.clone(),
                    sequence: pair[0].stop_sequence,
                });
            }

            let start = stop_times.len();
            for (rank, row) in rows.into_iter().enumerate() {
                let stop = *stop_index
                    .get(&row.stop_id)
                    .ok_or_else(|| unknown("stop", &row.stop_id))?;
                let arrival = parse_time(&row.arrival_time, service_date, trip, row.stop_sequence)?;
                let departure =
                    parse_time(&row.departure_time, service_date, trip, row.stop_sequence)?;
                let (arrival, departure) = match (arrival, departure) {
                    (Some(a), Some(d)) => (a, d),
                    (Some(a), None) => (a, a),
                    (None, Some(d)) => (d, d),
                    (None, None) => {
                        return Err(DatasetError::MissingTime {
                            trip: trip.external_id.clone(),
                            sequence: row.stop_sequence,
                        });
                    }
                };
                stop_times.push(StopTime {
                    id: StopTimeId::from_index(stop_times.len()),
                    trip: trip.id,
                    stop,
                    sequence: row.stop_sequence,
                    rank: rank as u32,
                    headsign: non_empty(&row.stop_headsign).map(str::to_owned),
                    arrival,
                    departure,
                    shape_dist: row.shape_dist_traveled.unwrap_or(0.0),
                });
            }
            trip_ranges.push(start..stop_times.len());
        }

        let mut stop_departures = vec![Vec::new(); stops.len()];
        for st in &stop_times {
            stop_departures[st.stop.index()].push(st.id);
        }
        for departures in &mut stop_departures {
            departures.sort_by_key(|id| (stop_times[id.index()].departure, *id));
        }

        // Transfers
        let mut transfers = Vec::new();
        let mut transfers_from: HashMap<StopId, Vec<usize>> = HashMap::new();
        for row in transfer_rows {
            if row.transfer_type == IMPOSSIBLE_TRANSFER {
                continue;
            }
            let from = *stop_index
                .get(&row.from_stop_id)
                .ok_or_else(|| unknown("stop", &row.from_stop_id))?;
            let to = *stop_index
                .get(&row.to_stop_id)
                .ok_or_else(|| unknown("stop", &row.to_stop_id))?;
            transfers_from.entry(from).or_default().push(transfers.len());
            transfers.push(Transfer {
                from,
                to,
                min_transfer: Duration::seconds(i64::from(row.min_transfer_time.unwrap_or(0))),
            });
        }

        info!(
            %service_date,
            stops = stops.len(),
            routes = routes.len(),
            trips = trips.len(),
            stop_times = stop_times.len(),
            transfers = transfers.len(),
            "Dataset built"
        );

        Ok(Dataset {
            service_date,
            stops,
            routes,
            trips,
            stop_times,
            transfers,
            trip_ranges,
            stop_departures,
            transfers_from,
            stop_index,
        })
    }
}

fn parse_time(
    value: &Option<String>,
    service_date: NaiveDate,
    trip: &Trip,
    sequence: u32,
) -> Result<Option<RailTime>, DatasetError> {
    non_empty(value)
        .map(|s| RailTime::from_gtfs(s, service_date))
        .transpose()
        .map_err(|source| DatasetError::InvalidTime {
            trip: trip.external_id.clone(),
            sequence,
            source,
        })
}

fn unknown(kind: &'static str, id: &str) -> DatasetError {
    DatasetError::UnknownReference {
        kind,
        id: id.to_owned(),
    }
}

fn duplicate(kind: &'static str, id: String) -> DatasetError {
    DatasetError::DuplicateId { kind, id }
}
