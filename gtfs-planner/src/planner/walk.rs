//! Schedule Walker: realize a station path against the timetable.
//!
//! The walk proceeds in steps over the path's hops. Step 0 boards at the
//! origin, odd steps ride the current trip to the next station and alight,
//! even steps change onto a connecting trip at the station just reached.
//! Every step maps each partial itinerary to zero or more successors; an
//! itinerary without successors is a dead end and is dropped.

use chrono::Duration;
use tracing::{debug, trace};

use crate::dataset::{Dataset, StopTime};
use crate::domain::{Journey, RailTime, StationId, StopTimeId};
use crate::graph::RoutingGraph;

use super::config::RoutingPolicy;
use super::paths::StationPath;

/// What a step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Board a first trip at the origin.
    Board,
    /// Ride the current trip to the station at this path index.
    Alight(usize),
    /// Change trains at the station at this path index.
    Change(usize),
}

impl Step {
    /// The step sequence for a path with `hops` edges.
    fn sequence(hops: usize) -> impl Iterator<Item = Step> {
        (0..2 * hops).map(|n| match n {
            0 => Step::Board,
            n if n % 2 == 1 => Step::Alight(n.div_ceil(2)),
            n => Step::Change(n / 2),
        })
    }
}

/// An itinerary under construction.
#[derive(Debug, Clone)]
struct Partial {
    /// Board, alight, board, ... in travel order.
    stop_times: Vec<StopTimeId>,
    complete: bool,
}

impl Partial {
    fn extended(&self, next: StopTimeId, complete: bool) -> Self {
        let mut stop_times = Vec::with_capacity(self.stop_times.len() + 1);
        stop_times.extend_from_slice(&self.stop_times);
        stop_times.push(next);
        Self {
            stop_times,
            complete,
        }
    }

    fn current(&self) -> StopTimeId {
        // Partials are created with at least one stop-time and only grow.
        self.stop_times[self.stop_times.len() - 1]
    }
}

/// Walks candidate paths through the timetable.
pub struct ScheduleWalker<'a> {
    dataset: &'a Dataset,
    graph: &'a RoutingGraph,
    policy: &'a RoutingPolicy,
}

impl<'a> ScheduleWalker<'a> {
    pub fn new(dataset: &'a Dataset, graph: &'a RoutingGraph, policy: &'a RoutingPolicy) -> Self {
        Self {
            dataset,
            graph,
            policy,
        }
    }

    /// Returns the schedule-feasible journeys along `path` leaving no
    /// earlier than `depart_after`.
    ///
    /// Only journeys arriving within the arrival slack of this path's
    /// earliest arrival are returned.
    pub fn walk(&self, path: &StationPath, depart_after: RailTime) -> Vec<Journey> {
        let stations = path.stations();
        let mut partials: Vec<Partial> = Vec::new();

        for step in Step::sequence(path.hops()) {
            partials = match step {
                Step::Board => self.board(stations[0], depart_after),
                Step::Alight(idx) => {
                    let last = idx == stations.len() - 1;
                    partials
                        .iter()
                        .filter_map(|p| {
                            self.alight(p.current(), stations[idx])
                                .map(|st| p.extended(st, last))
                        })
                        .collect()
                }
                Step::Change(idx) => partials
                    .iter()
                    .flat_map(|p| {
                        self.connections(p.current(), stations[idx])
                            .into_iter()
                            .map(move |st| p.extended(st, false))
                    })
                    .collect(),
            };
            trace!(?step, partials = partials.len(), "Walk step");
            if partials.is_empty() {
                return Vec::new();
            }
        }

        let mut journeys: Vec<Journey> = partials
            .into_iter()
            .filter(|p| p.complete)
            .filter_map(|p| {
                let departure = self.dataset.stop_time(p.stop_times[0]).departure;
                let arrival = self.dataset.stop_time(p.current()).arrival;
                Journey::new(p.stop_times, departure, arrival)
                    .inspect_err(|e| debug!(error = %e, %departure, %arrival, "Journey dropped"))
                    .ok()
            })
            .collect();

        let earliest = journeys.iter().map(Journey::arrival_time).min();
        if let Some(cutoff) = earliest.and_then(|t| t.checked_add(self.policy.arrival_slack())) {
            journeys.retain(|j| j.arrival_time() <= cutoff);
        }
        journeys
    }

    /// Step 0: every stop-time at the origin departing within the window.
    fn board(&self, origin: StationId, depart_after: RailTime) -> Vec<Partial> {
        let Some(until) = depart_after.checked_add(self.policy.departure_window()) else {
            return Vec::new();
        };
        let mut boards: Vec<&StopTime> = self
            .graph
            .station(origin)
            .stops
            .iter()
            .flat_map(|stop| self.dataset.departures_between(*stop, depart_after, until))
            .collect();
        boards.sort_by_key(|st| (st.departure, st.id));

        boards
            .into_iter()
            .map(|st| Partial {
                stop_times: vec![st.id],
                complete: false,
            })
            .collect()
    }

    /// Odd steps: the first later call of the boarded trip at `station`.
    fn alight(&self, boarded: StopTimeId, station: StationId) -> Option<StopTimeId> {
        let boarded = self.dataset.stop_time(boarded);
        self.dataset
            .trip_stop_times(boarded.trip)
            .iter()
            .filter(|st| st.rank > boarded.rank)
            .find(|st| self.graph.station_of(st.stop) == station)
            .map(|st| st.id)
    }

    /// Even steps: departures from any stop of `station` that can be
    /// reached in time and that run a genuinely different service.
    fn connections(&self, alighted: StopTimeId, station: StationId) -> Vec<StopTimeId> {
        let alighted = self.dataset.stop_time(alighted);
        let current_trip = self.dataset.trip(alighted.trip);
        let Some(latest) = alighted.arrival.checked_add(self.policy.transfer_window()) else {
            return Vec::new();
        };

        let mut found: Vec<&StopTime> = Vec::new();
        for stop in &self.graph.station(station).stops {
            let min_transfer = self
                .dataset
                .min_transfer(alighted.stop, *stop)
                .unwrap_or_else(Duration::zero);
            let Some(earliest) = alighted
                .arrival
                .checked_add(min_transfer)
                .filter(|t| *t <= latest)
            else {
                continue;
            };

            found.extend(
                self.dataset
                    .departures_between(*stop, earliest, latest)
                    .filter(|st| {
                        let next_trip = self.dataset.trip(st.trip);
                        if next_trip.route == current_trip.route {
                            return false;
                        }
                        !(self.policy.exclude_same_service
                            && next_trip.headsign == current_trip.headsign
                            && next_trip.long_name == current_trip.long_name)
                    }),
            );
        }
        found.sort_by_key(|st| (st.departure, st.id));
        found.into_iter().map(|st| st.id).collect()
    }
}
