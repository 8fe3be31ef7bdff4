//! Path Enumerator: bounded search for candidate station sequences.
//!
//! Candidate paths are found by exhaustive depth-first expansion from the
//! origin over the stations admitted by a geographic bounding box and a
//! name filter. Paths never revisit a station and have at most
//! `max_transfers + 1` edges. The cheapest few by a coarse score are kept
//! for timetable evaluation.

use std::cmp::Ordering;

use tracing::debug;

use crate::dataset::Dataset;
use crate::domain::StationId;
use crate::graph::RoutingGraph;

use super::config::RoutingPolicy;
use super::filter::StationFilter;

/// An ordered sequence of stations considered as a routing candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct StationPath {
    stations: Vec<StationId>,
    stops: u32,
    distance: f64,
}

impl StationPath {
    /// Returns the stations in travel order, origin first.
    pub fn stations(&self) -> &[StationId] {
        &self.stations
    }

    /// Number of edges.
    pub fn hops(&self) -> usize {
        self.stations.len() - 1
    }

    /// Number of changes the path implies.
    pub fn transfers(&self) -> usize {
        self.hops() - 1
    }

    /// Sum of the minimum stop counts of the edges.
    pub fn stops(&self) -> u32 {
        self.stops
    }

    /// Sum of the minimum distances of the edges.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Primary ranking key: zero for direct paths, growing with both
    /// transfers and intermediate stops.
    pub fn score(&self) -> u64 {
        self.transfers() as u64 * u64::from(self.stops)
    }

    /// Returns the first station.
    pub fn origin(&self) -> StationId {
        self.stations[0]
    }

    /// Returns the last station.
    pub fn destination(&self) -> StationId {
        self.stations[self.stations.len() - 1]
    }

    fn cmp_rank(&self, other: &Self) -> Ordering {
        self.score()
            .cmp(&other.score())
            .then_with(|| self.distance.total_cmp(&other.distance))
            .then_with(|| self.stations.cmp(&other.stations))
    }
}

/// Rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Smallest box covering `points`, grown by the given margins.
    ///
    /// Returns `None` for an empty set of points.
    pub fn around(
        points: impl IntoIterator<Item = (f64, f64)>,
        lat_margin: f64,
        lon_margin: f64,
    ) -> Option<Self> {
        let mut points = points.into_iter();
        let (lat, lon) = points.next()?;
        let tight = points.fold(
            Self {
                min_lat: lat,
                max_lat: lat,
                min_lon: lon,
                max_lon: lon,
            },
            |b, (lat, lon)| Self {
                min_lat: b.min_lat.min(lat),
                max_lat: b.max_lat.max(lat),
                min_lon: b.min_lon.min(lon),
                max_lon: b.max_lon.max(lon),
            },
        );
        Some(Self {
            min_lat: tight.min_lat - lat_margin,
            max_lat: tight.max_lat + lat_margin,
            min_lon: tight.min_lon - lon_margin,
            max_lon: tight.max_lon + lon_margin,
        })
    }

    /// Returns true if the point lies inside the box, edges included.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Enumerates candidate station paths.
pub struct PathEnumerator<'a> {
    dataset: &'a Dataset,
    graph: &'a RoutingGraph,
    policy: &'a RoutingPolicy,
    filter: &'a dyn StationFilter,
}

impl<'a> PathEnumerator<'a> {
    pub fn new(
        dataset: &'a Dataset,
        graph: &'a RoutingGraph,
        policy: &'a RoutingPolicy,
        filter: &'a dyn StationFilter,
    ) -> Self {
        Self {
            dataset,
            graph,
            policy,
            filter,
        }
    }

    /// Returns up to `max_paths` paths from `origin` to `destination`, best first.
    pub fn enumerate(&self, origin: StationId, destination: StationId) -> Vec<StationPath> {
        if origin == destination {
            return Vec::new();
        }

        let admitted = self.admitted_stations(origin, destination);
        let mut search = Search {
            graph: self.graph,
            admitted: &admitted,
            destination,
            max_edges: self.policy.max_edges(),
            path: vec![origin],
            found: Vec::new(),
        };
        search.expand(0, 0.0);

        let mut paths = search.found;
        let found = paths.len();
        paths.sort_by(StationPath::cmp_rank);
        paths.dedup_by(|a, b| a.stations == b.stations);
        paths.truncate(self.policy.max_paths);

        debug!(
            origin = %self.graph.station(origin).name,
            destination = %self.graph.station(destination).name,
            found,
            kept = paths.len(),
            "Candidate paths enumerated"
        );

        paths
    }

    /// Bounding box over every stop of the origin and destination stations.
    pub fn bounding_box(&self, origin: StationId, destination: StationId) -> Option<BoundingBox> {
        let points = [origin, destination]
            .into_iter()
            .flat_map(|id| &self.graph.station(id).stops)
            .map(|stop| {
                let stop = self.dataset.stop(*stop);
                (stop.latitude, stop.longitude)
            });
        BoundingBox::around(points, self.policy.lat_margin, self.policy.lon_margin)
    }

    /// Per station, whether it may appear on a path.
    ///
    /// A station is admitted if any of its stops lies in the bounding box
    /// and passes the name filter. The endpoints are always admitted.
    fn admitted_stations(&self, origin: StationId, destination: StationId) -> Vec<bool> {
        let Some(bbox) = self.bounding_box(origin, destination) else {
            return vec![false; self.graph.stations().len()];
        };

        let mut admitted: Vec<bool> = self
            .graph
            .stations()
            .iter()
            .map(|station| {
                station.stops.iter().any(|id| {
                    let stop = self.dataset.stop(*id);
                    bbox.contains(stop.latitude, stop.longitude) && self.filter.allows(&stop.name)
                })
            })
            .collect();
        admitted[origin.index()] = true;
        admitted[destination.index()] = true;
        admitted
    }
}

/// Depth-first expansion state.
struct Search<'g> {
    graph: &'g RoutingGraph,
    admitted: &'g [bool],
    destination: StationId,
    max_edges: usize,
    /// Stations of the path under construction.
    path: Vec<StationId>,
    found: Vec<StationPath>,
}

impl Search<'_> {
    fn expand(&mut self, stops: u32, distance: f64) {
        let Some(&current) = self.path.last() else {
            return;
        };
        let graph = self.graph;
        let edges_so_far = self.path.len() - 1;
        if edges_so_far >= self.max_edges {
            return;
        }

        // Only a direct hop to the destination can complete the path now.
        if edges_so_far + 1 == self.max_edges {
            if let Some(edge) = graph.edge(current, self.destination) {
                self.emit(stops + edge.stops, distance + edge.distance);
            }
            return;
        }

        for edge in graph.outgoing(current) {
            if edge.to == self.destination {
                self.emit(stops + edge.stops, distance + edge.distance);
            } else if self.admitted[edge.to.index()] && !self.path.contains(&edge.to) {
                self.path.push(edge.to);
                self.expand(stops + edge.stops, distance + edge.distance);
                self.path.pop();
            }
        }
    }

    fn emit(&mut self, stops: u32, distance: f64) {
        let mut stations = self.path.clone();
        stations.push(self.destination);
        self.found.push(StationPath {
            stations,
            stops,
            distance,
        });
    }
}
