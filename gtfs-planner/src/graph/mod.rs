//! Station-level routing graph.
//!
//! Stops are collapsed into stations (one per distinct top-level stop name;
//! platforms inherit their parent's station) and every pair of stations
//! served in order by some trip becomes a directed edge carrying the
//! cheapest observed distance and stop count.

mod build;

use std::collections::HashMap;

use crate::domain::{StationId, StopId};

pub use build::build;

/// Errors that abort a graph build.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A stop's parent is itself a child stop
    #[error("stop {stop:?} has parent {parent:?}, which is itself a child stop")]
    NestedParent { stop: String, parent: String },

    /// The dataset has no top-level stops
    #[error("dataset contains no stations")]
    NoStations,
}

/// A merged station.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    /// Member stops, parents and platforms alike.
    pub stops: Vec<StopId>,
    /// True if any trip calls at one of the member stops.
    pub served: bool,
}

/// A direct connection between two stations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: StationId,
    pub to: StationId,
    /// Minimum shape distance travelled across all trips making this hop.
    pub distance: f64,
    /// Minimum number of stop-time rows advanced across all trips making this hop.
    pub stops: u32,
}

/// Immutable routing graph derived from a dataset.
#[derive(Debug, Clone)]
pub struct RoutingGraph {
    stations: Vec<Station>,
    stop_station: Vec<StationId>,
    by_name: HashMap<String, StationId>,
    by_folded_name: HashMap<String, StationId>,
    /// Per station, sorted by destination.
    outgoing: Vec<Vec<Edge>>,
}

impl RoutingGraph {
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn station(&self, id: StationId) -> &Station {
        &self.stations[id.index()]
    }

    /// Returns the station a stop belongs to.
    pub fn station_of(&self, stop: StopId) -> StationId {
        self.stop_station[stop.index()]
    }

    /// Resolve a station by name, falling back to a case-insensitive match.
    pub fn find_station(&self, name: &str) -> Option<StationId> {
        let name = name.trim();
        self.by_name
            .get(name)
            .or_else(|| self.by_folded_name.get(&name.to_lowercase()))
            .copied()
    }

    /// Returns the edges leaving a station, ordered by destination.
    pub fn outgoing(&self, from: StationId) -> &[Edge] {
        &self.outgoing[from.index()]
    }

    /// Returns the edge between two stations, if one exists.
    pub fn edge(&self, from: StationId, to: StationId) -> Option<&Edge> {
        let edges = self.outgoing(from);
        edges
            .binary_search_by_key(&to, |e| e.to)
            .ok()
            .map(|idx| &edges[idx])
    }

    /// Iterates all edges, grouped by origin station.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.outgoing.iter().flatten()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.iter().map(Vec::len).sum()
    }

    /// Sorted names of stations at least one trip calls at.
    pub fn served_station_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .stations
            .iter()
            .filter(|s| s.served)
            .map(|s| s.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}
