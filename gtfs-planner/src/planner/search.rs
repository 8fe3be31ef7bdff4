//! Journey planning over one dataset snapshot.
//!
//! `Planner::plan` runs the whole pipeline on the calling thread:
//! validation, path enumeration, a schedule walk per candidate path,
//! ranking and formatting. The engine drives the same stages itself to
//! walk paths concurrently.

use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::domain::{Itinerary, Journey, RailTime, StationId};
use crate::graph::RoutingGraph;

use super::config::RoutingPolicy;
use super::filter::StationFilter;
use super::format::itinerary;
use super::paths::{PathEnumerator, StationPath};
use super::rank::rank;
use super::walk::ScheduleWalker;

/// Error from journey planning.
///
/// Finding no route is not an error: it is an empty `PlanResult`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    /// Station name not present in the graph
    #[error("unknown station: {0}")]
    UnknownStation(String),

    /// Origin and destination are the same station
    #[error("origin and destination are both {0}")]
    SameStation(String),

    /// No dataset has been published yet
    #[error("no timetable is loaded")]
    DatasetUnavailable,

    /// A planning worker failed, so the result would be incomplete
    #[error("journey planning failed: {0}")]
    EvaluationFailed(String),
}

/// Result of journey planning.
#[derive(Debug, Clone, Default)]
pub struct PlanResult {
    /// Itineraries, ranked best-first.
    pub itineraries: Vec<Itinerary>,

    /// Number of station paths evaluated against the timetable.
    pub candidate_paths: usize,

    /// True if the request ran out of time before ranking.
    pub timed_out: bool,
}

impl PlanResult {
    /// Create an empty result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create the result of a request that exceeded its deadline.
    pub fn timed_out() -> Self {
        Self {
            timed_out: true,
            ..Self::default()
        }
    }
}

/// Journey planner over one dataset and its routing graph.
pub struct Planner<'a> {
    dataset: &'a Dataset,
    graph: &'a RoutingGraph,
    policy: &'a RoutingPolicy,
    filter: &'a dyn StationFilter,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
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

    /// Plan journeys from `origin` to `destination` leaving no earlier
    /// than `depart_after`.
    pub fn plan(
        &self,
        origin: &str,
        destination: &str,
        depart_after: RailTime,
    ) -> Result<PlanResult, RoutingError> {
        let (from, to) = self.resolve(origin, destination)?;
        let paths = self.candidate_paths(from, to);

        let walker = ScheduleWalker::new(self.dataset, self.graph, self.policy);
        let journeys = paths
            .iter()
            .flat_map(|path| walker.walk(path, depart_after))
            .collect();

        Ok(self.finish(paths.len(), journeys))
    }

    /// Resolve and validate the endpoints of a request.
    pub fn resolve(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<(StationId, StationId), RoutingError> {
        let from = self
            .graph
            .find_station(origin)
            .ok_or_else(|| RoutingError::UnknownStation(origin.to_string()))?;
        let to = self
            .graph
            .find_station(destination)
            .ok_or_else(|| RoutingError::UnknownStation(destination.to_string()))?;

        if from == to {
            return Err(RoutingError::SameStation(
                self.graph.station(from).name.clone(),
            ));
        }
        Ok((from, to))
    }

    /// Candidate station paths between two resolved stations.
    pub fn candidate_paths(&self, from: StationId, to: StationId) -> Vec<StationPath> {
        PathEnumerator::new(self.dataset, self.graph, self.policy, self.filter).enumerate(from, to)
    }

    /// Rank the pooled journeys of all paths and format them.
    pub fn finish(&self, candidate_paths: usize, journeys: Vec<Journey>) -> PlanResult {
        let pooled = journeys.len();
        let ranked = rank(journeys, self.policy.arrival_slack());
        let itineraries: Vec<Itinerary> = ranked
            .iter()
            .map(|journey| itinerary(self.dataset, self.graph, journey))
            .collect();

        debug!(pooled, kept = itineraries.len(), "Journeys ranked");
        if itineraries.is_empty() {
            info!(candidate_paths, "No route found");
        }

        PlanResult {
            itineraries,
            candidate_paths,
            timed_out: false,
        }
    }
}
