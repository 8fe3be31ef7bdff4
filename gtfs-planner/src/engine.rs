//! Routing engine: the published timetable snapshot and concurrent planning.
//!
//! The engine holds the current (dataset, graph) snapshot behind a lock that
//! is only taken long enough to clone or replace an `Arc`. Publishing builds
//! the new snapshot off the async runtime and swaps it in whole, so planning
//! requests see either the old snapshot or the new one. Within a request,
//! each candidate path is walked on its own blocking worker.
//!
//! Plan results are cached per (snapshot version, origin, destination,
//! departure time). Publishing clears the cache.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use moka::future::Cache as MokaCache;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinError;
use tracing::{error, info, warn};

use crate::dataset::{Dataset, DatasetError, Feed};
use crate::domain::{Journey, RailTime, StationId};
use crate::graph::{self, GraphError, RoutingGraph};
use crate::planner::{
    CommaNameFilter, Departure, PlanResult, Planner, RoutingError, RoutingPolicy, ScheduleWalker,
    StationFilter, departure_board,
};

/// Error while building a snapshot to publish.
///
/// The previously published snapshot stays in place.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The feed could not be turned into a dataset
    #[error("invalid dataset: {0}")]
    Dataset(#[from] DatasetError),

    /// The dataset could not be turned into a routing graph
    #[error("invalid routing graph: {0}")]
    Graph(#[from] GraphError),

    /// The build task panicked or was cancelled
    #[error("snapshot build task failed: {0}")]
    Task(#[from] JoinError),
}

/// Cache key for plan results: (snapshot version, origin, destination, departure).
type PlanKey = (u64, StationId, StationId, RailTime);

/// Configuration for the plan cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

/// One published timetable.
#[derive(Debug)]
pub struct Snapshot {
    /// Increases by one with every publish.
    pub version: u64,
    pub dataset: Dataset,
    pub graph: RoutingGraph,
}

impl Snapshot {
    /// Earliest and latest dwelling departure, plus the departure time to
    /// suggest for `when`.
    pub fn timetable(&self, when: RailTime) -> Option<(RailTime, RailTime, RailTime)> {
        let (first, last) = self.dataset.departure_range()?;
        Some((first, last, self.dataset.suggest_departure(when)))
    }
}

/// Shared routing engine.
///
/// Cheap to clone; clones share the snapshot, the publish lock and the
/// cache.
#[derive(Clone)]
pub struct RoutingEngine {
    current: Arc<RwLock<Option<Arc<Snapshot>>>>,
    /// Held for the whole of a publish; guards the version counter.
    publishing: Arc<Mutex<u64>>,
    policy: Arc<RoutingPolicy>,
    filter: Arc<dyn StationFilter>,
    cache: MokaCache<PlanKey, Arc<PlanResult>>,
}

impl RoutingEngine {
    /// Create an engine with nothing published yet.
    pub fn new(
        policy: RoutingPolicy,
        filter: Arc<dyn StationFilter>,
        cache_config: &CacheConfig,
    ) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(cache_config.ttl)
            .max_capacity(cache_config.max_capacity)
            .build();

        Self {
            current: Arc::new(RwLock::new(None)),
            publishing: Arc::new(Mutex::new(0)),
            policy: Arc::new(policy),
            filter,
            cache,
        }
    }

    /// Create an engine with the default policy and the comma-name filter.
    pub fn with_defaults() -> Self {
        Self::new(
            RoutingPolicy::default(),
            Arc::new(CommaNameFilter),
            &CacheConfig::default(),
        )
    }

    pub fn policy(&self) -> &RoutingPolicy {
        &self.policy
    }

    /// Build the routing graph for `dataset` and publish both.
    ///
    /// Returns the new snapshot version.
    pub async fn publish(&self, dataset: Dataset) -> Result<u64, PublishError> {
        let mut version = self.publishing.lock().await;
        let built = tokio::task::spawn_blocking(move || {
            let graph = graph::build(&dataset)?;
            Ok::<_, GraphError>((dataset, graph))
        })
        .await;

        let built = built
            .map_err(PublishError::from)
            .and_then(|r| r.map_err(PublishError::from));
        self.swap(&mut *version, built).await
    }

    /// Load a feed snapshot from disk, build dataset and graph, and publish.
    pub async fn publish_file(&self, path: impl Into<PathBuf>) -> Result<u64, PublishError> {
        let path = path.into();
        let mut version = self.publishing.lock().await;
        let built = tokio::task::spawn_blocking(move || {
            let feed = Feed::load(&path)?;
            let dataset = Dataset::from_feed(feed)?;
            let graph = graph::build(&dataset)?;
            Ok::<_, PublishError>((dataset, graph))
        })
        .await;

        let built = built.map_err(PublishError::from).and_then(|r| r);
        self.swap(&mut *version, built).await
    }

    async fn swap(
        &self,
        version: &mut u64,
        built: Result<(Dataset, RoutingGraph), PublishError>,
    ) -> Result<u64, PublishError> {
        let (dataset, graph) = built.inspect_err(|e| {
            warn!(error = %e, "Publish failed; keeping the current timetable");
        })?;

        let next = *version + 1;
        let snapshot = Arc::new(Snapshot {
            version: next,
            dataset,
            graph,
        });
        info!(
            version = next,
            service_date = %snapshot.dataset.service_date(),
            stations = snapshot.graph.stations().len(),
            edges = snapshot.graph.edge_count(),
            "Timetable published"
        );

        *self.current.write().await = Some(snapshot);
        *version = next;
        self.cache.invalidate_all();
        Ok(next)
    }

    /// Returns the current snapshot.
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>, RoutingError> {
        self.current
            .read()
            .await
            .clone()
            .ok_or(RoutingError::DatasetUnavailable)
    }

    /// Plan journeys on the current snapshot.
    ///
    /// Candidate paths are walked concurrently on blocking workers. If the
    /// request exceeds the policy deadline the result is empty and flagged
    /// `timed_out`. If any worker fails the request fails with
    /// `EvaluationFailed`. Neither outcome is cached.
    pub async fn plan(
        &self,
        origin: &str,
        destination: &str,
        depart_after: RailTime,
    ) -> Result<Arc<PlanResult>, RoutingError> {
        let snapshot = self.snapshot().await?;
        let (from, to) = Planner::new(
            &snapshot.dataset,
            &snapshot.graph,
            &self.policy,
            self.filter.as_ref(),
        )
        .resolve(origin, destination)?;

        let key = (snapshot.version, from, to, depart_after);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let evaluation = self.evaluate(snapshot, from, to, depart_after);
        match tokio::time::timeout(self.policy.deadline(), evaluation).await {
            Ok(Ok(result)) => {
                let result = Arc::new(result);
                self.cache.insert(key, result.clone()).await;
                Ok(result)
            }
            Ok(Err(e)) => {
                error!(origin, destination, error = %e, "Planning failed");
                Err(RoutingError::EvaluationFailed(e.to_string()))
            }
            Err(_) => {
                warn!(
                    origin,
                    destination,
                    deadline_ms = self.policy.deadline_ms,
                    "Planning exceeded its deadline"
                );
                Ok(Arc::new(PlanResult::timed_out()))
            }
        }
    }

    async fn evaluate(
        &self,
        snapshot: Arc<Snapshot>,
        from: StationId,
        to: StationId,
        depart_after: RailTime,
    ) -> Result<PlanResult, JoinError> {
        let paths = {
            let snapshot = snapshot.clone();
            let policy = self.policy.clone();
            let filter = self.filter.clone();
            tokio::task::spawn_blocking(move || {
                Planner::new(&snapshot.dataset, &snapshot.graph, &policy, filter.as_ref())
                    .candidate_paths(from, to)
            })
            .await?
        };

        let walks = paths.iter().cloned().map(|path| {
            let snapshot = snapshot.clone();
            let policy = self.policy.clone();
            tokio::task::spawn_blocking(move || {
                ScheduleWalker::new(&snapshot.dataset, &snapshot.graph, &policy)
                    .walk(&path, depart_after)
            })
        });

        // Ranking prunes against the earliest arrival of all paths, so every
        // walk must have finished.
        let mut journeys: Vec<Journey> = Vec::new();
        for walked in join_all(walks).await {
            journeys.extend(walked?);
        }

        Ok(Planner::new(
            &snapshot.dataset,
            &snapshot.graph,
            &self.policy,
            self.filter.as_ref(),
        )
        .finish(paths.len(), journeys))
    }

    /// Departure board for a station on the current snapshot.
    pub async fn departures(
        &self,
        station: &str,
        from: RailTime,
    ) -> Result<Vec<Departure>, RoutingError> {
        let snapshot = self.snapshot().await?;
        let id = snapshot
            .graph
            .find_station(station)
            .ok_or_else(|| RoutingError::UnknownStation(station.to_string()))?;
        Ok(departure_board(
            &snapshot.dataset,
            &snapshot.graph,
            &self.policy,
            id,
            from,
        ))
    }

    /// Sorted names of the stations trips call at.
    pub async fn station_names(&self) -> Result<Vec<String>, RoutingError> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot
            .graph
            .served_station_names()
            .into_iter()
            .map(str::to_owned)
            .collect())
    }

    /// Returns the number of cached plan results (for monitoring).
    pub fn cached_plans(&self) -> u64 {
        self.cache.entry_count()
    }
}
