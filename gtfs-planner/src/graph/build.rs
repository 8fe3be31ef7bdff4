//! Graph Builder: collapse stops into stations and derive edges.

use std::collections::{BTreeSet, HashMap};

use tracing::info;

use super::{Edge, GraphError, RoutingGraph, Station};
use crate::dataset::Dataset;
use crate::domain::StationId;

/// Build the routing graph for a dataset.
///
/// Every distinct name among top-level stops becomes a station. A stop
/// without a parent joins its name's station; a stop with a parent joins the
/// parent's station. For every trip and every ordered pair of its
/// stop-times at different stations, a candidate edge is produced; the
/// final edge per station pair keeps the minimum distance and the minimum
/// stop count independently.
pub fn build(dataset: &Dataset) -> Result<RoutingGraph, GraphError> {
    let names: BTreeSet<&str> = dataset
        .stops()
        .iter()
        .filter(|s| s.parent.is_none())
        .map(|s| s.name.as_str())
        .collect();
    if names.is_empty() {
        return Err(GraphError::NoStations);
    }

    let mut stations: Vec<Station> = names
        .iter()
        .enumerate()
        .map(|(idx, name)| Station {
            id: StationId::from_index(idx),
            name: (*name).to_owned(),
            stops: Vec::new(),
            served: false,
        })
        .collect();
    let by_name: HashMap<String, StationId> = stations
        .iter()
        .map(|s| (s.name.clone(), s.id))
        .collect();

    let mut stop_station = Vec::with_capacity(dataset.stops().len());
    for stop in dataset.stops() {
        let home = match &stop.parent {
            None => by_name[&stop.name],
            Some(parent_id) => {
                // Parent references were validated when the dataset was built.
                let parent = dataset
                    .stop_by_external_id(parent_id)
                    .filter(|p| p.parent.is_none())
                    .ok_or_else(|| GraphError::NestedParent {
                        stop: stop.external_id.clone(),
                        parent: parent_id.clone(),
                    })?;
                by_name[&parent.name]
            }
        };
        stations[home.index()].stops.push(stop.id);
        stop_station.push(home);
    }

    for st in dataset.stop_times() {
        stations[stop_station[st.stop.index()].index()].served = true;
    }

    let mut best: HashMap<(StationId, StationId), Edge> = HashMap::new();
    for trip in dataset.trips() {
        let calls = dataset.trip_stop_times(trip.id);
        for (i, a) in calls.iter().enumerate() {
            let from = stop_station[a.stop.index()];
            for b in &calls[i + 1..] {
                let to = stop_station[b.stop.index()];
                if from == to {
                    continue;
                }
                // Feeds without shape distances report zero everywhere.
                let distance = (b.shape_dist - a.shape_dist).max(0.0);
                let stops = b.rank - a.rank;
                best.entry((from, to))
                    .and_modify(|edge| {
                        edge.distance = edge.distance.min(distance);
                        edge.stops = edge.stops.min(stops);
                    })
                    .or_insert(Edge {
                        from,
                        to,
                        distance,
                        stops,
                    });
            }
        }
    }

    let mut outgoing: Vec<Vec<Edge>> = vec![Vec::new(); stations.len()];
    for edge in best.into_values() {
        outgoing[edge.from.index()].push(edge);
    }
    for edges in &mut outgoing {
        edges.sort_by_key(|e| e.to);
    }

    let by_folded_name = stations
        .iter()
        .rev()
        .map(|s| (s.name.to_lowercase(), s.id))
        .collect();

    let graph = RoutingGraph {
        stations,
        stop_station,
        by_name,
        by_folded_name,
        outgoing,
    };

    info!(
        stations = graph.stations.len(),
        edges = graph.edge_count(),
        "Routing graph built"
    );

    Ok(graph)
}
