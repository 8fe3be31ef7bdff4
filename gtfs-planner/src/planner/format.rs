//! Formatter: turn ranked journeys into display legs.

use crate::dataset::Dataset;
use crate::domain::{Itinerary, Journey, Leg, StopTimeId};
use crate::graph::RoutingGraph;

/// Convert a journey into an itinerary.
///
/// The board/alight stop-times become `Departure`, then `Trip` and
/// `Arrival` per ride. Every later boarding folds the preceding `Arrival`
/// into a `Transfer`, so the legs read Departure, Trip, (Transfer, Trip)*,
/// Arrival.
pub fn itinerary(dataset: &Dataset, graph: &RoutingGraph, journey: &Journey) -> Itinerary {
    let mut legs: Vec<Leg> = Vec::with_capacity(journey.stop_times().len() + 1);

    for (board, alight) in journey.rides() {
        let boarding = dataset.stop_time(board);
        match legs.pop() {
            None => legs.push(Leg::Departure {
                time: boarding.departure,
                station: station_name(dataset, graph, board),
                platform: platform(dataset, board),
            }),
            Some(Leg::Arrival {
                time,
                station,
                platform: arrival_platform,
            }) => legs.push(Leg::Transfer {
                station,
                times: [time, boarding.departure],
                platforms: [arrival_platform, platform(dataset, board)],
                dwell_minutes: boarding.departure.signed_duration_since(time).num_minutes(),
            }),
            // Every ride ends with an Arrival.
            Some(other) => legs.push(other),
        }

        let alighting = dataset.stop_time(alight);
        legs.push(Leg::Trip {
            service: dataset.service_name(boarding.trip),
            headsign: dataset.headsign_at(board).to_owned(),
        });
        legs.push(Leg::Arrival {
            time: alighting.arrival,
            station: station_name(dataset, graph, alight),
            platform: platform(dataset, alight),
        });
    }

    Itinerary {
        id: journey.fingerprint(),
        departure: journey.departure_time(),
        arrival: journey.arrival_time(),
        transfers: journey.transfer_count(),
        legs,
    }
}

fn station_name(dataset: &Dataset, graph: &RoutingGraph, stop_time: StopTimeId) -> String {
    let stop = dataset.stop_time(stop_time).stop;
    graph.station(graph.station_of(stop)).name.clone()
}

fn platform(dataset: &Dataset, stop_time: StopTimeId) -> Option<String> {
    dataset.stop(dataset.stop_time(stop_time).stop).platform.clone()
}
