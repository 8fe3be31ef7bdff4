//! Departure boards.

use crate::dataset::{Dataset, StopTime};
use crate::domain::{RailTime, StationId, StopTimeId};
use crate::graph::RoutingGraph;

use super::config::RoutingPolicy;

/// One row of a departure board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub stop_time: StopTimeId,
    pub time: RailTime,
    /// Agency and long name, e.g. "NS Intercity".
    pub service: String,
    pub headsign: String,
    pub platform: Option<String>,
}

/// Departures from `station` within the board window after `from`.
///
/// Trips terminating at the station (headsign equal to the station name)
/// are left out. At most `board_limit` rows are returned, in time order.
pub fn departure_board(
    dataset: &Dataset,
    graph: &RoutingGraph,
    policy: &RoutingPolicy,
    station: StationId,
    from: RailTime,
) -> Vec<Departure> {
    let station = graph.station(station);
    let Some(until) = from.checked_add(policy.board_window()) else {
        return Vec::new();
    };

    let mut rows: Vec<&StopTime> = station
        .stops
        .iter()
        .flat_map(|stop| dataset.departures_between(*stop, from, until))
        .filter(|st| dataset.headsign_at(st.id) != station.name)
        .collect();
    rows.sort_by_key(|st| (st.departure, st.id));
    rows.truncate(policy.board_limit);

    rows.into_iter()
        .map(|st| Departure {
            stop_time: st.id,
            time: st.departure,
            service: dataset.service_name(st.trip),
            headsign: dataset.headsign_at(st.id).to_owned(),
            platform: dataset.stop(st.stop).platform.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::{FeedBuilder, time};
    use crate::graph;
    use chrono::NaiveDateTime;

    fn network() -> (Dataset, RoutingGraph) {
        let ds = FeedBuilder::new()
            .station("ut", "Utrecht Centraal", 52.089, 5.110)
            .platform("ut5", "Utrecht Centraal", "ut", "5")
            .platform("ut7", "Utrecht Centraal", "ut", "7")
            .station("asd", "Amsterdam Centraal", 52.379, 4.900)
            .route("ic", "Intercity")
            .route("spr", "Sprinter")
            .trip("a", "ic", "Amsterdam Centraal", &[("ut7", "", "10:20"), ("asd", "10:45", "")])
            .trip("b", "spr", "Amsterdam Centraal", &[("ut5", "", "10:05"), ("asd", "10:50", "")])
            .trip("c", "ic", "Amsterdam Centraal", &[("ut7", "", "11:06"), ("asd", "11:31", "")])
            // Terminates at Utrecht.
            .trip("d", "ic", "Utrecht Centraal", &[("asd", "", "09:40"), ("ut5", "10:05", "10:10")])
            .build();
        let graph = graph::build(&ds).unwrap();
        (ds, graph)
    }

    #[test]
    fn board_lists_upcoming_departures() {
        let (ds, graph) = network();
        let policy = RoutingPolicy::default();
        let ut = graph.find_station("Utrecht Centraal").unwrap();

        let board = departure_board(&ds, &graph, &policy, ut, time("10:00"));

        let rows: Vec<(RailTime, &str, Option<&str>)> = board
            .iter()
            .map(|d| (d.time, d.service.as_str(), d.platform.as_deref()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (time("10:05"), "NS Sprinter", Some("5")),
                (time("10:20"), "NS Intercity", Some("7")),
            ]
        );
        assert!(board.iter().all(|d| d.headsign == "Amsterdam Centraal"));
    }

    #[test]
    fn board_is_limited() {
        let (ds, graph) = network();
        let policy = RoutingPolicy {
            board_limit: 1,
            ..RoutingPolicy::default()
        };
        let ut = graph.find_station("Utrecht Centraal").unwrap();

        let board = departure_board(&ds, &graph, &policy, ut, time("10:00"));

        assert_eq!(board.len(), 1);
        assert_eq!(board[0].time, time("10:05"));
    }

    #[test]
    fn terminating_station_has_empty_board() {
        let (ds, graph) = network();
        let policy = RoutingPolicy::default();
        let asd = graph.find_station("Amsterdam Centraal").unwrap();

        // Only trip d departs from Amsterdam, and only before 10:00.
        assert!(departure_board(&ds, &graph, &policy, asd, time("10:00")).is_empty());
        assert_eq!(departure_board(&ds, &graph, &policy, asd, time("09:30")).len(), 1);
    }

    #[test]
    fn board_at_end_of_calendar_is_empty() {
        let (ds, graph) = network();
        let policy = RoutingPolicy::default();
        let ut = graph.find_station("Utrecht Centraal").unwrap();
        let from = RailTime::from_datetime(NaiveDateTime::MAX);

        assert!(departure_board(&ds, &graph, &policy, ut, from).is_empty());
    }
}
