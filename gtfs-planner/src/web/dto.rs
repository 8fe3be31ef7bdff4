//! Data transfer objects for web requests and responses.

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::domain::{Itinerary, Leg, RailTime};
use crate::planner::{Departure, PlanResult};

/// Request for a journey plan.
#[derive(Debug, Deserialize)]
pub struct PlanJourneyRequest {
    /// Origin station name
    pub from: String,

    /// Destination station name
    pub to: String,

    /// Earliest departure as Unix seconds (defaults to now)
    pub when: Option<i64>,
}

/// Request for a departure board.
#[derive(Debug, Deserialize)]
pub struct DeparturesRequest {
    /// Station name
    pub station: String,

    /// Start of the board as Unix seconds (defaults to now)
    pub when: Option<i64>,
}

/// Request for timetable coverage.
#[derive(Debug, Default, Deserialize)]
pub struct TimetableRequest {
    /// Intended departure as Unix seconds (defaults to now)
    pub when: Option<i64>,
}

/// A point in time as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeResult {
    /// "HH:MM"
    pub time: String,

    /// "YYYY-MM-DD"
    pub date: String,

    /// Unix seconds, interpreting the time in the server's local zone
    pub timestamp: Option<i64>,
}

impl TimeResult {
    pub fn from_rail_time(time: RailTime) -> Self {
        Self {
            time: time.to_string(),
            date: time.date().to_string(),
            timestamp: Local
                .from_local_datetime(&time.to_datetime())
                .earliest()
                .map(|dt| dt.timestamp()),
        }
    }
}

/// Served stations.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub stations: Vec<String>,
}

/// Range of departures the timetable covers.
#[derive(Debug, Serialize)]
pub struct TimetableResponse {
    /// Snapshot version
    pub version: u64,

    /// Earliest departure, if the timetable has any
    pub first_departure: Option<TimeResult>,

    /// Latest departure, if the timetable has any
    pub last_departure: Option<TimeResult>,

    /// The requested time if covered, else a morning departure on the first day
    pub suggested: TimeResult,
}

/// A departure board.
#[derive(Debug, Serialize)]
pub struct DeparturesResponse {
    pub station: String,
    pub departures: Vec<DepartureResult>,
}

/// One row of a departure board.
#[derive(Debug, Serialize)]
pub struct DepartureResult {
    pub time: TimeResult,
    pub service: String,
    pub headsign: String,
    pub platform: Option<String>,
}

impl DepartureResult {
    pub fn from_departure(departure: &Departure) -> Self {
        Self {
            time: TimeResult::from_rail_time(departure.time),
            service: departure.service.clone(),
            headsign: departure.headsign.clone(),
            platform: departure.platform.clone(),
        }
    }
}

/// Response for journey planning.
#[derive(Debug, Serialize)]
pub struct PlanJourneyResponse {
    /// Itineraries, best first
    pub itineraries: Vec<ItineraryResult>,

    /// Number of station paths evaluated
    pub candidate_paths: usize,

    /// True if planning ran out of time
    pub timed_out: bool,
}

impl PlanJourneyResponse {
    pub fn from_result(result: &PlanResult) -> Self {
        Self {
            itineraries: result
                .itineraries
                .iter()
                .map(ItineraryResult::from_itinerary)
                .collect(),
            candidate_paths: result.candidate_paths,
            timed_out: result.timed_out,
        }
    }
}

/// A single itinerary.
#[derive(Debug, Serialize)]
pub struct ItineraryResult {
    /// Stable identity, 16 hex digits
    pub id: String,
    pub departure: TimeResult,
    pub arrival: TimeResult,
    pub duration_mins: i64,
    pub transfers: usize,
    pub legs: Vec<LegResult>,
}

impl ItineraryResult {
    pub fn from_itinerary(itinerary: &Itinerary) -> Self {
        Self {
            id: itinerary.id.to_string(),
            departure: TimeResult::from_rail_time(itinerary.departure),
            arrival: TimeResult::from_rail_time(itinerary.arrival),
            duration_mins: itinerary.duration().num_minutes(),
            transfers: itinerary.transfers,
            legs: itinerary.legs.iter().map(LegResult::from_leg).collect(),
        }
    }
}

/// One leg of an itinerary, tagged by kind.
#[derive(Debug, Serialize)]
#[serde(tag = "kind")]
pub enum LegResult {
    Departure {
        time: TimeResult,
        station: String,
        platform: Option<String>,
    },
    Trip {
        service: String,
        headsign: String,
    },
    Transfer {
        station: String,
        arrival: TimeResult,
        arrival_platform: Option<String>,
        departure: TimeResult,
        departure_platform: Option<String>,
        dwell_minutes: i64,
    },
    Arrival {
        time: TimeResult,
        station: String,
        platform: Option<String>,
    },
}

impl LegResult {
    pub fn from_leg(leg: &Leg) -> Self {
        match leg {
            Leg::Departure {
                time,
                station,
                platform,
            } => LegResult::Departure {
                time: TimeResult::from_rail_time(*time),
                station: station.clone(),
                platform: platform.clone(),
            },
            Leg::Trip { service, headsign } => LegResult::Trip {
                service: service.clone(),
                headsign: headsign.clone(),
            },
            Leg::Transfer {
                station,
                times: [arrival, departure],
                platforms: [arrival_platform, departure_platform],
                dwell_minutes,
            } => LegResult::Transfer {
                station: station.clone(),
                arrival: TimeResult::from_rail_time(*arrival),
                arrival_platform: arrival_platform.clone(),
                departure: TimeResult::from_rail_time(*departure),
                departure_platform: departure_platform.clone(),
                dwell_minutes: *dwell_minutes,
            },
            Leg::Arrival {
                time,
                station,
                platform,
            } => LegResult::Arrival {
                time: TimeResult::from_rail_time(*time),
                station: station.clone(),
                platform: platform.clone(),
            },
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Fingerprint;
    use chrono::NaiveDate;

    fn make_time(s: &str) -> RailTime {
        RailTime::parse_hhmm(s, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()).unwrap()
    }

    fn itinerary() -> Itinerary {
        Itinerary {
            id: Fingerprint::of(&[]),
            departure: make_time("10:00"),
            arrival: make_time("10:55"),
            transfers: 1,
            legs: vec![
                Leg::Departure {
                    time: make_time("10:00"),
                    station: "Utrecht Centraal".into(),
                    platform: Some("5".into()),
                },
                Leg::Trip {
                    service: "NS Sprinter".into(),
                    headsign: "Amersfoort Centraal".into(),
                },
                Leg::Transfer {
                    station: "Amersfoort Centraal".into(),
                    times: [make_time("10:20"), make_time("10:27")],
                    platforms: [Some("1".into()), None],
                    dwell_minutes: 7,
                },
                Leg::Trip {
                    service: "NS Intercity".into(),
                    headsign: "Zwolle".into(),
                },
                Leg::Arrival {
                    time: make_time("10:55"),
                    station: "Zwolle".into(),
                    platform: None,
                },
            ],
        }
    }

    #[test]
    fn time_result_fields() {
        let time = TimeResult::from_rail_time(make_time("09:05"));

        assert_eq!(time.time, "09:05");
        assert_eq!(time.date, "2024-03-15");
        assert!(time.timestamp.is_some());
    }

    #[test]
    fn itinerary_result_from_itinerary() {
        let result = ItineraryResult::from_itinerary(&itinerary());

        assert_eq!(result.id.len(), 16);
        assert_eq!(result.departure.time, "10:00");
        assert_eq!(result.arrival.time, "10:55");
        assert_eq!(result.duration_mins, 55);
        assert_eq!(result.transfers, 1);
        assert_eq!(result.legs.len(), 5);
    }

    #[test]
    fn legs_serialize_with_kind_tag() {
        let result = ItineraryResult::from_itinerary(&itinerary());
        let json = serde_json::to_value(&result).unwrap();

        let kinds: Vec<&str> = json["legs"]
            .as_array()
            .unwrap()
            .iter()
            .map(|leg| leg["kind"].as_str().unwrap())
            .collect();
        assert_eq!(
            kinds,
            vec!["Departure", "Trip", "Transfer", "Trip", "Arrival"]
        );

        let transfer = &json["legs"][2];
        assert_eq!(transfer["station"], "Amersfoort Centraal");
        assert_eq!(transfer["arrival"]["time"], "10:20");
        assert_eq!(transfer["departure"]["time"], "10:27");
        assert_eq!(transfer["arrival_platform"], "1");
        assert!(transfer["departure_platform"].is_null());
        assert_eq!(transfer["dwell_minutes"], 7);
    }

    #[test]
    fn leg_kinds_match_domain() {
        for leg in &itinerary().legs {
            let json = serde_json::to_value(LegResult::from_leg(leg)).unwrap();
            assert_eq!(json["kind"], leg.kind());
        }
    }
}
