//! Feed snapshot records.
//!
//! A `Feed` holds the rows of an already-extracted GTFS feed for a single
//! service date, using GTFS field names. It is persisted as JSON so the
//! planner can start without repeating the extraction.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::DatasetError;

/// GTFS `route_type` for rail services.
pub const RAIL_ROUTE_TYPE: u16 = 2;

/// GTFS `transfer_type` meaning no transfer is possible.
pub const IMPOSSIBLE_TRANSFER: u8 = 3;

/// Raw rows of one service date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub service_date: NaiveDate,
    #[serde(default)]
    pub agencies: Vec<AgencyRecord>,
    pub stops: Vec<StopRecord>,
    pub routes: Vec<RouteRecord>,
    pub trips: Vec<TripRecord>,
    pub stop_times: Vec<StopTimeRecord>,
    #[serde(default)]
    pub transfers: Vec<TransferRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencyRecord {
    pub agency_id: String,
    pub agency_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecord {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
    #[serde(default)]
    pub parent_station: Option<String>,
    #[serde(default)]
    pub platform_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub route_id: String,
    #[serde(default)]
    pub agency_id: Option<String>,
    #[serde(default)]
    pub route_short_name: String,
    #[serde(default)]
    pub route_long_name: String,
    pub route_type: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub route_id: String,
    pub trip_id: String,
    #[serde(default)]
    pub trip_headsign: String,
    #[serde(default)]
    pub trip_short_name: String,
    #[serde(default)]
    pub trip_long_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopTimeRecord {
    pub trip_id: String,
    pub stop_sequence: u32,
    pub stop_id: String,
    #[serde(default)]
    pub stop_headsign: Option<String>,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub departure_time: Option<String>,
    #[serde(default)]
    pub shape_dist_traveled: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub from_stop_id: String,
    pub to_stop_id: String,
    #[serde(default)]
    pub transfer_type: u8,
    #[serde(default)]
    pub min_transfer_time: Option<u32>,
}

impl Feed {
    /// Read a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let bytes = std::fs::read(path)?;
        Self::from_slice(&bytes)
    }

    /// Parse a snapshot from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DatasetError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Write this snapshot to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let bytes = serde_json::to_vec(self)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Treat empty optional CSV cells as absent.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
