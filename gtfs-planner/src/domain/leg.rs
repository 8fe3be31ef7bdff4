//! Display legs and itineraries.
//!
//! An `Itinerary` is what a traveller reads: it starts with a `Departure`,
//! alternates `Trip` legs with `Transfer` legs, and ends with an `Arrival`.

use chrono::Duration;

use super::{Fingerprint, RailTime};

/// One displayed segment of an itinerary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leg {
    /// Leaving the origin station.
    Departure {
        time: RailTime,
        station: String,
        platform: Option<String>,
    },
    /// Riding one service.
    Trip { service: String, headsign: String },
    /// Reaching the destination station.
    Arrival {
        time: RailTime,
        station: String,
        platform: Option<String>,
    },
    /// Changing trains: alighting at `times[0]` on `platforms[0]`, boarding
    /// at `times[1]` on `platforms[1]`.
    Transfer {
        station: String,
        times: [RailTime; 2],
        platforms: [Option<String>; 2],
        dwell_minutes: i64,
    },
}

impl Leg {
    /// Returns true if this is a transfer leg.
    pub fn is_transfer(&self) -> bool {
        matches!(self, Leg::Transfer { .. })
    }

    /// Returns true if this is a riding leg.
    pub fn is_trip(&self) -> bool {
        matches!(self, Leg::Trip { .. })
    }

    /// Short name of the leg kind, as used in serialized output.
    pub fn kind(&self) -> &'static str {
        match self {
            Leg::Departure { .. } => "Departure",
            Leg::Trip { .. } => "Trip",
            Leg::Arrival { .. } => "Arrival",
            Leg::Transfer { .. } => "Transfer",
        }
    }
}

/// A ranked, display-ready journey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itinerary {
    /// Stable identity of the underlying journey.
    pub id: Fingerprint,
    /// Departure from the origin.
    pub departure: RailTime,
    /// Arrival at the destination.
    pub arrival: RailTime,
    /// Number of changes.
    pub transfers: usize,
    /// Legs in travel order.
    pub legs: Vec<Leg>,
}

impl Itinerary {
    /// Returns the door-to-door duration.
    pub fn duration(&self) -> Duration {
        self.arrival.signed_duration_since(self.departure)
    }

    /// Returns the transfer legs.
    pub fn transfer_legs(&self) -> impl Iterator<Item = &Leg> {
        self.legs.iter().filter(|leg| leg.is_transfer())
    }
}
