//! Journey types.
//!
//! A `Journey` is a schedule-feasible realization of a station path: an
//! alternating sequence of boarding and alighting stop-times. Display
//! formatting into legs happens later, in the planner.

use std::fmt;

use xxhash_rust::xxh3::xxh3_64;

use super::{DomainError, RailTime, StopTimeId};

/// Stable identity of a journey, derived from its ordered stop-times.
///
/// # Examples
///
/// ```
/// use gtfs_planner::domain::{Fingerprint, StopTimeId};
///
/// let a = Fingerprint::of(&[StopTimeId(1), StopTimeId(2)]);
/// let b = Fingerprint::of(&[StopTimeId(1), StopTimeId(2)]);
/// let c = Fingerprint::of(&[StopTimeId(2), StopTimeId(1)]);
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// assert_eq!(a.to_string().len(), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Hash an ordered list of stop-times.
    pub fn of(stop_times: &[StopTimeId]) -> Self {
        let bytes: Vec<u8> = stop_times
            .iter()
            .flat_map(|id| id.0.to_le_bytes())
            .collect();
        Self(xxh3_64(&bytes))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A complete, timetable-grounded journey.
///
/// # Invariants
///
/// - `stop_times` is non-empty and has even length: board, alight, board, ...
/// - `arrival >= departure`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    stop_times: Vec<StopTimeId>,
    departure: RailTime,
    arrival: RailTime,
    fingerprint: Fingerprint,
}

impl Journey {
    /// Construct a journey, validating its shape.
    pub fn new(
        stop_times: Vec<StopTimeId>,
        departure: RailTime,
        arrival: RailTime,
    ) -> Result<Self, DomainError> {
        if stop_times.is_empty() {
            return Err(DomainError::EmptyJourney);
        }
        if stop_times.len() % 2 != 0 {
            return Err(DomainError::UnpairedStopTimes(stop_times.len()));
        }
        if arrival < departure {
            return Err(DomainError::ArrivalBeforeDeparture);
        }

        let fingerprint = Fingerprint::of(&stop_times);
        Ok(Self {
            stop_times,
            departure,
            arrival,
            fingerprint,
        })
    }

    /// Returns the ordered board/alight stop-times.
    pub fn stop_times(&self) -> &[StopTimeId] {
        &self.stop_times
    }

    /// Returns (board, alight) pairs, one per ride.
    pub fn rides(&self) -> impl Iterator<Item = (StopTimeId, StopTimeId)> + '_ {
        self.stop_times.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }

    /// Returns the departure time from the origin.
    pub fn departure_time(&self) -> RailTime {
        self.departure
    }

    /// Returns the arrival time at the destination.
    pub fn arrival_time(&self) -> RailTime {
        self.arrival
    }

    /// Returns the number of transfers (rides minus one).
    pub fn transfer_count(&self) -> usize {
        self.stop_times.len() / 2 - 1
    }

    /// Returns the journey identity.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }
}
