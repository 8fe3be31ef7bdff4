//! Domain types for the journey planner.
//!
//! This module contains the core domain model types shared by the dataset,
//! the routing graph and the planner. Types that carry invariants enforce
//! them at construction time.

mod error;
mod ids;
mod journey;
mod leg;
mod time;

pub use error::DomainError;
pub use ids::{RouteId, StationId, StopId, StopTimeId, TripId};
pub use journey::{Fingerprint, Journey};
pub use leg::{Itinerary, Leg};
pub use time::{RailTime, TimeError};
