//! Journey planner over a GTFS rail timetable.
//!
//! Planning runs in four stages. Candidate station paths are enumerated
//! over the routing graph within a bounding box around origin and
//! destination. Each path is walked through the timetable to find
//! schedule-feasible journeys. Journeys from all paths are pooled and
//! ranked, and finally formatted into display legs.

mod board;
mod config;
mod filter;
mod format;
mod paths;
mod rank;
mod search;
mod walk;


pub use board::{Departure, departure_board};
pub use config::RoutingPolicy;
pub use filter::{AllowAll, CommaNameFilter, StationFilter};
pub use format::itinerary;
pub use paths::{BoundingBox, PathEnumerator, StationPath};
pub use rank::{compare, deduplicate, prune_late, rank, rank_journeys};
pub use search::{PlanResult, Planner, RoutingError};
pub use walk::ScheduleWalker;
