//! Web layer for the journey planner.
//!
//! A thin JSON API over the routing engine.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
