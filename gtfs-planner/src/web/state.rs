//! Application state for the web layer.

use crate::engine::RoutingEngine;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Routing engine holding the published timetable
    pub engine: RoutingEngine,
}

impl AppState {
    /// Create a new app state.
    pub fn new(engine: RoutingEngine) -> Self {
        Self { engine }
    }
}
