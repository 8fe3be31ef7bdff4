//! GTFS rail journey planner.
//!
//! Loads a GTFS snapshot for one service date, collapses its stops into
//! stations, and answers "how do I get from A to B after time T?" with a
//! ranked list of itineraries of at most three changes.

pub mod config;
pub mod dataset;
pub mod domain;
pub mod engine;
pub mod graph;
pub mod planner;
pub mod web;
