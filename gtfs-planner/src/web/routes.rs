//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Duration, Local, TimeZone};
use tracing::{error, info, warn};

use crate::domain::RailTime;
use crate::planner::RoutingError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stations", get(list_stations))
        .route("/api/timetable", get(timetable))
        .route("/api/departures", get(departures))
        .route("/journey/plan", get(plan_journey))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Names of all served stations, sorted.
async fn list_stations(State(state): State<AppState>) -> Result<Json<StationsResponse>, AppError> {
    let stations = state.engine.station_names().await?;
    Ok(Json(StationsResponse { stations }))
}

/// Timetable coverage and a suggested departure time.
async fn timetable(
    State(state): State<AppState>,
    Query(req): Query<TimetableRequest>,
) -> Result<Json<TimetableResponse>, AppError> {
    let when = request_time(req.when)?;
    let snapshot = state.engine.snapshot().await?;
    let (first, last, suggested) = match snapshot.timetable(when) {
        Some((first, last, suggested)) => (Some(first), Some(last), suggested),
        None => (None, None, when),
    };

    Ok(Json(TimetableResponse {
        version: snapshot.version,
        first_departure: first.map(TimeResult::from_rail_time),
        last_departure: last.map(TimeResult::from_rail_time),
        suggested: TimeResult::from_rail_time(suggested),
    }))
}

/// Departure board for a station.
async fn departures(
    State(state): State<AppState>,
    Query(req): Query<DeparturesRequest>,
) -> Result<Json<DeparturesResponse>, AppError> {
    let from = request_time(req.when)?;
    let board = state.engine.departures(&req.station, from).await?;

    Ok(Json(DeparturesResponse {
        station: req.station,
        departures: board.iter().map(DepartureResult::from_departure).collect(),
    }))
}

/// Plan journeys between two stations.
async fn plan_journey(
    State(state): State<AppState>,
    Query(req): Query<PlanJourneyRequest>,
) -> Result<Json<PlanJourneyResponse>, AppError> {
    let depart_after = request_time(req.when)?;
    info!(from = %req.from, to = %req.to, %depart_after, "Planning journey");

    let result = state.engine.plan(&req.from, &req.to, depart_after).await?;
    Ok(Json(PlanJourneyResponse::from_result(&result)))
}

/// Interpret an optional Unix timestamp in local time, defaulting to now.
///
/// The instant must leave a day of calendar after it for search windows.
fn request_time(when: Option<i64>) -> Result<RailTime, AppError> {
    let Some(secs) = when else {
        return Ok(RailTime::from_datetime(Local::now().naive_local()));
    };
    let invalid = || AppError::BadRequest {
        message: format!("Invalid timestamp: {secs}"),
    };

    let utc = DateTime::from_timestamp(secs, 0).ok_or_else(invalid)?.naive_utc();
    let offset = Local.offset_from_utc_datetime(&utc).local_minus_utc();
    let local = utc
        .checked_add_signed(Duration::seconds(i64::from(offset)))
        .ok_or_else(invalid)?;
    let time = RailTime::from_datetime(local);
    time.checked_add(Duration::days(1)).ok_or_else(invalid)?;
    Ok(time)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Unavailable { message: String },
    Internal { message: String },
}

impl From<RoutingError> for AppError {
    fn from(e: RoutingError) -> Self {
        match e {
            RoutingError::UnknownStation(_) | RoutingError::SameStation(_) => {
                AppError::BadRequest {
                    message: e.to_string(),
                }
            }
            RoutingError::DatasetUnavailable => AppError::Unavailable {
                message: e.to_string(),
            },
            RoutingError::EvaluationFailed(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request failed");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
