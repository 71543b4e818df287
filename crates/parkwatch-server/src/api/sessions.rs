//! Vehicle session API endpoints.
//!
//! A vehicle is checked in when it enters the facility and checked out
//! when it leaves. Checkout bills every whole hour spent inside, with a
//! minimum of one hour, at the rate of the vehicle's category.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use parkwatch_core::{
    Locale, MessageId, ParkingError, SessionId, SessionState, VehicleSession, VehicleType,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::api::locale::{LangQuery, RequestLocale};
use crate::state::{AppState, SharedState};

/// Format of facility-local timestamps.
const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Creates the sessions router with all endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_sessions).post(check_in))
        .route("/open/{plate}", get(find_open_session))
        .route("/open/{plate}/exit", put(check_out))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// A vehicle session as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "01932c4e-8f3a-7b2e-9d41-5a6c7e8f9a0b",
    "plate": "ABC-123",
    "vehicle_type": "car",
    "vehicle_type_label": "carro",
    "state": "closed",
    "entry_time": "2025-01-15T13:00:00Z",
    "entry_time_local": "2025-01-15 08:00:00",
    "exit_time": "2025-01-15T15:10:00Z",
    "exit_time_local": "2025-01-15 10:10:00",
    "billed_hours": 2,
    "total_cost": 4000
}))]
pub struct SessionResponse {
    /// Session identifier.
    pub id: SessionId,

    /// Vehicle plate.
    #[schema(example = "ABC-123")]
    pub plate: String,

    /// Vehicle category.
    pub vehicle_type: VehicleType,

    /// Category label in the request locale.
    #[schema(example = "carro")]
    pub vehicle_type_label: String,

    /// Whether the vehicle is still inside.
    pub state: SessionState,

    /// Entry time (UTC).
    pub entry_time: DateTime<Utc>,

    /// Entry time in the facility timezone.
    #[schema(example = "2025-01-15 08:00:00")]
    pub entry_time_local: String,

    /// Exit time (UTC), absent while open.
    pub exit_time: Option<DateTime<Utc>>,

    /// Exit time in the facility timezone, absent while open.
    #[schema(example = "2025-01-15 10:10:00")]
    pub exit_time_local: Option<String>,

    /// Hours billed, absent while open.
    #[schema(example = 2)]
    pub billed_hours: Option<u64>,

    /// Fee charged at checkout; zero while open.
    #[schema(example = 4000)]
    pub total_cost: u64,
}

impl SessionResponse {
    fn render(session: VehicleSession, state: &AppState, locale: Locale) -> Self {
        let local = |t: DateTime<Utc>| local_time(t, state.timezone);
        Self {
            vehicle_type_label: state.service.tariffs().label(session.vehicle_type, locale),
            state: session.state(),
            entry_time_local: local(session.entry_time),
            exit_time_local: session.exit_time.map(local),
            billed_hours: session.billed_hours(),
            id: session.id,
            plate: session.plate,
            vehicle_type: session.vehicle_type,
            entry_time: session.entry_time,
            exit_time: session.exit_time,
            total_cost: session.total_cost,
        }
    }
}

/// Result of a check-in or check-out.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionActionResponse {
    /// Localized confirmation.
    #[schema(example = "Vehicle with plate ABC-123 checked in.")]
    pub message: String,

    /// The session after the operation.
    pub session: SessionResponse,
}

/// Every recorded session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionListResponse {
    /// Sessions in check-in order.
    pub sessions: Vec<SessionResponse>,

    /// Number of sessions.
    #[schema(example = 1)]
    pub total: usize,

    /// How many are still open.
    #[schema(example = 1)]
    pub open: usize,
}

/// Request body for checking a vehicle in.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "plate": "ABC-123",
    "vehicle_type": "carro"
}))]
pub struct CheckInRequest {
    /// Vehicle plate. Any printable text without '/'; surrounding
    /// whitespace is trimmed.
    #[schema(example = "ABC-123", min_length = 1)]
    pub plate: String,

    /// Vehicle category label in the request locale, case-insensitive
    /// (`carro`/`moto` or `car`/`motorcycle`).
    #[schema(example = "carro")]
    pub vehicle_type: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// List every session.
#[utoipa::path(
    get,
    path = "/api/sessions",
    tag = "sessions",
    operation_id = "listSessions",
    summary = "List all sessions",
    description = "Returns every session ever recorded, open and closed, in check-in order.",
    params(LangQuery),
    responses(
        (status = 200, description = "Sessions retrieved", body = SessionListResponse)
    )
)]
pub async fn list_sessions(
    State(state): State<SharedState>,
    RequestLocale(locale): RequestLocale,
) -> ApiResult<Json<SessionListResponse>> {
    let sessions = state
        .service
        .list_all()
        .map_err(|e| fail(&state, &e, locale))?;

    let open = sessions.iter().filter(|s| s.is_open()).count();
    let sessions: Vec<_> = sessions
        .into_iter()
        .map(|s| SessionResponse::render(s, &state, locale))
        .collect();

    Ok(Json(SessionListResponse {
        total: sessions.len(),
        open,
        sessions,
    }))
}

/// Check a vehicle in.
#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "sessions",
    operation_id = "checkIn",
    summary = "Check a vehicle in",
    description = "Opens a session for the plate with the current time as entry time. \
        Fails if the plate already has an open session or the vehicle type \
        matches no category label in the request language.",
    params(LangQuery),
    request_body = CheckInRequest,
    responses(
        (status = 201, description = "Vehicle checked in", body = SessionActionResponse),
        (status = 400, description = "Invalid plate or vehicle type", body = ErrorResponse),
        (status = 409, description = "Plate already has an open session", body = ErrorResponse)
    )
)]
pub async fn check_in(
    State(state): State<SharedState>,
    RequestLocale(locale): RequestLocale,
    Json(request): Json<CheckInRequest>,
) -> ApiResult<(StatusCode, Json<SessionActionResponse>)> {
    let session = state
        .service
        .check_in(&request.plate, &request.vehicle_type, locale)
        .await
        .map_err(|e| fail(&state, &e, locale))?;

    let message = state
        .catalog
        .text(locale, MessageId::VehicleRegistered, &[&session.plate]);

    Ok((
        StatusCode::CREATED,
        Json(SessionActionResponse {
            message,
            session: SessionResponse::render(session, &state, locale),
        }),
    ))
}

/// Look up the open session for a plate.
#[utoipa::path(
    get,
    path = "/api/sessions/open/{plate}",
    tag = "sessions",
    operation_id = "findOpenSession",
    summary = "Find a parked vehicle",
    description = "Returns the open session for the plate, if the vehicle is inside.",
    params(
        ("plate" = String, Path, description = "Vehicle plate", example = "ABC-123"),
        LangQuery
    ),
    responses(
        (status = 200, description = "Vehicle is parked", body = SessionResponse),
        (status = 404, description = "No open session for the plate", body = ErrorResponse)
    )
)]
pub async fn find_open_session(
    State(state): State<SharedState>,
    RequestLocale(locale): RequestLocale,
    Path(plate): Path<String>,
) -> ApiResult<Json<SessionResponse>> {
    let session = state
        .service
        .find_open(&plate)
        .map_err(|e| fail(&state, &e, locale))?;

    Ok(Json(SessionResponse::render(session, &state, locale)))
}

/// Check a vehicle out and bill it.
#[utoipa::path(
    put,
    path = "/api/sessions/open/{plate}/exit",
    tag = "sessions",
    operation_id = "checkOut",
    summary = "Check a vehicle out",
    description = "Closes the open session for the plate. Elapsed time is truncated to \
        whole hours with a one hour minimum and multiplied by the category's hourly rate.",
    params(
        ("plate" = String, Path, description = "Vehicle plate", example = "ABC-123"),
        LangQuery
    ),
    responses(
        (status = 200, description = "Vehicle checked out", body = SessionActionResponse),
        (status = 404, description = "No open session for the plate", body = ErrorResponse)
    )
)]
pub async fn check_out(
    State(state): State<SharedState>,
    RequestLocale(locale): RequestLocale,
    Path(plate): Path<String>,
) -> ApiResult<Json<SessionActionResponse>> {
    let session = state
        .service
        .check_out(&plate)
        .await
        .map_err(|e| fail(&state, &e, locale))?;

    let message = state.catalog.text(
        locale,
        MessageId::VehicleExit,
        &[&session.plate, &session.total_cost],
    );

    Ok(Json(SessionActionResponse {
        message,
        session: SessionResponse::render(session, &state, locale),
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn fail(state: &AppState, err: &ParkingError, locale: Locale) -> ApiError {
    if err.is_recoverable() {
        tracing::debug!(error = %err, "Request rejected");
    }
    ApiError::localized(err, &state.catalog, locale)
}

fn local_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(LOCAL_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_local_time_uses_facility_timezone() {
        let instant = Utc.with_ymd_and_hms(2025, 1, 15, 13, 0, 0).unwrap();
        assert_eq!(
            local_time(instant, chrono_tz::America::Bogota),
            "2025-01-15 08:00:00"
        );
        assert_eq!(local_time(instant, chrono_tz::UTC), "2025-01-15 13:00:00");
    }

    #[test]
    fn test_check_in_request_deserialization() {
        let json = r#"{"plate": "ABC-123", "vehicle_type": "Carro"}"#;
        let request: CheckInRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.plate, "ABC-123");
        assert_eq!(request.vehicle_type, "Carro");
    }
}
