//! Liveness and store reachability.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use parkwatch_core::StorageBackend;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::SharedState;

/// Overall service condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The session store answered.
    Ok,
    /// The session store failed; check-ins and check-outs will fail too.
    Degraded,
}

/// Health report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "ok",
    "version": "0.1.0",
    "storage": "json",
    "sessions": 42,
    "parked": 7
}))]
pub struct HealthResponse {
    /// Overall condition.
    pub status: HealthStatus,

    /// Server version.
    #[schema(example = "0.1.0")]
    pub version: String,

    /// Session store in use.
    pub storage: StorageBackend,

    /// Sessions recorded, absent if the store failed.
    pub sessions: Option<usize>,

    /// Vehicles currently inside, absent if the store failed.
    pub parked: Option<usize>,
}

/// Creates the health router.
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(health_check))
}

/// Report whether the session store is reachable.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    operation_id = "healthCheck",
    summary = "Check service health",
    description = "Reads the session store and reports its backend and how many \
        vehicles are parked. Answers 503 when the store cannot be read.",
    responses(
        (status = 200, description = "Store reachable", body = HealthResponse),
        (status = 503, description = "Store failing", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
    let storage = state.service.storage_backend();
    let counts = match state.service.list_all() {
        Ok(sessions) => Some((
            sessions.len(),
            sessions.iter().filter(|s| s.is_open()).count(),
        )),
        Err(err) => {
            tracing::warn!(error = %err, ?storage, "Health check could not read sessions");
            None
        }
    };

    let (code, status) = if counts.is_some() {
        (StatusCode::OK, HealthStatus::Ok)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Degraded)
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            storage,
            sessions: counts.map(|(total, _)| total),
            parked: counts.map(|(_, open)| open),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use parkwatch_core::{
        ManualClock, MemoryStore, NewSession, ParkingConfig, SessionStore, StoreError,
        StoreResult, VehicleSession, VehicleType,
    };

    use crate::state::AppState;

    struct UnreadableStore;

    impl SessionStore for UnreadableStore {
        fn create(&self, _new: NewSession) -> StoreResult<VehicleSession> {
            Err(StoreError::Poisoned)
        }
        fn update(&self, _session: &VehicleSession) -> StoreResult<()> {
            Err(StoreError::Poisoned)
        }
        fn find_all(&self) -> StoreResult<Vec<VehicleSession>> {
            Err(StoreError::Poisoned)
        }
        fn find_open_by_plate(&self, _plate: &str) -> StoreResult<Option<VehicleSession>> {
            Err(StoreError::Poisoned)
        }
        fn backend(&self) -> StorageBackend {
            StorageBackend::Json
        }
    }

    fn state_with(store: Arc<dyn SessionStore>) -> SharedState {
        AppState::with_parts(
            &ParkingConfig::default(),
            store,
            Arc::new(ManualClock::new(Utc::now())),
        )
    }

    #[tokio::test]
    async fn test_health_counts_parked_vehicles() {
        let state = state_with(Arc::new(MemoryStore::new()));
        state.service.check_in_as("ABC-123", VehicleType::Car).await.unwrap();
        state.service.check_in_as("XYZ-9", VehicleType::Motorcycle).await.unwrap();
        state.service.check_out("XYZ-9").await.unwrap();

        let (code, Json(report)) = health_check(State(state)).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(report.status, HealthStatus::Ok);
        assert_eq!(report.storage, StorageBackend::Memory);
        assert_eq!(report.sessions, Some(2));
        assert_eq!(report.parked, Some(1));
        assert_eq!(report.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_unreadable_store_degrades_health() {
        let (code, Json(report)) = health_check(State(state_with(Arc::new(UnreadableStore)))).await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.storage, StorageBackend::Json);
        assert_eq!(report.sessions, None);
        assert_eq!(report.parked, None);
    }
}
