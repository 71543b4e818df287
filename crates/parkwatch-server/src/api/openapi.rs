//! OpenAPI specification generation for the parkwatch API.
//!
//! The document is served at `/api/openapi.json` (with Swagger UI at
//! `/swagger-ui`) and written to disk by the `gen-openapi` binary.

use utoipa::OpenApi;

use super::error::ErrorResponse;
use super::health::{HealthResponse, HealthStatus};
use super::sessions::{
    CheckInRequest, SessionActionResponse, SessionListResponse, SessionResponse,
};
use super::welcome::WelcomeResponse;
use parkwatch_core::{Locale, SessionId, SessionState, StorageBackend, VehicleType};

/// Returns the OpenAPI specification as a string (for writing to file).
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn get_openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}

/// Main OpenAPI document structure for parkwatch.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "parkwatch API",
        version = "0.1.0",
        description = r#"
# parkwatch API

parkwatch tracks vehicles inside a parking facility.

## Overview

1. **Check-in** records the entry time of a plate. A plate can only have one open session.
2. **Check-out** records the exit time and bills whole hours (truncated, minimum one hour)
   at the hourly rate of the vehicle's category.
3. **Lookup** returns the open session of a parked plate.
4. **Listing** returns every session ever recorded.

## Language

Vehicle type labels and messages follow the `lang` query parameter (`es` or `en`),
then the `Accept-Language` header, then the server default. Check-in expects the
vehicle type as a label in that language (`carro`/`moto` or `car`/`motorcycle`).
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Local parkwatch server")
    ),
    tags(
        (
            name = "system",
            description = "Health checks and localized landing text"
        ),
        (
            name = "sessions",
            description = "Vehicle check-in, check-out and lookup"
        )
    ),
    paths(
        // System endpoints
        super::health::health_check,
        super::welcome::welcome,
        // Session endpoints
        super::sessions::list_sessions,
        super::sessions::check_in,
        super::sessions::find_open_session,
        super::sessions::check_out,
    ),
    components(
        schemas(
            // Error types
            ErrorResponse,
            // System types
            HealthResponse,
            HealthStatus,
            StorageBackend,
            WelcomeResponse,
            Locale,
            // Session types
            SessionId,
            SessionState,
            VehicleType,
            SessionResponse,
            SessionActionResponse,
            SessionListResponse,
            CheckInRequest,
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generation() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "parkwatch API");
        assert!(spec.paths.paths.contains_key("/api/sessions"));
        assert!(spec.paths.paths.contains_key("/api/sessions/open/{plate}/exit"));
    }

    #[test]
    fn test_openapi_json_serialization() {
        let json = get_openapi_json().unwrap();
        assert!(json.contains("\"openapi\":"));
        assert!(json.contains("\"parkwatch API\""));
        assert!(json.contains("checkIn"));
    }
}
