//! Localized landing text.

use axum::extract::State;
use axum::Json;
use parkwatch_core::{Locale, MessageId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::locale::{LangQuery, RequestLocale};
use crate::state::SharedState;

/// Welcome text in the request locale.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "message": "Bienvenido al parqueadero.",
    "locale": "es"
}))]
pub struct WelcomeResponse {
    /// Localized welcome text.
    #[schema(example = "Bienvenido al parqueadero.")]
    pub message: String,

    /// Locale the text was rendered in.
    pub locale: Locale,
}

/// Greet the caller in their language.
#[utoipa::path(
    get,
    path = "/api/welcome",
    tag = "system",
    operation_id = "welcome",
    summary = "Localized welcome text",
    description = "Returns the welcome text in the language chosen by the `lang` \
        parameter, the Accept-Language header, or the configured default.",
    params(LangQuery),
    responses(
        (status = 200, description = "Welcome text", body = WelcomeResponse)
    )
)]
pub async fn welcome(
    State(state): State<SharedState>,
    RequestLocale(locale): RequestLocale,
) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: state.catalog.text(locale, MessageId::Welcome, &[]),
        locale,
    })
}
