//! Per-request locale selection.
//!
//! Order of precedence: the `lang` query parameter, then the
//! `Accept-Language` header, then the configured default.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Query};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;
use parkwatch_core::Locale;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::state::SharedState;

/// Query parameter that selects the response language.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LangQuery {
    /// Language for labels and messages (`es` or `en`).
    #[param(example = "en")]
    pub lang: Option<String>,
}

/// Locale resolved for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLocale(pub Locale);

impl FromRequestParts<SharedState> for RequestLocale {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let from_query = Query::<LangQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.lang)
            .and_then(|lang| Locale::from_tag(&lang));

        let locale = from_query
            .or_else(|| {
                parts
                    .headers
                    .get(ACCEPT_LANGUAGE)
                    .and_then(|value| value.to_str().ok())
                    .and_then(Locale::from_accept_language)
            })
            .unwrap_or(state.default_locale);

        Ok(Self(locale))
    }
}
