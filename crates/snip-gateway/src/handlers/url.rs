use crate::error::{AppError, Result};
use crate::model::{ShortenRequest, ShortenResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::debug;

pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>)> {
    let Json(request) = payload?;
    let mapping = state.shortener.shorten(request.long_url).await?;

    let response = ShortenResponse {
        short_url: mapping.short_code.to_url(state.base_url()),
        short_code: mapping.short_code.to_string(),
        long_url: mapping.long_url,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Answers with `302 Found` pointing at the stored long URL.
pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let long_url = state.redirector.resolve_raw(&short_code).await?;
    let location = HeaderValue::try_from(long_url).map_err(|e| {
        AppError::Internal(format!("stored url is not a valid header value: {e}"))
    })?;

    debug!(code = %short_code, "Redirecting");
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
