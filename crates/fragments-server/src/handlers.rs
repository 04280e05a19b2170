use axum::body::Bytes;
use axum::extract::{FromRequest, Path, Query, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Owner;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Unauthenticated health check.
pub async fn health() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "no-cache")],
        Json(json!({
            "status": "ok",
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub expand: Option<String>,
}

pub async fn list_fragments(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let expand = match query.expand.as_deref() {
        None | Some("") => false,
        Some("1") => true,
        Some(other) => {
            return Err(ApiError::bad_request(format!(
                "invalid value for 'expand' query parameter: expected '1', got '{other}'"
            )))
        }
    };
    let fragments = state.service.list(&owner, expand).await?;
    Ok(Json(json!({ "status": "ok", "fragments": fragments })))
}

pub async fn create_fragment(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    req: Request,
) -> ApiResult<Response> {
    let (content_type, body) = typed_body(&state, req).await?;
    let fragment = state.service.create(&owner, &content_type, body).await?;
    let location = state.config.fragment_url(fragment.id().as_str());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(json!({ "status": "ok", "fragment": fragment })),
    )
        .into_response())
}

/// `GET /v1/fragments/{id}` or `/v1/fragments/{id}.{ext}`.
pub async fn get_fragment(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(raw): Path<String>,
) -> ApiResult<Response> {
    // Only the segment after the first dot names the extension.
    let mut parts = raw.split('.');
    let id = parts.next().unwrap_or_default();
    let ext = parts.next();
    let data = state.service.get_data(&owner, id, ext).await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, data.content_type)],
        data.data,
    )
        .into_response())
}

pub async fn get_fragment_info(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let fragment = state.service.get_metadata(&owner, &id).await?;
    Ok(Json(json!({ "status": "ok", "fragment": fragment })))
}

pub async fn update_fragment(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<String>,
    req: Request,
) -> ApiResult<Json<Value>> {
    let (content_type, body) = typed_body(&state, req).await?;
    let fragment = state.service.update(&owner, &id, &content_type, body).await?;
    Ok(Json(json!({ "status": "ok", "fragment": fragment })))
}

pub async fn delete_fragment(
    State(state): State<AppState>,
    Extension(Owner(owner)): Extension<Owner>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.service.delete(&owner, &id).await?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("not found")
}

/// The request's `Content-Type`; a missing or unsupported value is 415.
fn content_type(headers: &HeaderMap) -> ApiResult<&str> {
    let value = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unsupported_media_type("missing Content-Type"))?;
    if !fragments_types::is_supported_type(value) {
        return Err(ApiError::unsupported_media_type(format!(
            "unsupported Content-Type: {value}"
        )));
    }
    Ok(value)
}

/// Check `Content-Type`, then buffer the body. Unsupported types are
/// rejected before any of the payload is read.
///
/// Body extraction failures keep their status (413 over the limit).
async fn typed_body(state: &AppState, req: Request) -> ApiResult<(String, Bytes)> {
    let content_type = content_type(req.headers())?.to_owned();
    let body = Bytes::from_request(req, state)
        .await
        .map_err(|rejection| ApiError::new(rejection.status(), rejection.body_text()))?;
    Ok((content_type, body))
}
