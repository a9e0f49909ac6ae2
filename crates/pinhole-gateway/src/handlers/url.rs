use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, CreateUrlResponse, ListUrlsParams, ListUrlsResponse};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Redirect;
use axum::Json;
use pinhole_core::{LinkQuery, ShortCode, ShortLink};
use pinhole_shortener::ShortenParams;

/// Header carrying the signed-in user's id, set by the identity proxy in
/// front of the gateway. Absent for anonymous requests.
pub const OWNER_HEADER: &str = "x-pinhole-owner";

fn owner_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get(OWNER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub async fn create_url_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<CreateUrlResponse>)> {
    let params = ShortenParams {
        raw_url: request.url,
        custom_code: request.custom_code,
        owner_id: owner_from(&headers),
    };

    let link = state.shortener().shorten(params).await?;

    let response = CreateUrlResponse {
        id: link.id,
        short_url: state.short_url(&link.code),
        code: link.code.into_inner(),
        target_url: link.target_url.into_inner(),
        owner_id: link.owner_id,
        created_at: link.created_at,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_url_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ShortLink>> {
    let short_code =
        ShortCode::new(code.as_str()).map_err(|_| AppError::NotFound(code.clone()))?;

    state
        .links()
        .find_by_code(&short_code)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(code))
}

pub async fn list_urls_handler(
    Query(params): Query<ListUrlsParams>,
    State(state): State<AppState>,
) -> Result<Json<ListUrlsResponse>> {
    let query = LinkQuery::from(params);
    let page = state.links().list(&query).await?;

    Ok(Json(ListUrlsResponse {
        links: page.links,
        total: page.total,
    }))
}

pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect> {
    let target = state.redirector().resolve(&code).await?;
    Ok(Redirect::temporary(target.as_str()))
}
