//! Application endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use thunder_core::error::app as app_errors;
use thunder_core::models::Application;

use crate::bootstrap::AppState;
use crate::handlers::{request_context, ApiError, PaginationQuery};
use crate::pagination::{build_links, Link, PageParams, PageParamError};
use crate::service::ApplicationRequest;

/// Routes under `/applications`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/applications", get(list).post(create))
        .route(
            "/applications/{id}",
            get(get_one).put(update).delete(delete_one),
        )
}

/// Compact application representation used in list responses.
#[derive(Debug, Serialize)]
struct ApplicationListItem {
    id: String,
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
}

impl From<Application> for ApplicationListItem {
    fn from(app: Application) -> Self {
        let client_id = app.oauth_config().map(|oauth| oauth.client_id.clone());
        Self {
            id: app.id,
            name: app.name,
            description: app.description,
            client_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplicationListResponse {
    total_results: usize,
    start_index: usize,
    count: usize,
    applications: Vec<ApplicationListItem>,
    links: Vec<Link>,
}

fn page_params(query: &PaginationQuery) -> Result<PageParams, ApiError> {
    PageParams::validate(query.limit.as_deref(), query.offset.as_deref()).map_err(|e| {
        ApiError(match e {
            PageParamError::InvalidLimit => app_errors::invalid_limit(),
            PageParamError::InvalidOffset => app_errors::invalid_offset(),
        })
    })
}

async fn create(
    State(state): State<AppState>,
    body: Result<Json<ApplicationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        app_errors::invalid_request_format().with_description(rejection.to_string())
    })?;
    let ctx = request_context();
    let app = state.applications.create(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(app)))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = page_params(&query)?;
    let ctx = request_context();
    let result = state.applications.list(&ctx, params).await?;
    Ok(Json(ApplicationListResponse {
        total_results: result.total,
        start_index: params.offset + 1,
        count: result.items.len(),
        links: build_links("/applications", params, result.total),
        applications: result.items.into_iter().map(Into::into).collect(),
    }))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = request_context();
    let app = state.applications.get(&ctx, &id).await?;
    Ok(Json(app))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ApplicationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        app_errors::invalid_request_format().with_description(rejection.to_string())
    })?;
    let ctx = request_context();
    let app = state.applications.update(&ctx, &id, request).await?;
    Ok(Json(app))
}

async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = request_context();
    state.applications.delete(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
