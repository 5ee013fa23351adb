//! Organization-unit endpoints.
//!
//! Two addressing schemes share one service: by id under
//! `/organization-units/{id}`, and by slash-delimited handle path under
//! `/organization-units/tree/{path...}` where a trailing `ous`, `users`, or
//! `groups` segment selects a sub-resource listing.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use thunder_core::error::ou as ou_errors;
use thunder_core::models::OrganizationUnitBasic;

use crate::bootstrap::AppState;
use crate::handlers::{request_context, ApiError, PaginationQuery};
use crate::pagination::{build_links, Link, PageParams, PageParamError};
use crate::service::{CreateOrganizationUnitRequest, ListResult, UpdateOrganizationUnitRequest};

/// Sub-resource suffixes recognized on tree paths.
const SUB_RESOURCES: [&str; 3] = ["ous", "users", "groups"];

/// Routes under `/organization-units`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organization-units", get(list).post(create))
        .route(
            "/organization-units/tree",
            get(tree_bare).put(tree_bare).delete(tree_bare),
        )
        .route(
            "/organization-units/tree/{*path}",
            get(tree_get).put(tree_update).delete(tree_delete),
        )
        .route(
            "/organization-units/{id}",
            get(get_one).put(update).delete(delete_one),
        )
        .route("/organization-units/{id}/ous", get(children))
        .route("/organization-units/{id}/users", get(users))
        .route("/organization-units/{id}/groups", get(groups))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrganizationUnitListResponse {
    total_results: usize,
    start_index: usize,
    count: usize,
    organization_units: Vec<OrganizationUnitBasic>,
    links: Vec<Link>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserListResponse {
    total_results: usize,
    start_index: usize,
    count: usize,
    users: Vec<String>,
    links: Vec<Link>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupListResponse {
    total_results: usize,
    start_index: usize,
    count: usize,
    groups: Vec<String>,
    links: Vec<Link>,
}

fn page_params(query: &PaginationQuery) -> Result<PageParams, ApiError> {
    PageParams::validate(query.limit.as_deref(), query.offset.as_deref()).map_err(|e| {
        ApiError(match e {
            PageParamError::InvalidLimit => ou_errors::invalid_limit(),
            PageParamError::InvalidOffset => ou_errors::invalid_offset(),
        })
    })
}

fn ou_list_response(
    base_path: &str,
    params: PageParams,
    result: ListResult<OrganizationUnitBasic>,
) -> OrganizationUnitListResponse {
    OrganizationUnitListResponse {
        total_results: result.total,
        start_index: params.offset + 1,
        count: result.items.len(),
        links: build_links(base_path, params, result.total),
        organization_units: result.items,
    }
}

async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateOrganizationUnitRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        ou_errors::invalid_request_format().with_description(rejection.to_string())
    })?;
    let ctx = request_context();
    let ou = state.organization_units.create(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(ou)))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = page_params(&query)?;
    let ctx = request_context();
    let result = state.organization_units.list(&ctx, params).await?;
    Ok(Json(ou_list_response("/organization-units", params, result)))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = request_context();
    let ou = state.organization_units.get(&ctx, &id).await?;
    Ok(Json(ou))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateOrganizationUnitRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        ou_errors::invalid_request_format().with_description(rejection.to_string())
    })?;
    let ctx = request_context();
    let ou = state.organization_units.update(&ctx, &id, request).await?;
    Ok(Json(ou))
}

async fn delete_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = request_context();
    state.organization_units.delete(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn children(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PaginationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = page_params(&query)?;
    let ctx = request_context();
    let result = state.organization_units.children(&ctx, &id, params).await?;
    let base = format!("/organization-units/{id}/ous");
    Ok(Json(ou_list_response(&base, params, result)))
}

async fn users(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PaginationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = page_params(&query)?;
    let ctx = request_context();
    let result = state.organization_units.users(&ctx, &id, params).await?;
    Ok(Json(UserListResponse {
        total_results: result.total,
        start_index: params.offset + 1,
        count: result.items.len(),
        links: build_links(&format!("/organization-units/{id}/users"), params, result.total),
        users: result.items,
    }))
}

async fn groups(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PaginationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = page_params(&query)?;
    let ctx = request_context();
    let result = state.organization_units.groups(&ctx, &id, params).await?;
    Ok(Json(GroupListResponse {
        total_results: result.total,
        start_index: params.offset + 1,
        count: result.items.len(),
        links: build_links(&format!("/organization-units/{id}/groups"), params, result.total),
        groups: result.items,
    }))
}

/// `/organization-units/tree` with no path at all.
async fn tree_bare() -> ApiError {
    ApiError(ou_errors::invalid_handle_path())
}

/// Split a tree path into handle segments. The service rejects empty
/// segments, which covers the all-slashes case; a single trailing slash is
/// tolerated.
fn tree_segments(path: &str) -> Vec<String> {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    trimmed.split('/').map(str::to_string).collect()
}

async fn tree_get(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<PaginationQuery>,
) -> Result<Response, ApiError> {
    let mut segments = tree_segments(&path);
    let ctx = request_context();

    // A trailing sub-resource segment selects a listing of the OU named by
    // the prefix.
    if segments.len() > 1 {
        let last = segments.last().map(String::as_str).unwrap_or_default();
        if SUB_RESOURCES.contains(&last) {
            let sub_resource = segments.pop().unwrap_or_default();
            let params = page_params(&query)?;
            let ou = state.organization_units.get_by_path(&ctx, &segments).await?;
            let base = format!("/organization-units/tree/{path}");
            let response = match sub_resource.as_str() {
                "ous" => {
                    let result = state.organization_units.children(&ctx, &ou.id, params).await?;
                    Json(ou_list_response(&base, params, result)).into_response()
                }
                "users" => {
                    let result = state.organization_units.users(&ctx, &ou.id, params).await?;
                    Json(UserListResponse {
                        total_results: result.total,
                        start_index: params.offset + 1,
                        count: result.items.len(),
                        links: build_links(&base, params, result.total),
                        users: result.items,
                    })
                    .into_response()
                }
                _ => {
                    let result = state.organization_units.groups(&ctx, &ou.id, params).await?;
                    Json(GroupListResponse {
                        total_results: result.total,
                        start_index: params.offset + 1,
                        count: result.items.len(),
                        links: build_links(&base, params, result.total),
                        groups: result.items,
                    })
                    .into_response()
                }
            };
            return Ok(response);
        }
    }

    let ou = state.organization_units.get_by_path(&ctx, &segments).await?;
    Ok(Json(ou).into_response())
}

async fn tree_update(
    State(state): State<AppState>,
    Path(path): Path<String>,
    body: Result<Json<UpdateOrganizationUnitRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        ou_errors::invalid_request_format().with_description(rejection.to_string())
    })?;
    let segments = tree_segments(&path);
    let ctx = request_context();
    let ou = state.organization_units.get_by_path(&ctx, &segments).await?;
    let updated = state.organization_units.update(&ctx, &ou.id, request).await?;
    Ok(Json(updated))
}

async fn tree_delete(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let segments = tree_segments(&path);
    let ctx = request_context();
    let ou = state.organization_units.get_by_path(&ctx, &segments).await?;
    state.organization_units.delete(&ctx, &ou.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
