//! Application endpoints.

use axum::{extract::State, http::StatusCode, Json};

use crate::error::Result;
use crate::server::AppState;
use crate::service::{
    applications, ApplicationListResponse, ApplicationRequest, ListApplicationsQuery,
    PatchApplicationRequest,
};
use crate::store::Application;

use super::extract::{ApiJson, ApiPath, ApiQuery};

/// GET /api/applications
#[tracing::instrument(name = "http.list_applications", skip(state))]
pub async fn list_applications(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListApplicationsQuery>,
) -> Result<Json<ApplicationListResponse>> {
    Ok(Json(applications::list(state.store.as_ref(), query).await?))
}

/// GET /api/applications/{id}
#[tracing::instrument(name = "http.get_application", skip(state))]
pub async fn get_application(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Application>> {
    Ok(Json(applications::get(state.store.as_ref(), id).await?))
}

/// POST /api/applications
#[tracing::instrument(
    name = "http.create_application",
    skip(state, request),
    fields(name = %request.name)
)]
pub async fn create_application(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ApplicationRequest>,
) -> Result<(StatusCode, Json<Application>)> {
    let created = applications::create(state.store.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/applications/{id}
#[tracing::instrument(name = "http.update_application", skip(state, request))]
pub async fn update_application(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<ApplicationRequest>,
) -> Result<Json<Application>> {
    Ok(Json(
        applications::update(state.store.as_ref(), id, request).await?,
    ))
}

/// PATCH /api/applications/{id}
#[tracing::instrument(name = "http.patch_application", skip(state, request))]
pub async fn patch_application(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<PatchApplicationRequest>,
) -> Result<Json<Application>> {
    Ok(Json(
        applications::patch(state.store.as_ref(), id, request).await?,
    ))
}

/// DELETE /api/applications/{id}
#[tracing::instrument(name = "http.delete_application", skip(state))]
pub async fn delete_application(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Application>> {
    Ok(Json(applications::delete(state.store.as_ref(), id).await?))
}
