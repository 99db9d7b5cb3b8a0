//! Event endpoints.

use axum::{extract::State, http::StatusCode, Json};

use crate::error::Result;
use crate::server::AppState;
use crate::service::{events, EventListResponse, EventRequest, ListEventsQuery, PatchEventRequest};
use crate::store::Event;

use super::extract::{ApiJson, ApiPath, ApiQuery};

/// GET /api/events
#[tracing::instrument(name = "http.list_events", skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListEventsQuery>,
) -> Result<Json<EventListResponse>> {
    Ok(Json(events::list(state.store.as_ref(), query).await?))
}

/// GET /api/events/{id}
#[tracing::instrument(name = "http.get_event", skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Event>> {
    Ok(Json(events::get(state.store.as_ref(), id).await?))
}

/// POST /api/events
#[tracing::instrument(
    name = "http.create_event",
    skip(state, request),
    fields(application_id = request.application_id)
)]
pub async fn create_event(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<EventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    let created = events::create(state.store.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/events/{id}
#[tracing::instrument(name = "http.update_event", skip(state, request))]
pub async fn update_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<EventRequest>,
) -> Result<Json<Event>> {
    Ok(Json(events::update(state.store.as_ref(), id, request).await?))
}

/// PATCH /api/events/{id}
#[tracing::instrument(name = "http.patch_event", skip(state, request))]
pub async fn patch_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<PatchEventRequest>,
) -> Result<Json<Event>> {
    Ok(Json(events::patch(state.store.as_ref(), id, request).await?))
}

/// DELETE /api/events/{id}
#[tracing::instrument(name = "http.delete_event", skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Event>> {
    Ok(Json(events::delete(state.store.as_ref(), id).await?))
}
