//! Notification type endpoints.

use axum::{extract::State, http::StatusCode, Json};

use crate::error::Result;
use crate::server::AppState;
use crate::service::{
    notification_types, ListNotificationTypesQuery, NotificationTypeListResponse,
    NotificationTypeRequest, PatchNotificationTypeRequest,
};
use crate::store::NotificationType;

use super::extract::{ApiJson, ApiPath, ApiQuery};

/// GET /api/notification-types
#[tracing::instrument(name = "http.list_notification_types", skip(state))]
pub async fn list_notification_types(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListNotificationTypesQuery>,
) -> Result<Json<NotificationTypeListResponse>> {
    Ok(Json(
        notification_types::list(state.store.as_ref(), query).await?,
    ))
}

/// GET /api/notification-types/{id}
#[tracing::instrument(name = "http.get_notification_type", skip(state))]
pub async fn get_notification_type(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<NotificationType>> {
    Ok(Json(notification_types::get(state.store.as_ref(), id).await?))
}

/// POST /api/notification-types
#[tracing::instrument(
    name = "http.create_notification_type",
    skip(state, request),
    fields(event_id = request.event_id)
)]
pub async fn create_notification_type(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NotificationTypeRequest>,
) -> Result<(StatusCode, Json<NotificationType>)> {
    let created = notification_types::create(state.store.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/notification-types/{id}
#[tracing::instrument(name = "http.update_notification_type", skip(state, request))]
pub async fn update_notification_type(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<NotificationTypeRequest>,
) -> Result<Json<NotificationType>> {
    Ok(Json(
        notification_types::update(state.store.as_ref(), id, request).await?,
    ))
}

/// PATCH /api/notification-types/{id}
#[tracing::instrument(name = "http.patch_notification_type", skip(state, request))]
pub async fn patch_notification_type(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<PatchNotificationTypeRequest>,
) -> Result<Json<NotificationType>> {
    Ok(Json(
        notification_types::patch(state.store.as_ref(), id, request).await?,
    ))
}

/// DELETE /api/notification-types/{id}
#[tracing::instrument(name = "http.delete_notification_type", skip(state))]
pub async fn delete_notification_type(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<NotificationType>> {
    Ok(Json(
        notification_types::delete(state.store.as_ref(), id).await?,
    ))
}
