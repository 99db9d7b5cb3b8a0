//! Message and tag endpoints.

use axum::{extract::State, http::StatusCode, Json};

use crate::error::Result;
use crate::server::AppState;
use crate::service::{self, messages, CreateMessageRequest, ListMessagesQuery};
use crate::store::{Message, Tag};

use super::extract::{ApiJson, ApiPath, ApiQuery};

/// GET /api/messages
#[tracing::instrument(name = "http.list_messages", skip(state))]
pub async fn list_messages(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListMessagesQuery>,
) -> Result<Json<Vec<Message>>> {
    Ok(Json(messages::list(state.store.as_ref(), query).await?))
}

/// GET /api/messages/{id}
#[tracing::instrument(name = "http.get_message", skip(state))]
pub async fn get_message(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Message>> {
    Ok(Json(messages::get(state.store.as_ref(), id).await?))
}

/// POST /api/messages - Render a notification type into a stored message
#[tracing::instrument(
    name = "http.create_message",
    skip(state, request),
    fields(
        application = %request.application_name,
        event = %request.event_name,
        notification_type = %request.notification_type_name
    )
)]
pub async fn create_message(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateMessageRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    let created = messages::create(state.store.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /api/messages/{id}
#[tracing::instrument(name = "http.delete_message", skip(state))]
pub async fn delete_message(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Message>> {
    Ok(Json(messages::delete(state.store.as_ref(), id).await?))
}

/// GET /api/tags
#[tracing::instrument(name = "http.list_tags", skip(state))]
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>> {
    Ok(Json(service::list_tags(state.store.as_ref()).await?))
}
