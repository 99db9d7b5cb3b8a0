//! Message rendering.
//!
//! A message names its notification type through the application and event
//! it belongs to. The resolved template must have a value for every
//! placeholder before anything is rendered or stored.

use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::metrics::MessageMetrics;
use crate::store::{Message, MessageDraft, NotificationType, Store};
use crate::template::{missing_tags, render, TagValueMap};

use super::query::ListMessagesQuery;

const NOT_FOUND: &str = "The message with the given ID is not found";

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    #[validate(length(min = 1, message = "\"applicationName\" is not allowed to be empty"))]
    pub application_name: String,
    #[validate(length(min = 1, message = "\"eventName\" is not allowed to be empty"))]
    pub event_name: String,
    #[validate(length(
        min = 1,
        message = "\"notificationTypeName\" is not allowed to be empty"
    ))]
    pub notification_type_name: String,
    pub tags: TagValueMap,
}

/// Walk application → event → notification type by exact names.
async fn resolve(
    store: &dyn Store,
    request: &CreateMessageRequest,
) -> Result<NotificationType> {
    let application = store
        .find_application_by_name(&request.application_name)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    let event = store
        .find_event_by_name(application.id, &request.event_name)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Event not found for the given application".to_string())
        })?;

    store
        .find_notification_type_by_name(event.id, &request.notification_type_name)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Notification type not found for the given event".to_string())
        })
}

pub async fn list(store: &dyn Store, query: ListMessagesQuery) -> Result<Vec<Message>> {
    query.validate()?;

    let messages = store.list_messages(&query.page_request()).await?;
    if messages.is_empty() {
        return Err(AppError::NotFound("No messages found".to_string()));
    }

    Ok(messages)
}

pub async fn get(store: &dyn Store, id: i64) -> Result<Message> {
    store
        .get_message(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

pub async fn create(store: &dyn Store, request: CreateMessageRequest) -> Result<Message> {
    request.validate()?;

    let notification_type = resolve(store, &request).await?;

    let missing = missing_tags(&notification_type.template_body, &request.tags);
    if !missing.is_empty() {
        MessageMetrics::record_rejected();
        return Err(AppError::IncompleteTags(missing));
    }

    let text = render(&notification_type.template_body, &request.tags);

    let message = store
        .insert_message(MessageDraft {
            text,
            notification_type_id: notification_type.id,
        })
        .await?;

    MessageMetrics::record_rendered();
    tracing::info!(
        message_id = message.id,
        notification_type_id = notification_type.id,
        "Message created"
    );

    Ok(message)
}

pub async fn delete(store: &dyn Store, id: i64) -> Result<Message> {
    let deleted = store
        .delete_message(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    tracing::info!(message_id = id, "Message deleted");
    Ok(deleted)
}
