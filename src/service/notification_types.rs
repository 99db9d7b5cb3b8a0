//! Notification type flows.
//!
//! Saving a template body re-extracts its tags and makes sure each one is in
//! the shared catalog before the row is written. The stored `tags` column is
//! the raw extraction, duplicates included.

use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::metrics::TemplateMetrics;
use crate::store::{NotificationType, NotificationTypeDraft, NotificationTypeFilter, Store};
use crate::template::{extract_tags, sync_tags};

use super::query::{ListNotificationTypesQuery, NotificationTypeListResponse};

const NOT_FOUND: &str = "The notification with the given ID is not found";
/// Wording of the full-replacement path
const NOT_FOUND_ON_UPDATE: &str = "The notification with given ID is not found";
const NAME_TAKEN: &str = "A notification with the same name already exists for the event";
const EVENT_NOT_FOUND: &str = "Event not found";

#[derive(Debug, Deserialize, Validate)]
pub struct NotificationTypeRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "\"name\" length must be between 3 and 50 characters"
    ))]
    pub name: String,
    #[validate(length(
        min = 5,
        max = 300,
        message = "\"description\" length must be between 5 and 300 characters"
    ))]
    pub description: String,
    #[validate(length(
        min = 5,
        message = "\"template_subject\" length must be at least 5 characters long"
    ))]
    pub template_subject: String,
    #[validate(length(
        min = 5,
        message = "\"template_body\" length must be at least 5 characters long"
    ))]
    pub template_body: String,
    pub event_id: i64,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct PatchNotificationTypeRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "\"name\" length must be between 3 and 50 characters"
    ))]
    pub name: Option<String>,
    #[validate(length(
        min = 5,
        max = 300,
        message = "\"description\" length must be between 5 and 300 characters"
    ))]
    pub description: Option<String>,
    #[validate(length(
        min = 5,
        message = "\"template_subject\" length must be at least 5 characters long"
    ))]
    pub template_subject: Option<String>,
    #[validate(length(
        min = 5,
        message = "\"template_body\" length must be at least 5 characters long"
    ))]
    pub template_body: Option<String>,
    pub event_id: Option<i64>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

async fn ensure_event(store: &dyn Store, event_id: i64) -> Result<()> {
    match store.get_event(event_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(EVENT_NOT_FOUND.to_string())),
    }
}

async fn ensure_name_free(
    store: &dyn Store,
    event_id: i64,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<()> {
    match store
        .find_notification_type_conflict(event_id, name, exclude_id)
        .await?
    {
        Some(_) => Err(AppError::Conflict(NAME_TAKEN.to_string())),
        None => Ok(()),
    }
}

/// Extract the body's tags and register them in the catalog.
async fn catalog_tags(store: &dyn Store, template_body: &str) -> Result<Vec<String>> {
    let tags = sync_tags(store, extract_tags(template_body)).await?;
    TemplateMetrics::record_extracted(tags.len() as u64);
    Ok(tags)
}

pub async fn list(
    store: &dyn Store,
    query: ListNotificationTypesQuery,
) -> Result<NotificationTypeListResponse> {
    query.validate()?;

    let filter = NotificationTypeFilter {
        name: query.name.clone(),
        event_id: query.event_id,
        is_active: query.is_active,
    };
    let page = store
        .list_notification_types(&filter, &query.page_request())
        .await?;

    if page.items.is_empty() {
        return Err(AppError::NotFound("No notifications found".to_string()));
    }

    Ok(NotificationTypeListResponse {
        total_count: page.total,
        notifications: page.items,
    })
}

pub async fn get(store: &dyn Store, id: i64) -> Result<NotificationType> {
    store
        .get_notification_type(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

pub async fn create(
    store: &dyn Store,
    request: NotificationTypeRequest,
) -> Result<NotificationType> {
    request.validate()?;

    ensure_event(store, request.event_id).await?;
    ensure_name_free(store, request.event_id, &request.name, None).await?;

    let tags = catalog_tags(store, &request.template_body).await?;

    let notification_type = store
        .insert_notification_type(NotificationTypeDraft {
            name: request.name,
            description: request.description,
            template_subject: request.template_subject,
            template_body: request.template_body,
            event_id: request.event_id,
            tags,
            is_active: request.is_active.unwrap_or(true),
        })
        .await?;

    tracing::info!(
        notification_type_id = notification_type.id,
        event_id = notification_type.event_id,
        tags = ?notification_type.tags,
        "Notification type created"
    );

    Ok(notification_type)
}

pub async fn update(
    store: &dyn Store,
    id: i64,
    request: NotificationTypeRequest,
) -> Result<NotificationType> {
    request.validate()?;

    ensure_event(store, request.event_id).await?;
    ensure_name_free(store, request.event_id, &request.name, Some(id)).await?;

    let current = store
        .get_notification_type(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_ON_UPDATE.to_string()))?;

    let tags = catalog_tags(store, &request.template_body).await?;

    let updated = store
        .update_notification_type(
            id,
            NotificationTypeDraft {
                name: request.name,
                description: request.description,
                template_subject: request.template_subject,
                template_body: request.template_body,
                event_id: request.event_id,
                tags,
                is_active: request.is_active.unwrap_or(current.is_active),
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_ON_UPDATE.to_string()))?;

    tracing::info!(notification_type_id = id, "Notification type updated");
    Ok(updated)
}

pub async fn patch(
    store: &dyn Store,
    id: i64,
    request: PatchNotificationTypeRequest,
) -> Result<NotificationType> {
    request.validate()?;

    let current = get(store, id).await?;

    // Stored tags stay valid unless the body changes
    let tags = match &request.template_body {
        Some(body) => catalog_tags(store, body).await?,
        None => current.tags.clone(),
    };

    let event_id = request.event_id.unwrap_or(current.event_id);
    ensure_event(store, event_id).await?;

    let name = request.name.unwrap_or(current.name);
    ensure_name_free(store, event_id, &name, Some(id)).await?;

    let draft = NotificationTypeDraft {
        name,
        description: request.description.unwrap_or(current.description),
        template_subject: request.template_subject.unwrap_or(current.template_subject),
        template_body: request.template_body.unwrap_or(current.template_body),
        event_id,
        tags,
        is_active: request.is_active.unwrap_or(current.is_active),
    };

    let updated = store
        .update_notification_type(id, draft)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    tracing::info!(notification_type_id = id, "Notification type patched");
    Ok(updated)
}

pub async fn delete(store: &dyn Store, id: i64) -> Result<NotificationType> {
    let deleted = store
        .delete_notification_type(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    tracing::info!(notification_type_id = id, "Notification type deleted");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{
        ApplicationDraft, ApplicationRepository, EventDraft, EventRepository, MemoryStore,
        TagCatalog,
    };

    async fn seed_event(store: &MemoryStore, name: &str) -> i64 {
        let app = store
            .insert_application(ApplicationDraft {
                name: format!("{}-app", name),
                description: "Test application".to_string(),
                is_active: true,
            })
            .await
            .unwrap();
        store
            .insert_event(EventDraft {
                name: name.to_string(),
                description: "Test event".to_string(),
                application_id: app.id,
                is_active: true,
            })
            .await
            .unwrap()
            .id
    }

    fn request(name: &str, event_id: i64, body: &str) -> NotificationTypeRequest {
        NotificationTypeRequest {
            name: name.to_string(),
            description: "Customer notification".to_string(),
            template_subject: "Hello there".to_string(),
            template_body: body.to_string(),
            event_id,
            is_active: None,
        }
    }

    async fn catalog_labels(store: &MemoryStore) -> Vec<String> {
        let mut labels: Vec<String> = store
            .list_tags()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.label)
            .collect();
        labels.sort();
        labels
    }

    #[tokio::test]
    async fn test_create_extracts_and_catalogs_tags() {
        let store = MemoryStore::new();
        let event = seed_event(&store, "order.created").await;

        let created = create(
            &store,
            request("receipt", event, "Dear {name}, order {order_id} for {name}"),
        )
        .await
        .unwrap();

        assert_eq!(created.tags, vec!["name", "order_id", "name"]);
        assert_eq!(catalog_labels(&store).await, vec!["name", "order_id"]);
    }

    #[tokio::test]
    async fn test_create_requires_event() {
        let store = MemoryStore::new();

        let err = create(&store, request("receipt", 3, "Dear {name}"))
            .await
            .unwrap_err();
        match err {
            AppError::NotFound(msg) => assert_eq!(msg, EVENT_NOT_FOUND),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(catalog_labels(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_create_conflict_within_event() {
        let store = MemoryStore::new();
        let event = seed_event(&store, "order.created").await;
        create(&store, request("Receipt", event, "Dear {name}"))
            .await
            .unwrap();

        let err = create(&store, request("receipt", event, "Hi {name}"))
            .await
            .unwrap_err();
        match err {
            AppError::Conflict(msg) => assert_eq!(msg, NAME_TAKEN),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_reextracts_tags() {
        let store = MemoryStore::new();
        let event = seed_event(&store, "order.created").await;
        let created = create(&store, request("receipt", event, "Dear {name}"))
            .await
            .unwrap();

        let updated = update(
            &store,
            created.id,
            request("receipt", event, "Order {order_id} shipped"),
        )
        .await
        .unwrap();

        assert_eq!(updated.tags, vec!["order_id"]);
        // Catalog entries are never removed
        assert_eq!(catalog_labels(&store).await, vec!["name", "order_id"]);
    }

    #[tokio::test]
    async fn test_update_missing_uses_update_wording() {
        let store = MemoryStore::new();
        let event = seed_event(&store, "order.created").await;

        let err = update(&store, 77, request("receipt", event, "Dear {name}"))
            .await
            .unwrap_err();
        match err {
            AppError::NotFound(msg) => assert_eq!(msg, NOT_FOUND_ON_UPDATE),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_patch_without_body_keeps_tags() {
        let store = MemoryStore::new();
        let event = seed_event(&store, "order.created").await;
        let created = create(&store, request("receipt", event, "Dear {name}"))
            .await
            .unwrap();

        let patched = patch(
            &store,
            created.id,
            PatchNotificationTypeRequest {
                template_subject: Some("Your receipt".to_string()),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(patched.tags, vec!["name"]);
        assert_eq!(patched.template_subject, "Your receipt");
        assert!(!patched.is_active);
    }

    #[tokio::test]
    async fn test_patch_with_body_resyncs_tags() {
        let store = MemoryStore::new();
        let event = seed_event(&store, "order.created").await;
        let created = create(&store, request("receipt", event, "Dear {name}"))
            .await
            .unwrap();

        let patched = patch(
            &store,
            created.id,
            PatchNotificationTypeRequest {
                template_body: Some("{greeting} {name}".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(patched.tags, vec!["greeting", "name"]);
        assert_eq!(catalog_labels(&store).await, vec!["greeting", "name"]);
    }

    #[tokio::test]
    async fn test_patch_missing_and_bad_event() {
        let store = MemoryStore::new();
        let event = seed_event(&store, "order.created").await;
        let created = create(&store, request("receipt", event, "Dear {name}"))
            .await
            .unwrap();

        let err = patch(&store, 404, PatchNotificationTypeRequest::default())
            .await
            .unwrap_err();
        match err {
            AppError::NotFound(msg) => assert_eq!(msg, NOT_FOUND),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = patch(
            &store,
            created.id,
            PatchNotificationTypeRequest {
                event_id: Some(999),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        match err {
            AppError::NotFound(msg) => assert_eq!(msg, EVENT_NOT_FOUND),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_uses_notifications_key() {
        let store = MemoryStore::new();
        let event = seed_event(&store, "order.created").await;

        let err = list(&store, ListNotificationTypesQuery::default())
            .await
            .unwrap_err();
        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "No notifications found"),
            other => panic!("unexpected error: {other:?}"),
        }

        create(&store, request("receipt", event, "Dear {name}"))
            .await
            .unwrap();
        let listed = list(
            &store,
            ListNotificationTypesQuery {
                event_id: Some(event),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let json = serde_json::to_value(&listed).unwrap();
        assert_eq!(json["TotalCount"], 1);
        assert_eq!(json["notifications"][0]["name"], "receipt");
    }

    #[tokio::test]
    async fn test_saving_template_counts_extracted_tags() {
        use crate::metrics::TAGS_EXTRACTED_TOTAL;

        let store = MemoryStore::new();
        let event_id = seed_event(&store, "counted").await;

        let before = TAGS_EXTRACTED_TOTAL.get();
        create(&store, request("receipt", event_id, "{a} paid {b} for {a}"))
            .await
            .unwrap();

        assert!(TAGS_EXTRACTED_TOTAL.get() >= before + 3);
    }
}
