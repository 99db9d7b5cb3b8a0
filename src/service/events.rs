//! Event flows. Every event belongs to one application.

use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::store::{Event, EventDraft, EventFilter, Store};

use super::query::{EventListResponse, ListEventsQuery};

const NOT_FOUND: &str = "The event with the given ID is not found";
const NAME_TAKEN: &str = "An event with the same name already exists for the application";
const APPLICATION_NOT_FOUND: &str = "Application not found";

#[derive(Debug, Deserialize, Validate)]
pub struct EventRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "\"name\" length must be between 3 and 50 characters"
    ))]
    pub name: String,
    #[validate(length(
        min = 5,
        max = 200,
        message = "\"description\" length must be between 5 and 200 characters"
    ))]
    pub description: String,
    pub application_id: i64,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct PatchEventRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "\"name\" length must be between 3 and 50 characters"
    ))]
    pub name: Option<String>,
    #[validate(length(
        min = 5,
        max = 200,
        message = "\"description\" length must be between 5 and 200 characters"
    ))]
    pub description: Option<String>,
    pub application_id: Option<i64>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

async fn ensure_application(store: &dyn Store, application_id: i64) -> Result<()> {
    match store.get_application(application_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(APPLICATION_NOT_FOUND.to_string())),
    }
}

async fn ensure_name_free(
    store: &dyn Store,
    application_id: i64,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<()> {
    match store
        .find_event_conflict(application_id, name, exclude_id)
        .await?
    {
        Some(_) => Err(AppError::Conflict(NAME_TAKEN.to_string())),
        None => Ok(()),
    }
}

pub async fn list(store: &dyn Store, query: ListEventsQuery) -> Result<EventListResponse> {
    query.validate()?;

    let filter = EventFilter {
        name: query.name.clone(),
        application_id: query.application_id,
        is_active: query.is_active,
    };
    let page = store.list_events(&filter, &query.page_request()).await?;

    if page.items.is_empty() {
        return Err(AppError::NotFound("No events found".to_string()));
    }

    Ok(EventListResponse {
        total_count: page.total,
        events: page.items,
    })
}

pub async fn get(store: &dyn Store, id: i64) -> Result<Event> {
    store
        .get_event(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

pub async fn create(store: &dyn Store, request: EventRequest) -> Result<Event> {
    request.validate()?;

    ensure_name_free(store, request.application_id, &request.name, None).await?;
    ensure_application(store, request.application_id).await?;

    let event = store
        .insert_event(EventDraft {
            name: request.name,
            description: request.description,
            application_id: request.application_id,
            is_active: request.is_active.unwrap_or(true),
        })
        .await?;

    tracing::info!(
        event_id = event.id,
        application_id = event.application_id,
        name = %event.name,
        "Event created"
    );

    Ok(event)
}

pub async fn update(store: &dyn Store, id: i64, request: EventRequest) -> Result<Event> {
    request.validate()?;

    ensure_name_free(store, request.application_id, &request.name, Some(id)).await?;
    ensure_application(store, request.application_id).await?;

    let current = get(store, id).await?;

    let updated = store
        .update_event(
            id,
            EventDraft {
                name: request.name,
                description: request.description,
                application_id: request.application_id,
                is_active: request.is_active.unwrap_or(current.is_active),
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    tracing::info!(event_id = id, "Event updated");
    Ok(updated)
}

pub async fn patch(store: &dyn Store, id: i64, request: PatchEventRequest) -> Result<Event> {
    request.validate()?;

    let current = get(store, id).await?;

    let application_id = request.application_id.unwrap_or(current.application_id);
    let moved = application_id != current.application_id;

    if moved {
        ensure_application(store, application_id).await?;
    }
    if request.name.is_some() || moved {
        let name = request.name.as_deref().unwrap_or(&current.name);
        ensure_name_free(store, application_id, name, Some(id)).await?;
    }

    let draft = EventDraft {
        name: request.name.unwrap_or(current.name),
        description: request.description.unwrap_or(current.description),
        application_id,
        is_active: request.is_active.unwrap_or(current.is_active),
    };

    let updated = store
        .update_event(id, draft)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    tracing::info!(event_id = id, "Event patched");
    Ok(updated)
}

pub async fn delete(store: &dyn Store, id: i64) -> Result<Event> {
    let deleted = store
        .delete_event(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    tracing::info!(event_id = id, "Event deleted");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ApplicationDraft, ApplicationRepository, MemoryStore};

    async fn seed_app(store: &MemoryStore, name: &str) -> i64 {
        store
            .insert_application(ApplicationDraft {
                name: name.to_string(),
                description: "Test application".to_string(),
                is_active: true,
            })
            .await
            .unwrap()
            .id
    }

    fn request(name: &str, application_id: i64) -> EventRequest {
        EventRequest {
            name: name.to_string(),
            description: "Something happened".to_string(),
            application_id,
            is_active: None,
        }
    }

    #[tokio::test]
    async fn test_create_requires_application() {
        let store = MemoryStore::new();

        let err = create(&store, request("invoice.paid", 42)).await.unwrap_err();
        match err {
            AppError::NotFound(msg) => assert_eq!(msg, APPLICATION_NOT_FOUND),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_names_unique_per_application_only() {
        let store = MemoryStore::new();
        let billing = seed_app(&store, "billing").await;
        let shipping = seed_app(&store, "shipping").await;

        create(&store, request("order.created", billing)).await.unwrap();

        let err = create(&store, request("ORDER.CREATED", billing))
            .await
            .unwrap_err();
        match err {
            AppError::Conflict(msg) => assert_eq!(msg, NAME_TAKEN),
            other => panic!("unexpected error: {other:?}"),
        }

        // Same name under another application is fine
        create(&store, request("order.created", shipping)).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let store = MemoryStore::new();
        let app = seed_app(&store, "billing").await;
        let event = create(&store, request("invoice.paid", app)).await.unwrap();

        let mut replacement = request("invoice.settled", app);
        replacement.is_active = Some(false);
        let updated = update(&store, event.id, replacement).await.unwrap();

        assert_eq!(updated.name, "invoice.settled");
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_patch_move_checks_target_application() {
        let store = MemoryStore::new();
        let billing = seed_app(&store, "billing").await;
        let shipping = seed_app(&store, "shipping").await;
        let event = create(&store, request("order.created", billing)).await.unwrap();
        create(&store, request("order.created", shipping)).await.unwrap();

        let err = patch(
            &store,
            event.id,
            PatchEventRequest {
                application_id: Some(99),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // Target application already has an event with this name
        let err = patch(
            &store,
            event.id,
            PatchEventRequest {
                application_id: Some(shipping),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let patched = patch(
            &store,
            event.id,
            PatchEventRequest {
                description: Some("Order placed by a customer".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(patched.application_id, billing);
        assert_eq!(patched.description, "Order placed by a customer");
    }

    #[tokio::test]
    async fn test_list_by_application() {
        let store = MemoryStore::new();
        let billing = seed_app(&store, "billing").await;
        let shipping = seed_app(&store, "shipping").await;
        create(&store, request("invoice.paid", billing)).await.unwrap();
        create(&store, request("invoice.sent", billing)).await.unwrap();
        create(&store, request("parcel.sent", shipping)).await.unwrap();

        let listed = list(
            &store,
            ListEventsQuery {
                application_id: Some(billing),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(listed.total_count, 2);
        assert!(listed.events.iter().all(|e| e.application_id == billing));
    }

    #[tokio::test]
    async fn test_get_and_delete_missing() {
        let store = MemoryStore::new();

        for err in [
            get(&store, 5).await.unwrap_err(),
            delete(&store, 5).await.unwrap_err(),
        ] {
            match err {
                AppError::NotFound(msg) => assert_eq!(msg, NOT_FOUND),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }
}
