//! Backend traits for notification storage.
//!
//! This module defines the abstraction layer for persistence, allowing
//! different storage implementations (memory, PostgreSQL) to be used
//! interchangeably.
//!
//! Method names are unique across the repository traits so that every
//! operation can be called on a `dyn Store` without disambiguation.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{
    Application, ApplicationDraft, ApplicationFilter, Event, EventDraft, EventFilter, Message,
    MessageDraft, NotificationType, NotificationTypeDraft, NotificationTypeFilter, Page,
    PageRequest, Tag,
};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// PostgreSQL operation failed
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A row is still referenced, or a unique key is already taken
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Backend is temporarily unavailable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared catalog of tag names.
#[async_trait]
pub trait TagCatalog: Send + Sync {
    /// Look up a tag by its exact, case-sensitive label.
    async fn find_tag_by_name(&self, name: &str) -> StoreResult<Option<Tag>>;

    /// Insert a new tag.
    async fn create_tag(&self, name: &str) -> StoreResult<Tag>;

    /// Return the tag with this label, creating it if absent.
    ///
    /// The default is a lookup followed by a create. Backends override it
    /// with an atomic insert-if-absent so concurrent callers never produce
    /// two rows for one label.
    async fn ensure_tag(&self, name: &str) -> StoreResult<Tag> {
        if let Some(tag) = self.find_tag_by_name(name).await? {
            return Ok(tag);
        }
        self.create_tag(name).await
    }

    /// All tags ordered by id.
    async fn list_tags(&self) -> StoreResult<Vec<Tag>>;
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn list_applications(
        &self,
        filter: &ApplicationFilter,
        page: &PageRequest,
    ) -> StoreResult<Page<Application>>;

    async fn get_application(&self, id: i64) -> StoreResult<Option<Application>>;

    /// Exact name match.
    async fn find_application_by_name(&self, name: &str) -> StoreResult<Option<Application>>;

    /// Case-insensitive name match, ignoring the row `exclude_id`.
    async fn find_application_conflict(
        &self,
        name: &str,
        exclude_id: Option<i64>,
    ) -> StoreResult<Option<Application>>;

    async fn insert_application(&self, draft: ApplicationDraft) -> StoreResult<Application>;

    /// Replace the row's columns. `None` when the id does not exist.
    async fn update_application(
        &self,
        id: i64,
        draft: ApplicationDraft,
    ) -> StoreResult<Option<Application>>;

    /// Remove and return the row. Fails with `Constraint` while events reference it.
    async fn delete_application(&self, id: i64) -> StoreResult<Option<Application>>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn list_events(&self, filter: &EventFilter, page: &PageRequest)
        -> StoreResult<Page<Event>>;

    async fn get_event(&self, id: i64) -> StoreResult<Option<Event>>;

    /// Exact name match within an application.
    async fn find_event_by_name(
        &self,
        application_id: i64,
        name: &str,
    ) -> StoreResult<Option<Event>>;

    /// Case-insensitive name match within an application, ignoring `exclude_id`.
    async fn find_event_conflict(
        &self,
        application_id: i64,
        name: &str,
        exclude_id: Option<i64>,
    ) -> StoreResult<Option<Event>>;

    async fn insert_event(&self, draft: EventDraft) -> StoreResult<Event>;

    async fn update_event(&self, id: i64, draft: EventDraft) -> StoreResult<Option<Event>>;

    /// Fails with `Constraint` while notification types reference the event.
    async fn delete_event(&self, id: i64) -> StoreResult<Option<Event>>;
}

#[async_trait]
pub trait NotificationTypeRepository: Send + Sync {
    async fn list_notification_types(
        &self,
        filter: &NotificationTypeFilter,
        page: &PageRequest,
    ) -> StoreResult<Page<NotificationType>>;

    async fn get_notification_type(&self, id: i64) -> StoreResult<Option<NotificationType>>;

    /// Exact name match within an event.
    async fn find_notification_type_by_name(
        &self,
        event_id: i64,
        name: &str,
    ) -> StoreResult<Option<NotificationType>>;

    /// Case-insensitive name match within an event, ignoring `exclude_id`.
    async fn find_notification_type_conflict(
        &self,
        event_id: i64,
        name: &str,
        exclude_id: Option<i64>,
    ) -> StoreResult<Option<NotificationType>>;

    async fn insert_notification_type(
        &self,
        draft: NotificationTypeDraft,
    ) -> StoreResult<NotificationType>;

    async fn update_notification_type(
        &self,
        id: i64,
        draft: NotificationTypeDraft,
    ) -> StoreResult<Option<NotificationType>>;

    /// Fails with `Constraint` while messages reference the notification type.
    async fn delete_notification_type(&self, id: i64) -> StoreResult<Option<NotificationType>>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Messages ordered by id. Sorting fields of `page` are ignored.
    async fn list_messages(&self, page: &PageRequest) -> StoreResult<Vec<Message>>;

    async fn get_message(&self, id: i64) -> StoreResult<Option<Message>>;

    async fn insert_message(&self, draft: MessageDraft) -> StoreResult<Message>;

    async fn delete_message(&self, id: i64) -> StoreResult<Option<Message>>;
}

/// Complete storage backend used by the service.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`) as a single store is
/// shared by every request handler.
#[async_trait]
pub trait Store:
    TagCatalog + ApplicationRepository + EventRepository + NotificationTypeRepository + MessageRepository
{
    /// Backend type identifier
    fn backend_type(&self) -> &'static str;

    /// Check that the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;
}
