//! PostgreSQL-based store backend.
//!
//! Tables are created by `migrations/0001_initial_schema.sql`. Foreign keys
//! carry no cascade, so deleting a referenced row surfaces as
//! `StoreError::Constraint`.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::metrics::{StoreMetrics, TemplateMetrics};

use super::backend::{
    ApplicationRepository, EventRepository, MessageRepository, NotificationTypeRepository, Store,
    StoreError, StoreResult, TagCatalog,
};
use super::models::{
    Application, ApplicationDraft, ApplicationFilter, Event, EventDraft, EventFilter, Message,
    MessageDraft, NotificationType, NotificationTypeDraft, NotificationTypeFilter, Page,
    PageRequest, Tag,
};

const APPLICATION_COLUMNS: &str = "id, name, description, is_active, created_at, updated_at";
const EVENT_COLUMNS: &str =
    "id, name, description, application_id, is_active, created_at, updated_at";
const NOTIFICATION_TYPE_COLUMNS: &str = "id, name, description, template_subject, template_body, \
     event_id, tags, is_active, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, text, notification_type_id, created_at, updated_at";
const TAG_COLUMNS: &str = "id, label, created_at, updated_at";

/// SQLSTATE foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// SQLSTATE unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Map a sqlx error, counting it against `operation`.
fn store_error(operation: &'static str) -> impl Fn(sqlx::Error) -> StoreError {
    move |e| {
        StoreMetrics::record_error(operation);

        if let sqlx::Error::Database(db) = &e {
            if matches!(
                db.code().as_deref(),
                Some(FOREIGN_KEY_VIOLATION) | Some(UNIQUE_VIOLATION)
            ) {
                tracing::debug!(operation, error = %db, "Constraint violation");
                return StoreError::Constraint(db.message().to_string());
            }
        }

        tracing::error!(operation, error = %e, "PostgreSQL operation failed");
        StoreError::Postgres(e)
    }
}

/// Filter shared by the three listable tables
struct RowFilter {
    name: Option<String>,
    parent: Option<(&'static str, i64)>,
    is_active: Option<bool>,
}

impl RowFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE TRUE");
        if let Some(name) = &self.name {
            qb.push(" AND name = ").push_bind(name.clone());
        }
        if let Some((column, id)) = self.parent {
            qb.push(" AND ").push(column).push(" = ").push_bind(id);
        }
        if let Some(is_active) = self.is_active {
            qb.push(" AND is_active = ").push_bind(is_active);
        }
    }
}

/// PostgreSQL-based store backend.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Count and fetch one page of a table concurrently.
    async fn fetch_page<T>(
        &self,
        table: &'static str,
        columns: &'static str,
        filter: RowFilter,
        page: &PageRequest,
        operation: &'static str,
    ) -> StoreResult<Page<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let start = Instant::now();

        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ");
        count_query.push(table);
        filter.push_where(&mut count_query);

        let mut rows_query = QueryBuilder::<Postgres>::new("SELECT ");
        rows_query.push(columns).push(" FROM ").push(table);
        filter.push_where(&mut rows_query);
        // Column and keyword come from closed enums, never from user text
        rows_query
            .push(" ORDER BY ")
            .push(page.sort_by.column())
            .push(" ")
            .push(page.sort_order.keyword())
            .push(", id ASC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.sql_offset());

        let (total, items) = futures::try_join!(
            count_query.build_query_scalar::<i64>().fetch_one(&self.pool),
            rows_query.build_query_as::<T>().fetch_all(&self.pool),
        )
        .map_err(store_error(operation))?;

        StoreMetrics::record_latency("postgres", operation, start.elapsed().as_secs_f64());

        Ok(Page { total, items })
    }

    /// Case-insensitive name lookup, optionally scoped to a parent and
    /// ignoring one row.
    async fn find_conflict<T>(
        &self,
        table: &'static str,
        columns: &'static str,
        name: &str,
        parent: Option<(&'static str, i64)>,
        exclude_id: Option<i64>,
        operation: &'static str,
    ) -> StoreResult<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(columns)
            .push(" FROM ")
            .push(table)
            .push(" WHERE LOWER(name) = LOWER(")
            .push_bind(name.to_string())
            .push(")");
        if let Some((column, id)) = parent {
            qb.push(" AND ").push(column).push(" = ").push_bind(id);
        }
        if let Some(id) = exclude_id {
            qb.push(" AND id <> ").push_bind(id);
        }
        qb.push(" LIMIT 1");

        qb.build_query_as::<T>()
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error(operation))
    }
}

#[async_trait]
impl TagCatalog for PostgresStore {
    async fn find_tag_by_name(&self, name: &str) -> StoreResult<Option<Tag>> {
        sqlx::query_as::<_, Tag>(&format!(
            "SELECT {} FROM tags WHERE label = $1",
            TAG_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("find_tag"))
    }

    async fn create_tag(&self, name: &str) -> StoreResult<Tag> {
        let tag = sqlx::query_as::<_, Tag>(&format!(
            "INSERT INTO tags (label) VALUES ($1) RETURNING {}",
            TAG_COLUMNS
        ))
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error("create_tag"))?;

        TemplateMetrics::record_tag_created();
        tracing::debug!(tag = %name, "Tag saved");

        Ok(tag)
    }

    async fn ensure_tag(&self, name: &str) -> StoreResult<Tag> {
        let inserted = sqlx::query_as::<_, Tag>(&format!(
            "INSERT INTO tags (label) VALUES ($1) ON CONFLICT (label) DO NOTHING RETURNING {}",
            TAG_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("ensure_tag"))?;

        if let Some(tag) = inserted {
            TemplateMetrics::record_tag_created();
            tracing::debug!(tag = %name, "Tag saved");
            return Ok(tag);
        }

        // Lost the race or already present; a fresh statement sees the committed row
        self.find_tag_by_name(name).await?.ok_or_else(|| {
            StoreError::Unavailable(format!("tag '{}' vanished after conflict", name))
        })
    }

    async fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        sqlx::query_as::<_, Tag>(&format!("SELECT {} FROM tags ORDER BY id", TAG_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(store_error("list_tags"))
    }
}

#[async_trait]
impl ApplicationRepository for PostgresStore {
    async fn list_applications(
        &self,
        filter: &ApplicationFilter,
        page: &PageRequest,
    ) -> StoreResult<Page<Application>> {
        let filter = RowFilter {
            name: filter.name.clone(),
            parent: None,
            is_active: filter.is_active,
        };
        self.fetch_page(
            "applications",
            APPLICATION_COLUMNS,
            filter,
            page,
            "list_applications",
        )
        .await
    }

    async fn get_application(&self, id: i64) -> StoreResult<Option<Application>> {
        sqlx::query_as::<_, Application>(&format!(
            "SELECT {} FROM applications WHERE id = $1",
            APPLICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("get_application"))
    }

    async fn find_application_by_name(&self, name: &str) -> StoreResult<Option<Application>> {
        sqlx::query_as::<_, Application>(&format!(
            "SELECT {} FROM applications WHERE name = $1 ORDER BY id LIMIT 1",
            APPLICATION_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("find_application"))
    }

    async fn find_application_conflict(
        &self,
        name: &str,
        exclude_id: Option<i64>,
    ) -> StoreResult<Option<Application>> {
        self.find_conflict(
            "applications",
            APPLICATION_COLUMNS,
            name,
            None,
            exclude_id,
            "find_application_conflict",
        )
        .await
    }

    async fn insert_application(&self, draft: ApplicationDraft) -> StoreResult<Application> {
        let application = sqlx::query_as::<_, Application>(&format!(
            "INSERT INTO applications (name, description, is_active) VALUES ($1, $2, $3) \
             RETURNING {}",
            APPLICATION_COLUMNS
        ))
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error("insert_application"))?;

        tracing::debug!(application_id = application.id, "Application inserted");
        Ok(application)
    }

    async fn update_application(
        &self,
        id: i64,
        draft: ApplicationDraft,
    ) -> StoreResult<Option<Application>> {
        sqlx::query_as::<_, Application>(&format!(
            "UPDATE applications SET name = $2, description = $3, is_active = $4, \
             updated_at = NOW() WHERE id = $1 RETURNING {}",
            APPLICATION_COLUMNS
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("update_application"))
    }

    async fn delete_application(&self, id: i64) -> StoreResult<Option<Application>> {
        sqlx::query_as::<_, Application>(&format!(
            "DELETE FROM applications WHERE id = $1 RETURNING {}",
            APPLICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("delete_application"))
    }
}

#[async_trait]
impl EventRepository for PostgresStore {
    async fn list_events(
        &self,
        filter: &EventFilter,
        page: &PageRequest,
    ) -> StoreResult<Page<Event>> {
        let filter = RowFilter {
            name: filter.name.clone(),
            parent: filter.application_id.map(|id| ("application_id", id)),
            is_active: filter.is_active,
        };
        self.fetch_page("events", EVENT_COLUMNS, filter, page, "list_events")
            .await
    }

    async fn get_event(&self, id: i64) -> StoreResult<Option<Event>> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("get_event"))
    }

    async fn find_event_by_name(
        &self,
        application_id: i64,
        name: &str,
    ) -> StoreResult<Option<Event>> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE application_id = $1 AND name = $2 ORDER BY id LIMIT 1",
            EVENT_COLUMNS
        ))
        .bind(application_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("find_event"))
    }

    async fn find_event_conflict(
        &self,
        application_id: i64,
        name: &str,
        exclude_id: Option<i64>,
    ) -> StoreResult<Option<Event>> {
        self.find_conflict(
            "events",
            EVENT_COLUMNS,
            name,
            Some(("application_id", application_id)),
            exclude_id,
            "find_event_conflict",
        )
        .await
    }

    async fn insert_event(&self, draft: EventDraft) -> StoreResult<Event> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (name, description, application_id, is_active) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            EVENT_COLUMNS
        ))
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.application_id)
        .bind(draft.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error("insert_event"))?;

        tracing::debug!(event_id = event.id, "Event inserted");
        Ok(event)
    }

    async fn update_event(&self, id: i64, draft: EventDraft) -> StoreResult<Option<Event>> {
        sqlx::query_as::<_, Event>(&format!(
            "UPDATE events SET name = $2, description = $3, application_id = $4, \
             is_active = $5, updated_at = NOW() WHERE id = $1 RETURNING {}",
            EVENT_COLUMNS
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.application_id)
        .bind(draft.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("update_event"))
    }

    async fn delete_event(&self, id: i64) -> StoreResult<Option<Event>> {
        sqlx::query_as::<_, Event>(&format!(
            "DELETE FROM events WHERE id = $1 RETURNING {}",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("delete_event"))
    }
}

#[async_trait]
impl NotificationTypeRepository for PostgresStore {
    async fn list_notification_types(
        &self,
        filter: &NotificationTypeFilter,
        page: &PageRequest,
    ) -> StoreResult<Page<NotificationType>> {
        let filter = RowFilter {
            name: filter.name.clone(),
            parent: filter.event_id.map(|id| ("event_id", id)),
            is_active: filter.is_active,
        };
        self.fetch_page(
            "notification_types",
            NOTIFICATION_TYPE_COLUMNS,
            filter,
            page,
            "list_notification_types",
        )
        .await
    }

    async fn get_notification_type(&self, id: i64) -> StoreResult<Option<NotificationType>> {
        sqlx::query_as::<_, NotificationType>(&format!(
            "SELECT {} FROM notification_types WHERE id = $1",
            NOTIFICATION_TYPE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("get_notification_type"))
    }

    async fn find_notification_type_by_name(
        &self,
        event_id: i64,
        name: &str,
    ) -> StoreResult<Option<NotificationType>> {
        sqlx::query_as::<_, NotificationType>(&format!(
            "SELECT {} FROM notification_types WHERE event_id = $1 AND name = $2 \
             ORDER BY id LIMIT 1",
            NOTIFICATION_TYPE_COLUMNS
        ))
        .bind(event_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("find_notification_type"))
    }

    async fn find_notification_type_conflict(
        &self,
        event_id: i64,
        name: &str,
        exclude_id: Option<i64>,
    ) -> StoreResult<Option<NotificationType>> {
        self.find_conflict(
            "notification_types",
            NOTIFICATION_TYPE_COLUMNS,
            name,
            Some(("event_id", event_id)),
            exclude_id,
            "find_notification_type_conflict",
        )
        .await
    }

    async fn insert_notification_type(
        &self,
        draft: NotificationTypeDraft,
    ) -> StoreResult<NotificationType> {
        let notification_type = sqlx::query_as::<_, NotificationType>(&format!(
            "INSERT INTO notification_types \
             (name, description, template_subject, template_body, event_id, tags, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            NOTIFICATION_TYPE_COLUMNS
        ))
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.template_subject)
        .bind(&draft.template_body)
        .bind(draft.event_id)
        .bind(&draft.tags)
        .bind(draft.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error("insert_notification_type"))?;

        tracing::debug!(
            notification_type_id = notification_type.id,
            tag_count = notification_type.tags.len(),
            "Notification type inserted"
        );
        Ok(notification_type)
    }

    async fn update_notification_type(
        &self,
        id: i64,
        draft: NotificationTypeDraft,
    ) -> StoreResult<Option<NotificationType>> {
        sqlx::query_as::<_, NotificationType>(&format!(
            "UPDATE notification_types SET name = $2, description = $3, template_subject = $4, \
             template_body = $5, event_id = $6, tags = $7, is_active = $8, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            NOTIFICATION_TYPE_COLUMNS
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.template_subject)
        .bind(&draft.template_body)
        .bind(draft.event_id)
        .bind(&draft.tags)
        .bind(draft.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("update_notification_type"))
    }

    async fn delete_notification_type(&self, id: i64) -> StoreResult<Option<NotificationType>> {
        sqlx::query_as::<_, NotificationType>(&format!(
            "DELETE FROM notification_types WHERE id = $1 RETURNING {}",
            NOTIFICATION_TYPE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("delete_notification_type"))
    }
}

#[async_trait]
impl MessageRepository for PostgresStore {
    async fn list_messages(&self, page: &PageRequest) -> StoreResult<Vec<Message>> {
        sqlx::query_as::<_, Message>(&format!(
            "SELECT {} FROM messages ORDER BY id LIMIT $1 OFFSET $2",
            MESSAGE_COLUMNS
        ))
        .bind(page.limit as i64)
        .bind(page.sql_offset())
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("list_messages"))
    }

    async fn get_message(&self, id: i64) -> StoreResult<Option<Message>> {
        sqlx::query_as::<_, Message>(&format!(
            "SELECT {} FROM messages WHERE id = $1",
            MESSAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("get_message"))
    }

    async fn insert_message(&self, draft: MessageDraft) -> StoreResult<Message> {
        let message = sqlx::query_as::<_, Message>(&format!(
            "INSERT INTO messages (text, notification_type_id) VALUES ($1, $2) RETURNING {}",
            MESSAGE_COLUMNS
        ))
        .bind(&draft.text)
        .bind(draft.notification_type_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error("insert_message"))?;

        tracing::debug!(message_id = message.id, "Message inserted");
        Ok(message)
    }

    async fn delete_message(&self, id: i64) -> StoreResult<Option<Message>> {
        sqlx::query_as::<_, Message>(&format!(
            "DELETE FROM messages WHERE id = $1 RETURNING {}",
            MESSAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("delete_message"))
    }
}

#[async_trait]
impl Store for PostgresStore {
    fn backend_type(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_error("ping"))?;
        Ok(())
    }
}
