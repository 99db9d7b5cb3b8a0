//! In-memory store backend using DashMap.
//!
//! This module provides a memory-based implementation of the `Store` trait.
//! Data is lost on service restart. Referential rules match the SQL schema:
//! a row cannot be deleted while a child row still points at it.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::metrics::TemplateMetrics;

use super::backend::{
    ApplicationRepository, EventRepository, MessageRepository, NotificationTypeRepository, Store,
    StoreError, StoreResult, TagCatalog,
};
use super::models::{
    Application, ApplicationDraft, ApplicationFilter, Event, EventDraft, EventFilter, Message,
    MessageDraft, NotificationType, NotificationTypeDraft, NotificationTypeFilter, Page,
    PageRequest, SortField, SortOrder, Tag,
};

/// In-memory store backend.
///
/// Each table is a `DashMap` keyed by id, with its own id sequence. Tags are
/// keyed by label so that insert-if-absent is a single entry operation.
pub struct MemoryStore {
    applications: DashMap<i64, Application>,
    events: DashMap<i64, Event>,
    notification_types: DashMap<i64, NotificationType>,
    messages: DashMap<i64, Message>,
    tags: DashMap<String, Tag>,
    application_seq: AtomicI64,
    event_seq: AtomicI64,
    notification_type_seq: AtomicI64,
    message_seq: AtomicI64,
    tag_seq: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty memory store.
    pub fn new() -> Self {
        Self {
            applications: DashMap::new(),
            events: DashMap::new(),
            notification_types: DashMap::new(),
            messages: DashMap::new(),
            tags: DashMap::new(),
            application_seq: AtomicI64::new(0),
            event_seq: AtomicI64::new(0),
            notification_type_seq: AtomicI64::new(0),
            message_seq: AtomicI64::new(0),
            tag_seq: AtomicI64::new(0),
        }
    }

    fn next_id(seq: &AtomicI64) -> i64 {
        seq.fetch_add(1, AtomicOrdering::SeqCst) + 1
    }

    fn new_tag(&self, name: &str) -> Tag {
        let now = Utc::now();
        Tag {
            id: Self::next_id(&self.tag_seq),
            label: name.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Columns shared by every sortable table
trait Sortable {
    fn id(&self) -> i64;
    fn name(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
}

macro_rules! impl_sortable {
    ($($ty:ty),*) => {
        $(
            impl Sortable for $ty {
                fn id(&self) -> i64 {
                    self.id
                }
                fn name(&self) -> &str {
                    &self.name
                }
                fn created_at(&self) -> DateTime<Utc> {
                    self.created_at
                }
                fn updated_at(&self) -> DateTime<Utc> {
                    self.updated_at
                }
            }
        )*
    };
}

impl_sortable!(Application, Event, NotificationType);

/// Sort, then cut one page out of the filtered rows.
fn paginate<T: Sortable>(mut rows: Vec<T>, page: &PageRequest) -> Page<T> {
    rows.sort_by(|a, b| {
        let ordering = match page.sort_by {
            SortField::Name => a.name().cmp(b.name()),
            SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
            SortField::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
        };
        let ordering = match page.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        };
        if ordering == Ordering::Equal {
            a.id().cmp(&b.id())
        } else {
            ordering
        }
    });

    let total = rows.len() as i64;
    let items = rows
        .into_iter()
        .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
        .take(page.limit as usize)
        .collect();

    Page { total, items }
}

fn same_name_ci(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl TagCatalog for MemoryStore {
    async fn find_tag_by_name(&self, name: &str) -> StoreResult<Option<Tag>> {
        Ok(self.tags.get(name).map(|t| t.clone()))
    }

    async fn create_tag(&self, name: &str) -> StoreResult<Tag> {
        match self.tags.entry(name.to_string()) {
            Entry::Occupied(_) => Err(StoreError::Constraint(format!(
                "tag '{}' already exists",
                name
            ))),
            Entry::Vacant(slot) => {
                let tag = self.new_tag(name);
                slot.insert(tag.clone());
                TemplateMetrics::record_tag_created();
                tracing::debug!(tag = %name, "Tag saved");
                Ok(tag)
            }
        }
    }

    async fn ensure_tag(&self, name: &str) -> StoreResult<Tag> {
        match self.tags.entry(name.to_string()) {
            Entry::Occupied(existing) => {
                tracing::trace!(tag = %name, "Tag already exists");
                Ok(existing.get().clone())
            }
            Entry::Vacant(slot) => {
                let tag = self.new_tag(name);
                slot.insert(tag.clone());
                TemplateMetrics::record_tag_created();
                tracing::debug!(tag = %name, "Tag saved");
                Ok(tag)
            }
        }
    }

    async fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        let mut tags: Vec<Tag> = self.tags.iter().map(|e| e.value().clone()).collect();
        tags.sort_by_key(|t| t.id);
        Ok(tags)
    }
}

#[async_trait]
impl ApplicationRepository for MemoryStore {
    async fn list_applications(
        &self,
        filter: &ApplicationFilter,
        page: &PageRequest,
    ) -> StoreResult<Page<Application>> {
        let rows: Vec<Application> = self
            .applications
            .iter()
            .map(|e| e.value().clone())
            .filter(|a| filter.name.as_ref().map_or(true, |n| &a.name == n))
            .filter(|a| filter.is_active.map_or(true, |v| a.is_active == v))
            .collect();

        Ok(paginate(rows, page))
    }

    async fn get_application(&self, id: i64) -> StoreResult<Option<Application>> {
        Ok(self.applications.get(&id).map(|a| a.clone()))
    }

    async fn find_application_by_name(&self, name: &str) -> StoreResult<Option<Application>> {
        Ok(self
            .applications
            .iter()
            .find(|e| e.value().name == name)
            .map(|e| e.value().clone()))
    }

    async fn find_application_conflict(
        &self,
        name: &str,
        exclude_id: Option<i64>,
    ) -> StoreResult<Option<Application>> {
        Ok(self
            .applications
            .iter()
            .find(|e| same_name_ci(&e.value().name, name) && Some(*e.key()) != exclude_id)
            .map(|e| e.value().clone()))
    }

    async fn insert_application(&self, draft: ApplicationDraft) -> StoreResult<Application> {
        let now = Utc::now();
        let application = Application {
            id: Self::next_id(&self.application_seq),
            name: draft.name,
            description: draft.description,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        };

        self.applications
            .insert(application.id, application.clone());
        tracing::debug!(application_id = application.id, "Application inserted");

        Ok(application)
    }

    async fn update_application(
        &self,
        id: i64,
        draft: ApplicationDraft,
    ) -> StoreResult<Option<Application>> {
        Ok(self.applications.get_mut(&id).map(|mut row| {
            row.name = draft.name;
            row.description = draft.description;
            row.is_active = draft.is_active;
            row.updated_at = Utc::now();
            row.clone()
        }))
    }

    async fn delete_application(&self, id: i64) -> StoreResult<Option<Application>> {
        if self.events.iter().any(|e| e.value().application_id == id) {
            return Err(StoreError::Constraint(format!(
                "application {} is still referenced by events",
                id
            )));
        }

        Ok(self.applications.remove(&id).map(|(_, row)| row))
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn list_events(
        &self,
        filter: &EventFilter,
        page: &PageRequest,
    ) -> StoreResult<Page<Event>> {
        let rows: Vec<Event> = self
            .events
            .iter()
            .map(|e| e.value().clone())
            .filter(|ev| filter.name.as_ref().map_or(true, |n| &ev.name == n))
            .filter(|ev| {
                filter
                    .application_id
                    .map_or(true, |id| ev.application_id == id)
            })
            .filter(|ev| filter.is_active.map_or(true, |v| ev.is_active == v))
            .collect();

        Ok(paginate(rows, page))
    }

    async fn get_event(&self, id: i64) -> StoreResult<Option<Event>> {
        Ok(self.events.get(&id).map(|e| e.clone()))
    }

    async fn find_event_by_name(
        &self,
        application_id: i64,
        name: &str,
    ) -> StoreResult<Option<Event>> {
        Ok(self
            .events
            .iter()
            .find(|e| e.value().application_id == application_id && e.value().name == name)
            .map(|e| e.value().clone()))
    }

    async fn find_event_conflict(
        &self,
        application_id: i64,
        name: &str,
        exclude_id: Option<i64>,
    ) -> StoreResult<Option<Event>> {
        Ok(self
            .events
            .iter()
            .find(|e| {
                e.value().application_id == application_id
                    && same_name_ci(&e.value().name, name)
                    && Some(*e.key()) != exclude_id
            })
            .map(|e| e.value().clone()))
    }

    async fn insert_event(&self, draft: EventDraft) -> StoreResult<Event> {
        if !self.applications.contains_key(&draft.application_id) {
            return Err(StoreError::Constraint(format!(
                "application {} does not exist",
                draft.application_id
            )));
        }

        let now = Utc::now();
        let event = Event {
            id: Self::next_id(&self.event_seq),
            name: draft.name,
            description: draft.description,
            application_id: draft.application_id,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        };

        self.events.insert(event.id, event.clone());
        tracing::debug!(event_id = event.id, "Event inserted");

        Ok(event)
    }

    async fn update_event(&self, id: i64, draft: EventDraft) -> StoreResult<Option<Event>> {
        if !self.applications.contains_key(&draft.application_id) {
            return Err(StoreError::Constraint(format!(
                "application {} does not exist",
                draft.application_id
            )));
        }

        Ok(self.events.get_mut(&id).map(|mut row| {
            row.name = draft.name;
            row.description = draft.description;
            row.application_id = draft.application_id;
            row.is_active = draft.is_active;
            row.updated_at = Utc::now();
            row.clone()
        }))
    }

    async fn delete_event(&self, id: i64) -> StoreResult<Option<Event>> {
        if self
            .notification_types
            .iter()
            .any(|n| n.value().event_id == id)
        {
            return Err(StoreError::Constraint(format!(
                "event {} is still referenced by notification types",
                id
            )));
        }

        Ok(self.events.remove(&id).map(|(_, row)| row))
    }
}

#[async_trait]
impl NotificationTypeRepository for MemoryStore {
    async fn list_notification_types(
        &self,
        filter: &NotificationTypeFilter,
        page: &PageRequest,
    ) -> StoreResult<Page<NotificationType>> {
        let rows: Vec<NotificationType> = self
            .notification_types
            .iter()
            .map(|e| e.value().clone())
            .filter(|nt| filter.name.as_ref().map_or(true, |n| &nt.name == n))
            .filter(|nt| filter.event_id.map_or(true, |id| nt.event_id == id))
            .filter(|nt| filter.is_active.map_or(true, |v| nt.is_active == v))
            .collect();

        Ok(paginate(rows, page))
    }

    async fn get_notification_type(&self, id: i64) -> StoreResult<Option<NotificationType>> {
        Ok(self.notification_types.get(&id).map(|n| n.clone()))
    }

    async fn find_notification_type_by_name(
        &self,
        event_id: i64,
        name: &str,
    ) -> StoreResult<Option<NotificationType>> {
        Ok(self
            .notification_types
            .iter()
            .find(|e| e.value().event_id == event_id && e.value().name == name)
            .map(|e| e.value().clone()))
    }

    async fn find_notification_type_conflict(
        &self,
        event_id: i64,
        name: &str,
        exclude_id: Option<i64>,
    ) -> StoreResult<Option<NotificationType>> {
        Ok(self
            .notification_types
            .iter()
            .find(|e| {
                e.value().event_id == event_id
                    && same_name_ci(&e.value().name, name)
                    && Some(*e.key()) != exclude_id
            })
            .map(|e| e.value().clone()))
    }

    async fn insert_notification_type(
        &self,
        draft: NotificationTypeDraft,
    ) -> StoreResult<NotificationType> {
        if !self.events.contains_key(&draft.event_id) {
            return Err(StoreError::Constraint(format!(
                "event {} does not exist",
                draft.event_id
            )));
        }

        let now = Utc::now();
        let notification_type = NotificationType {
            id: Self::next_id(&self.notification_type_seq),
            name: draft.name,
            description: draft.description,
            template_subject: draft.template_subject,
            template_body: draft.template_body,
            event_id: draft.event_id,
            tags: draft.tags,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        };

        self.notification_types
            .insert(notification_type.id, notification_type.clone());
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
        if !self.events.contains_key(&draft.event_id) {
            return Err(StoreError::Constraint(format!(
                "event {} does not exist",
                draft.event_id
            )));
        }

        Ok(self.notification_types.get_mut(&id).map(|mut row| {
            row.name = draft.name;
            row.description = draft.description;
            row.template_subject = draft.template_subject;
            row.template_body = draft.template_body;
            row.event_id = draft.event_id;
            row.tags = draft.tags;
            row.is_active = draft.is_active;
            row.updated_at = Utc::now();
            row.clone()
        }))
    }

    async fn delete_notification_type(&self, id: i64) -> StoreResult<Option<NotificationType>> {
        if self
            .messages
            .iter()
            .any(|m| m.value().notification_type_id == id)
        {
            return Err(StoreError::Constraint(format!(
                "notification type {} is still referenced by messages",
                id
            )));
        }

        Ok(self.notification_types.remove(&id).map(|(_, row)| row))
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn list_messages(&self, page: &PageRequest) -> StoreResult<Vec<Message>> {
        let mut rows: Vec<Message> = self.messages.iter().map(|e| e.value().clone()).collect();
        rows.sort_by_key(|m| m.id);

        Ok(rows
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.limit as usize)
            .collect())
    }

    async fn get_message(&self, id: i64) -> StoreResult<Option<Message>> {
        Ok(self.messages.get(&id).map(|m| m.clone()))
    }

    async fn insert_message(&self, draft: MessageDraft) -> StoreResult<Message> {
        if !self
            .notification_types
            .contains_key(&draft.notification_type_id)
        {
            return Err(StoreError::Constraint(format!(
                "notification type {} does not exist",
                draft.notification_type_id
            )));
        }

        let now = Utc::now();
        let message = Message {
            id: Self::next_id(&self.message_seq),
            text: draft.text,
            notification_type_id: draft.notification_type_id,
            created_at: now,
            updated_at: now,
        };

        self.messages.insert(message.id, message.clone());
        tracing::debug!(message_id = message.id, "Message inserted");

        Ok(message)
    }

    async fn delete_message(&self, id: i64) -> StoreResult<Option<Message>> {
        Ok(self.messages.remove(&id).map(|(_, row)| row))
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
