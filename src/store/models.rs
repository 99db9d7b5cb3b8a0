//! Persisted entities and list parameters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered application that emits events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Application {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named event belonging to an application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub application_id: i64,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A template bound to an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NotificationType {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub template_subject: String,
    pub template_body: String,
    pub event_id: i64,
    /// Raw extraction of `template_body` at the last save, duplicates kept
    pub tags: Vec<String>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Rendered text produced from a notification type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub text: String,
    #[serde(rename = "notificationType_id")]
    pub notification_type_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog entry for a placeholder name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values for inserting or replacing an application
#[derive(Debug, Clone)]
pub struct ApplicationDraft {
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub application_id: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NotificationTypeDraft {
    pub name: String,
    pub description: String,
    pub template_subject: String,
    pub template_body: String,
    pub event_id: i64,
    pub tags: Vec<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub text: String,
    pub notification_type_id: i64,
}

/// Column a listing is ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Name,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Paging and ordering for a list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }

    pub fn sorted(mut self, sort_by: SortField, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    pub fn offset(&self) -> u64 {
        (self.page.max(1) as u64 - 1) * self.limit as u64
    }

    /// Offset as a SQL bind value, saturating at `i64::MAX`.
    pub fn sql_offset(&self) -> i64 {
        i64::try_from(self.offset()).unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub name: Option<String>,
    pub application_id: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationTypeFilter {
    pub name: Option<String>,
    pub event_id: Option<i64>,
    pub is_active: Option<bool>,
}

/// One page of rows plus the number of rows matching the filter
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub total: i64,
    pub items: Vec<T>,
}
