//! Query-string parameters and list responses.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::{Application, Event, NotificationType, PageRequest, SortField, SortOrder};

/// Default page size for applications and events
pub const DEFAULT_LIMIT: u32 = 100;
/// Default page size for notification types and messages
pub const DEFAULT_SMALL_LIMIT: u32 = 10;

fn page_request(
    page: Option<u32>,
    limit: Option<u32>,
    default_limit: u32,
    sort_by: Option<SortField>,
    sort_order: Option<SortOrder>,
) -> PageRequest {
    PageRequest::new(page.unwrap_or(1), limit.unwrap_or(default_limit)).sorted(
        sort_by.unwrap_or_default(),
        sort_order.unwrap_or_default(),
    )
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListApplicationsQuery {
    #[validate(length(min = 3, message = "\"name\" length must be at least 3 characters long"))]
    pub name: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
    #[validate(range(min = 1, message = "\"page\" must be greater than or equal to 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, message = "\"limit\" must be greater than or equal to 1"))]
    pub limit: Option<u32>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<SortField>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<SortOrder>,
}

impl ListApplicationsQuery {
    pub fn page_request(&self) -> PageRequest {
        page_request(
            self.page,
            self.limit,
            DEFAULT_LIMIT,
            self.sort_by,
            self.sort_order,
        )
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListEventsQuery {
    #[validate(length(min = 3, message = "\"name\" length must be at least 3 characters long"))]
    pub name: Option<String>,
    pub application_id: Option<i64>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
    #[validate(range(min = 1, message = "\"page\" must be greater than or equal to 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, message = "\"limit\" must be greater than or equal to 1"))]
    pub limit: Option<u32>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<SortField>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<SortOrder>,
}

impl ListEventsQuery {
    pub fn page_request(&self) -> PageRequest {
        page_request(
            self.page,
            self.limit,
            DEFAULT_LIMIT,
            self.sort_by,
            self.sort_order,
        )
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListNotificationTypesQuery {
    #[validate(length(min = 3, message = "\"name\" length must be at least 3 characters long"))]
    pub name: Option<String>,
    pub event_id: Option<i64>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
    #[validate(range(min = 1, message = "\"page\" must be greater than or equal to 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, message = "\"limit\" must be greater than or equal to 1"))]
    pub limit: Option<u32>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<SortField>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<SortOrder>,
}

impl ListNotificationTypesQuery {
    pub fn page_request(&self) -> PageRequest {
        page_request(
            self.page,
            self.limit,
            DEFAULT_SMALL_LIMIT,
            self.sort_by,
            self.sort_order,
        )
    }
}

/// Plain paging for messages, always ordered by id
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListMessagesQuery {
    #[validate(range(min = 1, message = "\"page\" must be greater than or equal to 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, message = "\"limit\" must be greater than or equal to 1"))]
    pub limit: Option<u32>,
}

impl ListMessagesQuery {
    pub fn page_request(&self) -> PageRequest {
        page_request(self.page, self.limit, DEFAULT_SMALL_LIMIT, None, None)
    }
}

#[derive(Debug, Serialize)]
pub struct ApplicationListResponse {
    #[serde(rename = "TotalCount")]
    pub total_count: i64,
    pub applications: Vec<Application>,
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    #[serde(rename = "TotalCount")]
    pub total_count: i64,
    pub events: Vec<Event>,
}

#[derive(Debug, Serialize)]
pub struct NotificationTypeListResponse {
    #[serde(rename = "TotalCount")]
    pub total_count: i64,
    pub notifications: Vec<NotificationType>,
}
