//! Business flows behind the HTTP handlers.
//!
//! Each submodule validates its input, applies the uniqueness and
//! parent-existence rules, then calls into the store. Everything takes a
//! `&dyn Store` so the same flows run against either backend.

pub mod applications;
pub mod events;
pub mod messages;
pub mod notification_types;
pub mod query;

pub use applications::{ApplicationRequest, PatchApplicationRequest};
pub use events::{EventRequest, PatchEventRequest};
pub use messages::CreateMessageRequest;
pub use notification_types::{NotificationTypeRequest, PatchNotificationTypeRequest};
pub use query::{
    ApplicationListResponse, EventListResponse, ListApplicationsQuery, ListEventsQuery,
    ListMessagesQuery, ListNotificationTypesQuery, NotificationTypeListResponse,
};

use crate::error::{AppError, Result};
use crate::store::{Store, Tag};

/// The whole tag catalog ordered by id.
pub async fn list_tags(store: &dyn Store) -> Result<Vec<Tag>> {
    let tags = store.list_tags().await?;
    if tags.is_empty() {
        return Err(AppError::NotFound("No tags found".to_string()));
    }
    Ok(tags)
}
