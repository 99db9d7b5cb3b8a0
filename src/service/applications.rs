//! Application registration flows.

use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::store::{Application, ApplicationDraft, ApplicationFilter, Store};

use super::query::{ApplicationListResponse, ListApplicationsQuery};

const NOT_FOUND: &str = "The app with the given ID is not found";
const NAME_TAKEN: &str = "An application with the same name already exists";

/// Body of `POST` and `PUT`
#[derive(Debug, Deserialize, Validate)]
pub struct ApplicationRequest {
    #[validate(length(
        min = 3,
        max = 30,
        message = "\"name\" length must be between 3 and 30 characters"
    ))]
    pub name: String,
    #[validate(length(
        min = 5,
        max = 200,
        message = "\"description\" length must be between 5 and 200 characters"
    ))]
    pub description: String,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

/// Body of `PATCH`; absent fields keep their stored value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PatchApplicationRequest {
    #[validate(length(
        min = 3,
        max = 30,
        message = "\"name\" length must be between 3 and 30 characters"
    ))]
    pub name: Option<String>,
    #[validate(length(
        min = 5,
        max = 200,
        message = "\"description\" length must be between 5 and 200 characters"
    ))]
    pub description: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

pub async fn list(
    store: &dyn Store,
    query: ListApplicationsQuery,
) -> Result<ApplicationListResponse> {
    query.validate()?;

    let filter = ApplicationFilter {
        name: query.name.clone(),
        is_active: query.is_active,
    };
    let page = store
        .list_applications(&filter, &query.page_request())
        .await?;

    if page.items.is_empty() {
        return Err(AppError::NotFound("No applications found".to_string()));
    }

    Ok(ApplicationListResponse {
        total_count: page.total,
        applications: page.items,
    })
}

pub async fn get(store: &dyn Store, id: i64) -> Result<Application> {
    store
        .get_application(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

pub async fn create(store: &dyn Store, request: ApplicationRequest) -> Result<Application> {
    request.validate()?;

    if store
        .find_application_conflict(&request.name, None)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(NAME_TAKEN.to_string()));
    }

    let application = store
        .insert_application(ApplicationDraft {
            name: request.name,
            description: request.description,
            is_active: request.is_active.unwrap_or(true),
        })
        .await?;

    tracing::info!(
        application_id = application.id,
        name = %application.name,
        "Application created"
    );

    Ok(application)
}

pub async fn update(
    store: &dyn Store,
    id: i64,
    request: ApplicationRequest,
) -> Result<Application> {
    request.validate()?;

    if store
        .find_application_conflict(&request.name, Some(id))
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(NAME_TAKEN.to_string()));
    }

    let current = get(store, id).await?;

    let draft = ApplicationDraft {
        name: request.name,
        description: request.description,
        is_active: request.is_active.unwrap_or(current.is_active),
    };

    let updated = store
        .update_application(id, draft)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    tracing::info!(application_id = id, "Application updated");
    Ok(updated)
}

pub async fn patch(
    store: &dyn Store,
    id: i64,
    request: PatchApplicationRequest,
) -> Result<Application> {
    request.validate()?;

    let current = get(store, id).await?;

    if let Some(name) = &request.name {
        if store
            .find_application_conflict(name, Some(id))
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(NAME_TAKEN.to_string()));
        }
    }

    let draft = ApplicationDraft {
        name: request.name.unwrap_or(current.name),
        description: request.description.unwrap_or(current.description),
        is_active: request.is_active.unwrap_or(current.is_active),
    };

    let updated = store
        .update_application(id, draft)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    tracing::info!(application_id = id, "Application patched");
    Ok(updated)
}

/// Remove an application and return it. Refused while events reference it.
pub async fn delete(store: &dyn Store, id: i64) -> Result<Application> {
    let deleted = store
        .delete_application(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

    tracing::info!(application_id = id, "Application deleted");
    Ok(deleted)
}
