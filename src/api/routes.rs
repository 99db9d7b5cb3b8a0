use axum::{middleware, routing::get, Router};

use crate::server::{require_auth, AppState};

use super::applications::{
    create_application, delete_application, get_application, list_applications,
    patch_application, update_application,
};
use super::events::{create_event, delete_event, get_event, list_events, patch_event, update_event};
use super::messages::{create_message, delete_message, get_message, list_messages, list_tags};
use super::notification_types::{
    create_notification_type, delete_notification_type, get_notification_type,
    list_notification_types, patch_notification_type, update_notification_type,
};

/// Routes mounted under `/api`, all behind bearer-token authentication.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Applications
        .route(
            "/applications",
            get(list_applications).post(create_application),
        )
        .route(
            "/applications/{id}",
            get(get_application)
                .put(update_application)
                .patch(patch_application)
                .delete(delete_application),
        )
        // Events
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event)
                .put(update_event)
                .patch(patch_event)
                .delete(delete_event),
        )
        // Notification types
        .route(
            "/notification-types",
            get(list_notification_types).post(create_notification_type),
        )
        .route(
            "/notification-types/{id}",
            get(get_notification_type)
                .put(update_notification_type)
                .patch(patch_notification_type)
                .delete(delete_notification_type),
        )
        // Messages
        .route("/messages", get(list_messages).post(create_message))
        .route("/messages/{id}", get(get_message).delete(delete_message))
        // Tag catalog (read-only)
        .route("/tags", get(list_tags))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
