//! API layer - HTTP endpoint handlers organized by resource.

mod applications;
mod events;
mod extract;
mod health;
mod messages;
mod metrics;
mod notification_types;
mod routes;

pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use health::health;
pub use metrics::prometheus_metrics;
pub use routes::api_routes;
