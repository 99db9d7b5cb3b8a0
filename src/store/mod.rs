//! Persistence for applications, events, notification types, messages and
//! the shared tag catalog.
//!
//! - `memory`: DashMap tables, lost on restart
//! - `postgres`: sqlx over the schema in `migrations/`

mod backend;
mod factory;
mod memory_backend;
mod models;
mod postgres_backend;

pub use backend::{
    ApplicationRepository, EventRepository, MessageRepository, NotificationTypeRepository, Store,
    StoreError, StoreResult, TagCatalog,
};
pub use factory::create_store;
pub use memory_backend::MemoryStore;
pub use models::{
    Application, ApplicationDraft, ApplicationFilter, Event, EventDraft, EventFilter, Message,
    MessageDraft, NotificationType, NotificationTypeDraft, NotificationTypeFilter, Page,
    PageRequest, SortField, SortOrder, Tag,
};
pub use postgres_backend::PostgresStore;
