//! Notification template engine.
//!
//! This module provides:
//! - Placeholder extraction for `{tag}` style templates
//! - Tag catalog synchronization for newly discovered tags
//! - Completeness checking of caller-supplied tag values
//! - Literal substitution of tag values into a template
//!
//! # Example
//!
//! ```ignore
//! let tags = sync_tags(store.as_ref(), extract_tags(&body)).await?;
//!
//! let missing = missing_tags(&body, &values);
//! if !missing.is_empty() {
//!     return Err(AppError::IncompleteTags(missing));
//! }
//!
//! let text = render(&body, &values);
//! ```

mod completeness;
mod extract;
mod registry;
mod substitution;

pub use completeness::missing_tags;
pub use extract::extract_tags;
pub use registry::sync_tags;
pub use substitution::render;

/// Tag name to substitution value, in the order the caller supplied them.
pub type TagValueMap = serde_json::Map<String, serde_json::Value>;
