mod app;
mod middleware;
mod state;

pub use app::create_app;
pub use middleware::{extract_bearer_token, require_auth};
pub use state::AppState;
